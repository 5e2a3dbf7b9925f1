#![forbid(unsafe_code)]

//! History notifications and the listener registry.
//!
//! Events carry [`CommandDetails`] captured at emit time rather than command
//! references, so listeners never alias the stacks. Details are only built
//! when at least one listener is registered.

use std::fmt;

use crate::command::CommandDetails;
use crate::history::HistoryStatus;

/// A notification emitted by [`CommandHistory`](crate::CommandHistory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// A command was executed and pushed.
    Executed { command: CommandDetails },
    /// A command was undone.
    Undone { command: CommandDetails },
    /// A command was redone.
    Redone { command: CommandDetails },
    /// `merged` was folded into `target`.
    Merged {
        target: CommandDetails,
        merged: CommandDetails,
    },
    /// Both stacks were emptied.
    Cleared { undo_count: usize, redo_count: usize },
    /// Stack status after any of the above.
    Changed { status: HistoryStatus },
}

impl HistoryEvent {
    /// Event name, e.g. `"history:executed"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Executed { .. } => "history:executed",
            Self::Undone { .. } => "history:undone",
            Self::Redone { .. } => "history:redone",
            Self::Merged { .. } => "history:merged",
            Self::Cleared { .. } => "history:cleared",
            Self::Changed { .. } => "history:changed",
        }
    }
}

impl fmt::Display for HistoryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed { command } | Self::Undone { command } | Self::Redone { command } => {
                write!(f, "{} {command}", self.name())
            }
            Self::Merged { target, merged } => {
                write!(f, "{} {} <- {}", self.name(), target.kind, merged.description)
            }
            Self::Cleared {
                undo_count,
                redo_count,
            } => write!(f, "{} undo={undo_count} redo={redo_count}", self.name()),
            Self::Changed { status } => write!(
                f,
                "{} undo={} redo={}",
                self.name(),
                status.undo_count,
                status.redo_count
            ),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

type Listener = Box<dyn FnMut(&HistoryEvent) + Send>;

/// Synchronous fan-out of [`HistoryEvent`]s, in subscription order.
///
/// Listeners must not call back into the history that owns the bus.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&HistoryEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Whether anyone is listening.
    #[must_use]
    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener.
    pub fn emit(&mut self, event: &HistoryEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
