#![forbid(unsafe_code)]

//! Undo/redo stacks with merging and bounded eviction.
//!
//! [`CommandHistory`] keeps two stacks of executed commands and forwards the
//! document to them; it never mutates the document itself.
//!
//! # Invariants
//!
//! 1. `total_bytes` equals the sum of `size_bytes()` over both stacks.
//! 2. `undo_stack.len() <= config.max_size` after every public call.
//! 3. With `max_bytes > 0`, the undo side is trimmed until the total fits or
//!    only the newest entry remains.
//! 4. The redo stack is cleared whenever a new command is pushed or merged.
//! 5. The merge anchor is only set while the undo stack is non-empty.
//! 6. A failed execute/undo/redo leaves both stacks as they were.
//!
//! ```text
//! execute(c5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [c1, c2, c3, c4, c5]              │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [c1, c2, c3]                      │
//! │ Redo Stack: [c4, c5]                          │
//! └───────────────────────────────────────────────┘
//!
//! execute(c6)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [c1, c2, c3, c6]                  │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glyphdeck_doc::Document;

use crate::command::{Command, MergeConfig, traced_execute, traced_undo};
use crate::error::{CommandError, CommandResult, ValidationFailure};
use crate::events::{EventBus, HistoryEvent, SubscriptionId};

// ---------------------------------------------------------------------------
// Monotonic counters
// ---------------------------------------------------------------------------

static COMMANDS_EXECUTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static COMMANDS_MERGED_TOTAL: AtomicU64 = AtomicU64::new(0);
static COMMANDS_UNDONE_TOTAL: AtomicU64 = AtomicU64::new(0);
static COMMANDS_REDONE_TOTAL: AtomicU64 = AtomicU64::new(0);
static COMMANDS_EVICTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static COMMANDS_REJECTED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Process-wide totals across every [`CommandHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryCounters {
    pub executed: u64,
    pub merged: u64,
    pub undone: u64,
    pub redone: u64,
    pub evicted: u64,
    pub rejected: u64,
}

/// Snapshot of the process-wide counters.
#[must_use]
pub fn history_counters() -> HistoryCounters {
    HistoryCounters {
        executed: COMMANDS_EXECUTED_TOTAL.load(Ordering::Relaxed),
        merged: COMMANDS_MERGED_TOTAL.load(Ordering::Relaxed),
        undone: COMMANDS_UNDONE_TOTAL.load(Ordering::Relaxed),
        redone: COMMANDS_REDONE_TOTAL.load(Ordering::Relaxed),
        evicted: COMMANDS_EVICTED_TOTAL.load(Ordering::Relaxed),
        rejected: COMMANDS_REJECTED_TOTAL.load(Ordering::Relaxed),
    }
}

// ---------------------------------------------------------------------------
// Configuration and status
// ---------------------------------------------------------------------------

/// Configuration for the history.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of entries on the undo stack.
    pub max_size: usize,
    /// Maximum total bytes across both stacks (0 = unlimited).
    pub max_bytes: usize,
    /// Initial value of the merging switch.
    pub merging_enabled: bool,
    /// Merge window and limits.
    pub merge: MergeConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            max_bytes: 0,
            merging_enabled: true,
            merge: MergeConfig::default(),
        }
    }
}

impl HistoryConfig {
    /// Create a configuration with the given depth limit.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    /// Set the byte budget.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Set the merge configuration.
    #[must_use]
    pub fn with_merge_config(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    /// Set the initial merging switch.
    #[must_use]
    pub fn with_merging(mut self, enabled: bool) -> Self {
        self.merging_enabled = enabled;
        self
    }

    /// No depth or byte limit.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_size: usize::MAX,
            ..Self::default()
        }
    }

    /// Validate this configuration, returning a list of problems.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_size == 0 {
            errors.push("history.max_size must be at least 1".to_string());
        }
        if self.merge.max_merged_cells == 0 {
            errors.push("history.merge.max_merged_cells must be at least 1".to_string());
        }
        errors
    }
}

/// Snapshot of what undo/redo would do next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_count: usize,
    pub redo_count: usize,
    pub next_undo_description: Option<String>,
    pub next_redo_description: Option<String>,
}

/// What [`CommandHistory::execute`] did with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Executed and pushed as a new undo entry.
    Executed,
    /// Executed and folded into the previous entry.
    Merged,
    /// A precondition failed; nothing changed.
    Rejected(ValidationFailure),
}

impl ExecuteOutcome {
    /// Whether the document changed.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// The failed precondition, if rejected.
    #[must_use]
    pub fn rejection(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Rejected(failure) => Some(failure),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CommandHistory
// ---------------------------------------------------------------------------

/// Undo/redo history over a [`Document`].
pub struct CommandHistory {
    /// Commands available for undo (newest at back).
    undo_stack: VecDeque<Box<dyn Command>>,
    /// Commands available for redo (newest at back).
    redo_stack: VecDeque<Box<dyn Command>>,
    config: HistoryConfig,
    merging_enabled: bool,
    /// Whether the top of the undo stack may absorb the next command.
    merge_anchor: bool,
    total_bytes: usize,
    events: EventBus,
}

impl fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("total_bytes", &self.total_bytes)
            .field("merging_enabled", &self.merging_enabled)
            .field("merge_anchor", &self.merge_anchor)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl CommandHistory {
    /// Create a history with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            merging_enabled: config.merging_enabled,
            config,
            merge_anchor: false,
            total_bytes: 0,
            events: EventBus::new(),
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Execute `cmd` against `doc`, merging into the previous entry if
    /// possible.
    pub fn execute(
        &mut self,
        cmd: Box<dyn Command>,
        doc: &mut Document,
    ) -> CommandResult<ExecuteOutcome> {
        self.execute_with(cmd, doc, true)
    }

    /// Execute `cmd` against `doc`.
    ///
    /// - A failed precondition yields `Ok(Rejected)` with nothing changed.
    /// - Any other execute error is returned with both stacks untouched.
    /// - With `allow_merge`, merging enabled, and a compatible top entry, the
    ///   command is executed and folded into that entry.
    /// - Otherwise it is pushed, the redo stack is cleared, and the oldest
    ///   entries are evicted past the limits.
    pub fn execute_with(
        &mut self,
        mut cmd: Box<dyn Command>,
        doc: &mut Document,
        allow_merge: bool,
    ) -> CommandResult<ExecuteOutcome> {
        if let Err(failure) = cmd.validate(doc) {
            return Ok(self.reject(cmd.as_ref(), failure));
        }

        if allow_merge && self.merging_enabled && self.merge_candidate(cmd.as_ref()) {
            return self.execute_merged(cmd, doc);
        }

        match traced_execute(cmd.as_mut(), doc, false) {
            Ok(()) => {}
            Err(CommandError::Validation(failure)) => {
                return Ok(self.reject(cmd.as_ref(), failure));
            }
            Err(err) => {
                tracing::warn!(
                    target: "glyphdeck.history",
                    kind = cmd.debug_name(),
                    error = %err,
                    "command execute failed"
                );
                return Err(err);
            }
        }

        let event = self
            .events
            .has_listeners()
            .then(|| HistoryEvent::Executed {
                command: cmd.details(),
            });

        self.clear_redo();
        self.total_bytes += cmd.size_bytes();
        tracing::debug!(
            target: "glyphdeck.history",
            kind = cmd.debug_name(),
            description = %cmd.description(),
            size_bytes = cmd.size_bytes(),
            undo_depth = self.undo_stack.len() + 1,
            "command executed"
        );
        self.undo_stack.push_back(cmd);
        self.merge_anchor = true;
        COMMANDS_EXECUTED_TOTAL.fetch_add(1, Ordering::Relaxed);

        self.enforce_limits();
        self.notify(event);
        Ok(ExecuteOutcome::Executed)
    }

    /// Undo the newest command.
    ///
    /// Returns `Ok(false)` if there is nothing to undo. On error the command
    /// stays on the undo stack.
    pub fn undo(&mut self, doc: &mut Document) -> CommandResult<bool> {
        let Some(mut cmd) = self.undo_stack.pop_back() else {
            return Ok(false);
        };

        let old_size = cmd.size_bytes();
        if let Err(err) = traced_undo(cmd.as_mut(), doc) {
            tracing::warn!(
                target: "glyphdeck.history",
                kind = cmd.debug_name(),
                description = %cmd.description(),
                error = %err,
                "undo failed"
            );
            self.undo_stack.push_back(cmd);
            return Err(err);
        }

        let event = self
            .events
            .has_listeners()
            .then(|| HistoryEvent::Undone {
                command: cmd.details(),
            });
        tracing::debug!(
            target: "glyphdeck.history",
            kind = cmd.debug_name(),
            description = %cmd.description(),
            undo_depth = self.undo_stack.len(),
            "command undone"
        );
        self.reaccount(old_size, cmd.size_bytes());
        self.redo_stack.push_back(cmd);
        self.merge_anchor = !self.undo_stack.is_empty();
        COMMANDS_UNDONE_TOTAL.fetch_add(1, Ordering::Relaxed);

        self.notify(event);
        Ok(true)
    }

    /// Redo the most recently undone command.
    ///
    /// Returns `Ok(false)` if there is nothing to redo. On error the command
    /// stays on the redo stack.
    pub fn redo(&mut self, doc: &mut Document) -> CommandResult<bool> {
        let Some(mut cmd) = self.redo_stack.pop_back() else {
            return Ok(false);
        };

        let old_size = cmd.size_bytes();
        if let Err(err) = traced_execute(cmd.as_mut(), doc, true) {
            tracing::warn!(
                target: "glyphdeck.history",
                kind = cmd.debug_name(),
                description = %cmd.description(),
                error = %err,
                "redo failed"
            );
            self.redo_stack.push_back(cmd);
            return Err(err);
        }

        let event = self
            .events
            .has_listeners()
            .then(|| HistoryEvent::Redone {
                command: cmd.details(),
            });
        tracing::debug!(
            target: "glyphdeck.history",
            kind = cmd.debug_name(),
            description = %cmd.description(),
            redo_depth = self.redo_stack.len(),
            "command redone"
        );
        self.reaccount(old_size, cmd.size_bytes());
        self.undo_stack.push_back(cmd);
        self.merge_anchor = true;
        COMMANDS_REDONE_TOTAL.fetch_add(1, Ordering::Relaxed);

        self.notify(event);
        Ok(true)
    }

    /// Drop both stacks. Emits nothing when already empty.
    pub fn clear(&mut self) {
        let undo_count = self.undo_stack.len();
        let redo_count = self.redo_stack.len();
        self.merge_anchor = false;
        if undo_count == 0 && redo_count == 0 {
            return;
        }
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_bytes = 0;
        tracing::debug!(
            target: "glyphdeck.history",
            undo_count,
            redo_count,
            "history cleared"
        );
        self.notify(Some(HistoryEvent::Cleared {
            undo_count,
            redo_count,
        }));
    }

    /// Turn merging on or off.
    ///
    /// Turning it off also drops the merge anchor, so re-enabling can never
    /// merge into a command from before the switch.
    pub fn set_merging_enabled(&mut self, enabled: bool) {
        self.merging_enabled = enabled;
        if !enabled {
            self.merge_anchor = false;
        }
    }

    /// Whether merging is on.
    #[must_use]
    pub fn is_merging_enabled(&self) -> bool {
        self.merging_enabled
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of undoable entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable entries.
    #[must_use]
    pub fn redo_size(&self) -> usize {
        self.redo_stack.len()
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Current stack status.
    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            next_undo_description: self.next_undo_description().map(str::to_string),
            next_redo_description: self.next_redo_description().map(str::to_string),
        }
    }

    /// Descriptions of undo entries, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Descriptions of redo entries, most recent first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Description of the next undo.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Description of the next redo.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.description())
    }

    /// The command the next execute may merge into, if any.
    #[must_use]
    pub fn last_command(&self) -> Option<&dyn Command> {
        if self.merge_anchor {
            self.undo_stack.back().map(Box::as_ref)
        } else {
            None
        }
    }

    /// Every command held, undo side oldest first, then the redo side.
    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(Box::as_ref)
    }

    /// Total bytes accounted to both stacks.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Register an event listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&HistoryEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn merge_candidate(&self, cmd: &dyn Command) -> bool {
        self.merge_anchor
            && self
                .undo_stack
                .back()
                .is_some_and(|last| last.can_merge(cmd, &self.config.merge))
    }

    /// Execute `cmd`, then fold it into the top entry. If the fold fails the
    /// incoming command is rolled back.
    fn execute_merged(
        &mut self,
        mut cmd: Box<dyn Command>,
        doc: &mut Document,
    ) -> CommandResult<ExecuteOutcome> {
        match traced_execute(cmd.as_mut(), doc, false) {
            Ok(()) => {}
            Err(CommandError::Validation(failure)) => {
                return Ok(self.reject(cmd.as_ref(), failure));
            }
            Err(err) => return Err(err),
        }

        let Some(last) = self.undo_stack.back_mut() else {
            return Err(CommandError::drift("a merge target", "an empty undo stack"));
        };
        let old_size = last.size_bytes();
        if let Err(err) = last.merge(cmd.as_ref()) {
            tracing::warn!(
                target: "glyphdeck.history",
                kind = cmd.debug_name(),
                error = %err,
                "merge failed, rolling back"
            );
            if let Err(undo_err) = traced_undo(cmd.as_mut(), doc) {
                tracing::warn!(
                    target: "glyphdeck.history",
                    kind = cmd.debug_name(),
                    error = %undo_err,
                    "rollback after failed merge also failed"
                );
            }
            return Err(err);
        }
        let new_size = last.size_bytes();
        self.total_bytes = self.total_bytes.saturating_sub(old_size) + new_size;

        let event = self.events.has_listeners().then(|| HistoryEvent::Merged {
            target: last.details(),
            merged: cmd.details(),
        });
        tracing::debug!(
            target: "glyphdeck.history",
            kind = last.debug_name(),
            description = %last.description(),
            size_bytes = new_size,
            "command merged"
        );
        COMMANDS_MERGED_TOTAL.fetch_add(1, Ordering::Relaxed);

        self.clear_redo();
        self.enforce_limits();
        self.notify(event);
        Ok(ExecuteOutcome::Merged)
    }

    fn reject(&mut self, cmd: &dyn Command, failure: ValidationFailure) -> ExecuteOutcome {
        COMMANDS_REJECTED_TOTAL.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            target: "glyphdeck.history",
            kind = cmd.debug_name(),
            reason = %failure,
            "command rejected"
        );
        ExecuteOutcome::Rejected(failure)
    }

    /// Replace an entry's previous size with its current one.
    fn reaccount(&mut self, old_size: usize, new_size: usize) {
        self.total_bytes = self.total_bytes.saturating_sub(old_size) + new_size;
    }

    fn clear_redo(&mut self) {
        for cmd in self.redo_stack.drain(..) {
            self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
        }
    }

    /// Evict the oldest undo entries past the depth and byte limits.
    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_size {
            self.evict_oldest();
        }

        if self.config.max_bytes > 0 {
            while self.total_bytes > self.config.max_bytes && self.undo_stack.len() > 1 {
                self.evict_oldest();
            }
        }

        if self.undo_stack.is_empty() {
            self.merge_anchor = false;
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(cmd) = self.undo_stack.pop_front() {
            self.total_bytes = self.total_bytes.saturating_sub(cmd.size_bytes());
            COMMANDS_EVICTED_TOTAL.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                target: "glyphdeck.history",
                kind = cmd.debug_name(),
                description = %cmd.description(),
                "command evicted"
            );
        }
    }

    fn notify(&mut self, event: Option<HistoryEvent>) {
        if !self.events.has_listeners() {
            return;
        }
        if let Some(event) = event {
            self.events.emit(&event);
        }
        let status = self.status();
        self.events.emit(&HistoryEvent::Changed { status });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{AddLayerCmd, RemoveLayerCmd, ReorderLayerCmd, SetLayerPropsCmd};
    use glyphdeck_doc::LayerId;
    use std::sync::{Arc, Mutex};

    fn doc_abc() -> Document {
        let mut doc = Document::with_layer(4, 4, "A");
        for name in ["B", "C"] {
            let layer = doc.new_layer(name);
            let len = doc.layer_count();
            doc.insert_layer(len, layer).unwrap();
        }
        doc
    }

    fn rename(id: u64, name: &str) -> Box<dyn Command> {
        Box::new(SetLayerPropsCmd::rename(LayerId::new(id), name))
    }

    fn names(doc: &Document) -> Vec<&str> {
        doc.layers().iter().map(|l| l.name()).collect()
    }

    #[test]
    fn new_history_is_empty() {
        let history = CommandHistory::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.size(), 0);
        assert_eq!(history.memory_usage(), 0);
        assert!(history.last_command().is_none());
        assert_eq!(history.status(), HistoryStatus::default());
    }

    #[test]
    fn execute_undo_redo_cycle() {
        let mut doc = doc_abc();
        let before = doc.clone();
        let mut history = CommandHistory::default();

        let outcome = history.execute(rename(1, "Ink"), &mut doc).unwrap();
        assert_eq!(outcome, ExecuteOutcome::Executed);
        let after = doc.clone();
        assert_eq!(doc.layer(LayerId::new(1)).unwrap().name(), "Ink");

        assert!(history.undo(&mut doc).unwrap());
        assert_eq!(doc, before);
        assert!(history.can_redo());

        assert!(history.redo(&mut doc).unwrap());
        assert_eq!(doc, after);
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_redo_on_empty_return_false() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        assert!(!history.undo(&mut doc).unwrap());
        assert!(!history.redo(&mut doc).unwrap());
    }

    #[test]
    fn new_command_clears_redo() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        history.execute(rename(1, "x"), &mut doc).unwrap();
        history.execute(rename(2, "y"), &mut doc).unwrap();
        history.undo(&mut doc).unwrap();
        assert_eq!(history.redo_size(), 1);

        history.execute(rename(3, "z"), &mut doc).unwrap();
        assert_eq!(history.redo_size(), 0);
        assert!(!history.redo(&mut doc).unwrap());
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::new(HistoryConfig::new(3));
        for i in 0..5 {
            history
                .execute(rename(1, &format!("n{i}")), &mut doc)
                .unwrap();
        }
        assert_eq!(history.size(), 3);
        assert_eq!(
            history.undo_descriptions(10),
            ["Rename layer", "Rename layer", "Rename layer"]
        );
        for _ in 0..3 {
            assert!(history.undo(&mut doc).unwrap());
        }
        assert!(!history.undo(&mut doc).unwrap());
        assert_eq!(doc.layer(LayerId::new(1)).unwrap().name(), "n1");
    }

    #[test]
    fn zero_max_size_keeps_nothing() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::new(HistoryConfig::new(0));
        history.execute(rename(1, "x"), &mut doc).unwrap();
        assert_eq!(history.size(), 0);
        assert!(history.last_command().is_none());
        assert_eq!(history.memory_usage(), 0);
        assert_eq!(doc.layer(LayerId::new(1)).unwrap().name(), "x");
    }

    #[test]
    fn byte_limit_keeps_newest() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::new(HistoryConfig::unlimited().with_max_bytes(1));
        history.execute(rename(1, "x"), &mut doc).unwrap();
        history.execute(rename(2, "y"), &mut doc).unwrap();
        assert_eq!(history.size(), 1);
        assert!(history.memory_usage() > 1);
    }

    #[test]
    fn merged_paint_stays_accounted_across_undo_redo() {
        use crate::commands::PaintCellsCmd;
        use glyphdeck_doc::Cell;

        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        let a = LayerId::new(1);
        for x in 0..3 {
            let paint = PaintCellsCmd::single(a, x, 0, Cell::new('#')).with_stroke(1);
            history.execute(Box::new(paint), &mut doc).unwrap();
        }
        assert_eq!(history.size(), 1);

        let top = |h: &CommandHistory| h.last_command().map_or(0, |c| c.size_bytes());
        assert_eq!(history.memory_usage(), top(&history));

        history.undo(&mut doc).unwrap();
        history.redo(&mut doc).unwrap();
        assert_eq!(history.memory_usage(), top(&history));
    }

    #[test]
    fn memory_accounting_tracks_both_stacks() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        history.execute(rename(1, "x"), &mut doc).unwrap();
        let one = history.memory_usage();
        assert!(one > 0);
        history.undo(&mut doc).unwrap();
        assert_eq!(history.memory_usage(), one);
        history.execute(rename(2, "y"), &mut doc).unwrap();
        assert_eq!(history.size(), 1);
        history.clear();
        assert_eq!(history.memory_usage(), 0);
    }

    #[test]
    fn rejected_command_changes_nothing() {
        let mut doc = Document::with_layer(4, 4, "only");
        let before = doc.clone();
        let mut history = CommandHistory::default();
        let outcome = history
            .execute(Box::new(RemoveLayerCmd::new(LayerId::new(1))), &mut doc)
            .unwrap();
        assert_eq!(outcome, ExecuteOutcome::Rejected(ValidationFailure::LastLayer));
        assert!(!outcome.is_applied());
        assert_eq!(doc, before);
        assert_eq!(history.size(), 0);
    }

    #[test]
    fn reorders_merge_within_window() {
        let mut doc = doc_abc();
        let b = LayerId::new(2);
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(ReorderLayerCmd::new(b, 1, 2)), &mut doc)
            .unwrap();
        let outcome = history
            .execute(Box::new(ReorderLayerCmd::new(b, 2, 0)), &mut doc)
            .unwrap();
        assert_eq!(outcome, ExecuteOutcome::Merged);
        assert_eq!(history.size(), 1);
        assert_eq!(names(&doc), ["B", "A", "C"]);

        history.undo(&mut doc).unwrap();
        assert_eq!(names(&doc), ["A", "B", "C"]);
    }

    #[test]
    fn allow_merge_false_pushes() {
        let mut doc = doc_abc();
        let b = LayerId::new(2);
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(ReorderLayerCmd::new(b, 1, 2)), &mut doc)
            .unwrap();
        let outcome = history
            .execute_with(Box::new(ReorderLayerCmd::new(b, 2, 0)), &mut doc, false)
            .unwrap();
        assert_eq!(outcome, ExecuteOutcome::Executed);
        assert_eq!(history.size(), 2);
    }

    #[test]
    fn disabling_merging_drops_anchor() {
        let mut doc = doc_abc();
        let b = LayerId::new(2);
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(ReorderLayerCmd::new(b, 1, 2)), &mut doc)
            .unwrap();
        assert!(history.last_command().is_some());
        history.set_merging_enabled(false);
        assert!(history.last_command().is_none());
        history.set_merging_enabled(true);

        let outcome = history
            .execute(Box::new(ReorderLayerCmd::new(b, 2, 0)), &mut doc)
            .unwrap();
        assert_eq!(outcome, ExecuteOutcome::Executed);
        assert_eq!(history.size(), 2);
    }

    #[test]
    fn undo_moves_anchor_to_new_top() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        history.execute(rename(1, "x"), &mut doc).unwrap();
        history.execute(rename(2, "y"), &mut doc).unwrap();
        history.undo(&mut doc).unwrap();
        assert_eq!(
            history.last_command().map(|c| c.description()),
            Some("Rename layer")
        );
        history.undo(&mut doc).unwrap();
        assert!(history.last_command().is_none());
    }

    #[test]
    fn status_reports_descriptions() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(AddLayerCmd::new("D")), &mut doc)
            .unwrap();
        history.execute(rename(1, "x"), &mut doc).unwrap();
        history.undo(&mut doc).unwrap();

        let status = history.status();
        assert!(status.can_undo);
        assert!(status.can_redo);
        assert_eq!(status.undo_count, 1);
        assert_eq!(status.redo_count, 1);
        assert_eq!(status.next_undo_description.as_deref(), Some("Add layer"));
        assert_eq!(status.next_redo_description.as_deref(), Some("Rename layer"));
    }

    #[test]
    fn failed_undo_keeps_command_on_stack() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(AddLayerCmd::new("D")), &mut doc)
            .unwrap();
        let added = doc.active_layer_id().unwrap();
        // Remove the added layer behind the history's back.
        doc.remove_layer(added).unwrap();
        doc.set_active(LayerId::new(1)).unwrap();

        let err = history.undo(&mut doc).unwrap_err();
        assert!(err.is_drift());
        assert_eq!(history.size(), 1);
        assert_eq!(history.redo_size(), 0);
    }

    #[test]
    fn events_in_order() {
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        history.subscribe(move |e| sink.lock().unwrap().push(e.name()));

        history.execute(rename(1, "x"), &mut doc).unwrap();
        history.undo(&mut doc).unwrap();
        history.redo(&mut doc).unwrap();
        history.clear();
        history.clear();

        assert_eq!(
            *seen.lock().unwrap(),
            [
                "history:executed",
                "history:changed",
                "history:undone",
                "history:changed",
                "history:redone",
                "history:changed",
                "history:cleared",
                "history:changed",
            ]
        );
    }

    #[test]
    fn merged_event_carries_both_commands() {
        let mut doc = doc_abc();
        let b = LayerId::new(2);
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(ReorderLayerCmd::new(b, 1, 2)), &mut doc)
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        history.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        history
            .execute(Box::new(ReorderLayerCmd::new(b, 2, 0)), &mut doc)
            .unwrap();

        let events = seen.lock().unwrap();
        let HistoryEvent::Merged { target, merged } = &events[0] else {
            panic!("expected merged event, got {:?}", events[0]);
        };
        assert_eq!(target.get("to"), Some("0"));
        assert_eq!(merged.get("from"), Some("2"));
        assert!(matches!(events[1], HistoryEvent::Changed { .. }));
    }

    #[test]
    fn counters_increment() {
        let before = history_counters();
        let mut doc = doc_abc();
        let mut history = CommandHistory::default();
        history.execute(rename(1, "x"), &mut doc).unwrap();
        history.undo(&mut doc).unwrap();
        let after = history_counters();
        assert!(after.executed > before.executed);
        assert!(after.undone > before.undone);
    }

    #[test]
    fn config_validation() {
        assert!(HistoryConfig::default().validate().is_empty());
        let errors = HistoryConfig::new(0).validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("max_size"));
    }
}
