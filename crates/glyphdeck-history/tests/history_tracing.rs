#![forbid(unsafe_code)]

//! Tracing output of history operations, captured with an in-memory
//! subscriber layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glyphdeck_doc::{Document, LayerId};
use glyphdeck_history::CommandHistory;
use glyphdeck_history::commands::{AddLayerCmd, RemoveLayerCmd, ReorderLayerCmd};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Capture harness
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    target: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

struct SpanCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl SpanCapture {
    fn new() -> (Self, CaptureHandle) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle {
            spans: spans.clone(),
            events: events.clone(),
        };
        (Self { spans, events }, handle)
    }
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn messages(&self, target: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.target == target)
            .map(|e| e.message().to_string())
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            target: attrs.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let (layer, handle) = SpanCapture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

fn two_layer_doc() -> Document {
    let mut doc = Document::with_layer(4, 4, "A");
    let layer = doc.new_layer("B");
    doc.insert_layer(1, layer).unwrap();
    doc
}

// ============================================================================
// Spans
// ============================================================================

#[test]
fn execute_runs_inside_command_span() {
    let handle = with_captured_tracing(|| {
        let mut doc = two_layer_doc();
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(AddLayerCmd::new("C")), &mut doc)
            .unwrap();
    });

    let spans = handle.spans();
    let exec: Vec<_> = spans.iter().filter(|s| s.name == "command.execute").collect();
    assert_eq!(exec.len(), 1, "{spans:?}");
    assert_eq!(exec[0].target, "glyphdeck.command");
    assert_eq!(exec[0].fields.get("kind").map(String::as_str), Some("AddLayerCmd"));
    assert_eq!(exec[0].fields.get("description").map(String::as_str), Some("Add layer"));
    assert_eq!(exec[0].fields.get("redo").map(String::as_str), Some("false"));
}

#[test]
fn undo_and_redo_are_spanned() {
    let handle = with_captured_tracing(|| {
        let mut doc = two_layer_doc();
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(RemoveLayerCmd::new(LayerId::new(2))), &mut doc)
            .unwrap();
        history.undo(&mut doc).unwrap();
        history.redo(&mut doc).unwrap();
    });

    let spans = handle.spans();
    assert_eq!(spans.iter().filter(|s| s.name == "command.undo").count(), 1);
    let redo: Vec<_> = spans
        .iter()
        .filter(|s| s.name == "command.execute" && s.fields.get("redo").map(String::as_str) == Some("true"))
        .collect();
    assert_eq!(redo.len(), 1);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn history_logs_lifecycle_messages() {
    let handle = with_captured_tracing(|| {
        let mut doc = two_layer_doc();
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(ReorderLayerCmd::new(LayerId::new(1), 0, 1)), &mut doc)
            .unwrap();
        history.undo(&mut doc).unwrap();
        history.redo(&mut doc).unwrap();
        history.clear();
    });

    let messages = handle.messages("glyphdeck.history");
    for expected in ["command executed", "command undone", "command redone", "history cleared"] {
        assert!(
            messages.iter().any(|m| m == expected),
            "missing {expected:?} in {messages:?}"
        );
    }
}

#[test]
fn rejection_is_logged_at_debug() {
    let handle = with_captured_tracing(|| {
        let mut doc = Document::with_layer(4, 4, "only");
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(RemoveLayerCmd::new(LayerId::new(1))), &mut doc)
            .unwrap();
    });

    let events = handle.events();
    let rejected = events
        .iter()
        .find(|e| e.message() == "command rejected")
        .expect("rejection event");
    assert_eq!(rejected.level, tracing::Level::DEBUG);
    assert!(rejected.fields.contains_key("reason"));
}

#[test]
fn drift_on_undo_warns() {
    let handle = with_captured_tracing(|| {
        let mut doc = two_layer_doc();
        let mut history = CommandHistory::default();
        history
            .execute(Box::new(ReorderLayerCmd::new(LayerId::new(1), 0, 1)), &mut doc)
            .unwrap();
        doc.move_layer(1, 0).unwrap();
        assert!(history.undo(&mut doc).is_err());
    });

    let events = handle.events();
    let warn = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("warn event");
    assert_eq!(warn.target, "glyphdeck.history");
    assert_eq!(warn.message(), "undo failed");
    assert_eq!(warn.fields.get("kind").map(String::as_str), Some("ReorderLayerCmd"));
}
