#![forbid(unsafe_code)]

//! A full editing session through the facade.

use std::sync::{Arc, Mutex};

use glyphdeck::prelude::*;
use glyphdeck::{DocumentChange, HistoryStatus};

fn small_editor() -> Editor {
    let mut config = EditorConfig::default();
    config.document.width = 10;
    config.document.height = 10;
    Editor::new(config).unwrap()
}

#[test]
fn session_round_trip() {
    let mut editor = small_editor();
    let start = editor.document().clone();
    let base = editor.document().layer_ids()[0];

    editor
        .paint(base, [CellSnapshot::new(9, 9, Cell::new('#'))])
        .unwrap();
    editor.add_layer().unwrap();
    let top = editor.document().active_layer_id().unwrap();
    editor.rename_layer(top, "Sketch").unwrap();
    editor.move_layer(1, 0).unwrap();
    editor.resize(5, 5, ResizeStrategy::Crop).unwrap();
    editor.clear(ClearTarget::Layer(base)).unwrap();
    editor.remove_layer(top).unwrap();
    let end = editor.document().clone();
    assert_eq!(editor.history().size(), 7);

    while editor.undo().unwrap() {}
    assert_eq!(editor.document(), &start);

    while editor.redo().unwrap() {}
    assert_eq!(editor.document(), &end);
}

#[test]
fn status_reports_descriptions() {
    let mut editor = small_editor();
    assert_eq!(editor.status(), HistoryStatus::default());

    editor.resize(20, 10, ResizeStrategy::Pad).unwrap();
    let status = editor.status();
    assert!(status.can_undo);
    assert_eq!(status.next_undo_description.as_deref(), Some("Resize to 20x10"));

    editor.undo().unwrap();
    let status = editor.status();
    assert!(status.can_redo);
    assert_eq!(status.next_redo_description.as_deref(), Some("Resize to 20x10"));
}

#[test]
fn subscribers_can_unsubscribe() {
    let mut editor = small_editor();
    let names = Arc::new(Mutex::new(Vec::new()));
    let sink = names.clone();
    let id = editor.subscribe(move |event| sink.lock().unwrap().push(event.name()));

    editor.add_layer().unwrap();
    assert!(editor.unsubscribe(id));
    editor.undo().unwrap();

    assert_eq!(*names.lock().unwrap(), ["history:executed", "history:changed"]);
}

#[test]
fn journal_reports_structure_changes() {
    let mut editor = small_editor();
    editor.take_changes();
    editor.add_layer().unwrap();
    editor.move_layer(1, 0).unwrap();
    editor.undo().unwrap();

    let changes = editor.take_changes();
    let moves: Vec<_> = changes
        .iter()
        .filter_map(|c| match c {
            DocumentChange::LayerMoved { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(moves, [(1, 0), (0, 1)]);
}
