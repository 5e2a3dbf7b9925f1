#![forbid(unsafe_code)]
#![cfg(feature = "serde")]

//! JSON shape of the serializable value types.

use glyphdeck_doc::{Cell, CellSnapshot, ColorIndex, Cursor, LayerId, ResizeStrategy};

#[test]
fn cell_snapshot_serializes_coordinates_and_cell() {
    let snap = CellSnapshot::new(3, 1, Cell::with_colors('@', ColorIndex::new(2), ColorIndex::new(5)));
    let value = serde_json::to_value(snap).unwrap();
    assert_eq!(value["x"], 3);
    assert_eq!(value["y"], 1);
    assert_eq!(value["cell"]["glyph"], "@");

    let back: CellSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn cursor_and_strategy_names() {
    assert_eq!(serde_json::to_string(&Cursor::at(LayerId::new(4))).unwrap(), "4");
    assert_eq!(serde_json::to_string(&Cursor::NONE).unwrap(), "null");
    assert_eq!(serde_json::to_string(&ResizeStrategy::Center).unwrap(), "\"center\"");
}
