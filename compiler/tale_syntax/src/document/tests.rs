use super::*;
use pretty_assertions::assert_eq;
use tale_ir::Position;

#[test]
fn test_ranged_change() {
    let mut doc = TextDocument::new("file:///a.tale", 1, "Hello\nworld\n");
    let change = doc.apply(&ContentChange::replace(
        Range::on_line(1, 0, 5),
        "there",
    ));
    assert_eq!(doc.text(), "Hello\nthere\n");
    assert_eq!(change, TextChange::new(6, 11, 5));
}

#[test]
fn test_full_replacement() {
    let mut doc = TextDocument::new("a", 1, "old text");
    let change = doc.apply(&ContentChange::full("new"));
    assert_eq!(doc.text(), "new");
    assert_eq!(change, TextChange::new(0, 8, 3));
    assert_eq!(doc.len(), 3);
}

#[test]
fn test_sequential_changes_use_updated_text() {
    let mut doc = TextDocument::new("a", 1, "ab\n");
    doc.apply(&ContentChange::replace(
        Range::new(Position::new(0, 2), Position::new(0, 2)),
        "\ncd",
    ));
    // second change addresses the line created by the first
    doc.apply(&ContentChange::replace(Range::on_line(1, 2, 2), "!"));
    assert_eq!(doc.text(), "ab\ncd!\n");
    assert_eq!(doc.lines().line_count(), 3);
}

#[test]
fn test_range_past_end_clamps() {
    let mut doc = TextDocument::new("a", 1, "x");
    let change = doc.apply(&ContentChange::replace(Range::on_line(4, 0, 0), "y"));
    assert_eq!(doc.text(), "xy");
    assert_eq!(change, TextChange::insert(1, 1));
}

#[test]
fn test_change_deserializes_from_lsp_shape() {
    let json = r#"{"range":{"start":{"line":0,"character":1},"end":{"line":0,"character":2}},"text":"Z"}"#;
    let change: Result<ContentChange, _> = serde_json::from_str(json);
    assert_eq!(
        change.ok(),
        Some(ContentChange::replace(Range::on_line(0, 1, 2), "Z"))
    );
}
