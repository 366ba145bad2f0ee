use super::*;

#[test]
fn test_line_starts() {
    let text = "one\ntwo\n\nfour";
    let index = LineIndex::build(text);
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.line_start(1), Some(4));
    assert_eq!(index.line_start(3), Some(9));
    assert_eq!(index.line_start(4), None);
    assert_eq!(index.line_of(0), 0);
    assert_eq!(index.line_of(4), 1);
    assert_eq!(index.line_of(8), 2);
}

#[test]
fn test_position_round_trip() {
    let text = "== intro ==\nHello there\n";
    let index = LineIndex::build(text);
    let pos = index.position_at(text, 14);
    assert_eq!(pos, Position::new(1, 2));
    assert_eq!(index.offset_at(text, pos), 14);
}

#[test]
fn test_characters_count_scalars_not_bytes() {
    let text = "café au lait\nnext";
    let index = LineIndex::build(text);
    // 'a' of "au" is the 6th char but the 7th byte
    assert_eq!(index.position_at(text, 6), Position::new(0, 5));
    assert_eq!(index.offset_at(text, Position::new(0, 5)), 6);
}

#[test]
fn test_offset_clamps() {
    let text = "ab\ncd";
    let index = LineIndex::build(text);
    assert_eq!(index.offset_at(text, Position::new(0, 99)), 2);
    assert_eq!(index.offset_at(text, Position::new(9, 0)), 5);
    assert_eq!(index.position_at(text, 99), Position::new(1, 2));
}

#[test]
fn test_line_end_excludes_crlf() {
    let text = "ab\r\ncd";
    let index = LineIndex::build(text);
    assert_eq!(index.line_end(text, 0), 2);
    assert_eq!(index.line_end(text, 1), 6);
}

#[test]
fn test_span_range_conversion() {
    let text = "x\ny = 1\n";
    let index = LineIndex::build(text);
    let range = index.range_of(text, Span::new(2, 7));
    assert_eq!(range, Range::on_line(1, 0, 5));
    assert_eq!(index.span_of(text, range), Span::new(2, 7));
}
