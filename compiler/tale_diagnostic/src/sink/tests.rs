use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;
use tale_ir::Range;

fn warning(line: u32, message: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::E2001)
        .with_message(message)
        .with_range(Range::on_line(line, 0, 4))
}

#[test]
fn test_touch_records_clean_documents() {
    let mut sink = DiagnosticSink::new();
    sink.touch("file:///b.tale");
    let out = sink.finish();
    assert_eq!(out.get("file:///b.tale").map(Vec::len), Some(0));
}

#[test]
fn test_suppressed_and_duplicates_are_dropped() {
    let mut sink = DiagnosticSink::new();
    assert!(sink.push("a", warning(1, "x")));
    assert!(!sink.push("a", warning(1, "x")));
    assert!(!sink.push("a", warning(2, "y").suppressed()));
    // same diagnostic for another document is kept
    assert!(sink.push("b", warning(1, "x")));

    assert_eq!(sink.suppressed_count(), 1);
    assert_eq!(sink.get("a").len(), 1);
    assert_eq!(sink.get("missing").len(), 0);
}

#[test]
fn test_finish_sorts_by_position() {
    let mut sink = DiagnosticSink::new();
    sink.extend("a", [warning(5, "late"), warning(0, "early"), warning(2, "mid")]);
    let out = sink.finish();
    let messages: Vec<&str> = out["a"].iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["early", "mid", "late"]);
}

#[test]
fn test_error_count() {
    let mut sink = DiagnosticSink::new();
    sink.push("a", warning(0, "w"));
    sink.push(
        "a",
        Diagnostic::error(ErrorCode::E1002).with_message("Expected expression"),
    );
    assert_eq!(sink.error_count(), 1);
}
