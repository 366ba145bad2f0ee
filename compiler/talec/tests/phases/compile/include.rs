//! `INCLUDE` resolution and stitching across scripts.

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{codes, workspace};

#[test]
fn included_top_level_content_comes_before_the_root() {
    let mut ws = workspace(
        &[
            ("main.tale", "INCLUDE intro\nHello\n-> start\n== start ==\nGo\n"),
            ("intro.tale", "Once upon a time\n"),
        ],
        &[],
    );
    let program = ws.compile("main.tale");

    let scripts: Vec<&str> = program.scripts.keys().map(String::as_str).collect();
    assert_eq!(scripts, vec!["main.tale", "intro.tale"]);

    let root = program.compiled["root"].as_array().cloned().unwrap_or_default();
    assert_eq!(root.len(), 3);
    assert_eq!(program.path_locations["0"].script_index, 1);
    assert_eq!(program.path_locations["1"].script_index, 0);
    assert_eq!(program.compiled["flows"]["start"]["kind"], json!("knot"));
    assert!(codes(&program, "main.tale").is_empty());
    assert!(codes(&program, "intro.tale").is_empty());
}

#[test]
fn includes_resolve_relative_to_the_including_script() {
    let mut ws = workspace(
        &[
            ("story/main.tale", "INCLUDE parts/intro\n"),
            ("story/parts/intro.ink", "INCLUDE ../outro\n"),
            ("story/outro.txt", "The end\n"),
        ],
        &[],
    );
    let program = ws.compile("story/main.tale");
    let scripts: Vec<&str> = program.scripts.keys().map(String::as_str).collect();
    assert_eq!(
        scripts,
        vec!["story/main.tale", "story/parts/intro.ink", "story/outro.txt"]
    );
}

#[test]
fn opening_the_missing_include_recompiles() {
    let mut ws = workspace(&[("main.tale", "INCLUDE intro\n-> side\n")], &[]);
    let before = ws.compile("main.tale");
    assert_eq!(before.scripts.len(), 1);
    assert_eq!(codes(&before, "main.tale"), vec![tale_diagnostic::ErrorCode::E2005]);

    assert!(ws.add_document("intro.tale", 1, "== side ==\nHi\n"));
    let after = ws.compile("main.tale");
    assert_eq!(after.scripts.len(), 2);
    assert!(codes(&after, "main.tale").is_empty());
}

#[test]
fn mutual_includes_are_visited_once() {
    let mut ws = workspace(
        &[("a.tale", "INCLUDE b\nA\n"), ("b.tale", "INCLUDE a\nB\n")],
        &[],
    );
    let program = ws.compile("a.tale");
    assert_eq!(program.scripts.len(), 2);
    let root = program.compiled["root"].as_array().cloned().unwrap_or_default();
    assert_eq!(root.len(), 2);
}

#[test]
fn diagnostics_are_keyed_by_the_script_they_come_from() {
    let mut ws = workspace(
        &[("main.tale", "INCLUDE intro\n"), ("intro.tale", "\n\n-> nowhere\n")],
        &[],
    );
    let program = ws.compile("main.tale");
    assert!(program.diagnostics_for("main.tale").is_empty());
    let intro = program.diagnostics_for("intro.tale");
    assert_eq!(intro.len(), 1);
    assert_eq!(intro[0].range.start.line, 2);
    assert!(program.has_errors());
}
