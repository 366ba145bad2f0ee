use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use serde_json::json;
use tale_diagnostic::ErrorCode;
use tale_ir::{Position, Range};

use super::*;

fn workspace(documents: &[(&str, &str)]) -> Workspace {
    let mut workspace = Workspace::new();
    for (uri, text) in documents {
        assert!(workspace.add_document(uri, 1, text));
    }
    workspace
}

fn at(line: u32, character: u32) -> Position {
    Position::new(line, character)
}

#[test]
fn test_compile_is_memoized() {
    let mut ws = workspace(&[("main.tale", "Hello\n")]);
    let first = ws.compile("main.tale");
    let second = ws.compile("main.tale");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_edit_invalidates_memo() {
    let mut ws = workspace(&[("main.tale", "Hello\n")]);
    let first = ws.compile("main.tale");
    assert!(ws.update_document(
        "main.tale",
        2,
        &[ContentChange::replace(Range::new(at(0, 5), at(0, 5)), " there")]
    ));
    let second = ws.compile("main.tale");
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.version, 2);
}

#[test]
fn test_reused_version_is_rejected() {
    let mut ws = workspace(&[("main.tale", "Hello\n")]);
    let first = ws.compile("main.tale");
    assert!(!ws.update_document("main.tale", 1, &[ContentChange::full("Bye\n")]));
    assert!(!ws.update_document("main.tale", 0, &[ContentChange::full("Bye\n")]));
    assert_eq!(
        ws.documents().document("main.tale").map(|d| d.text().to_string()),
        Some("Hello\n".to_string())
    );
    assert!(Arc::ptr_eq(&first, &ws.compile("main.tale")));
}

#[test]
fn test_edit_to_an_include_invalidates_the_root() {
    let mut ws = workspace(&[("main.tale", "INCLUDE intro\n"), ("intro.tale", "-> start\n")]);
    let first = ws.compile("main.tale");
    assert_eq!(first.diagnostics_for("intro.tale").len(), 1);
    assert!(ws.update_document("intro.tale", 2, &[ContentChange::full("-> END\n")]));
    let second = ws.compile("main.tale");
    assert!(second.diagnostics_for("intro.tale").is_empty());
    assert_eq!(second.scripts.get("intro.tale"), Some(&2));
}

#[test]
fn test_documents_and_files_report_changes() {
    let mut ws = workspace(&[("main.tale", "Hi\n")]);
    assert!(!ws.add_document("main.tale", 3, "Other\n"));
    assert_eq!(ws.documents().document("main.tale").map(|d| d.version()), Some(1));
    assert!(!ws.update_document("ghost.tale", 1, &[]));
    assert!(ws.remove_document("main.tale"));
    assert!(!ws.remove_document("main.tale"));

    assert!(ws.add_file(FileInfo::new("hero.png")));
    assert!(!ws.add_file(FileInfo::new("hero.png")));
    assert!(ws.update_file(FileInfo::new("hero.png")));
    assert!(!ws.update_file(FileInfo::new("villain.png")));
    assert!(ws.remove_file("hero.png"));
    assert!(!ws.remove_file("hero.png"));
}

#[test]
fn test_adding_a_file_resolves_a_warning() {
    let mut ws = workspace(&[("main.tale", "See [[hero]]\n")]);
    let before = ws.compile("main.tale");
    assert_eq!(
        before
            .diagnostics_for("main.tale")
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>(),
        vec!["Cannot find image named 'hero'"]
    );
    ws.add_file(FileInfo::new("art/hero.png"));
    let after = ws.compile("main.tale");
    assert!(after.diagnostics_for("main.tale").is_empty());
    assert_eq!(after.files.len(), 1);
}

#[test]
fn test_configure_swaps_builtins() {
    let mut ws = workspace(&[("main.tale", "== portrait ==\nHi\n")]);
    let first = ws.compile("main.tale");
    assert!(first.diagnostics_for("main.tale").is_empty());

    let generation = ws.generation();
    let config = CompilerConfig {
        builtins: Some(json!({ "portrait": { "$default": { "src": "" } } })),
        ..CompilerConfig::default()
    };
    assert!(ws.configure(config).is_ok());
    assert!(ws.generation() > generation);
    assert!(ws.builtins().is_builtin_type("portrait"));

    let second = ws.compile("main.tale");
    let codes: Vec<ErrorCode> = second.diagnostics_for("main.tale").iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2004]);
}

#[test]
fn test_failed_configure_keeps_previous_state() {
    let mut ws = Workspace::new();
    let generation = ws.generation();
    let config = CompilerConfig {
        builtins: Some(json!(["not", "an", "object"])),
        ..CompilerConfig::default()
    };
    assert!(ws.configure(config).is_err());
    assert_eq!(ws.generation(), generation);
    assert!(ws.builtins().is_builtin_type("image"));
}

#[test]
fn test_evaluate() {
    let ws = Workspace::new();
    let mut variables = BTreeMap::new();
    variables.insert("gold".to_string(), Value::Int(3));
    assert_eq!(ws.evaluate("gold * 2 + 1", &variables), Ok(Value::Int(7)));
    assert_eq!(
        ws.evaluate("silver", &variables),
        Err(EvalError::UnknownVariable("silver".to_string()))
    );
}

#[test]
fn test_resolve_file() {
    let ws = workspace(&[("story/main.tale", ""), ("story/parts/intro.ink", "")]);
    assert_eq!(
        ws.resolve_file("story/main.tale", "parts/intro"),
        Ok("story/parts/intro.ink".to_string())
    );
    assert!(matches!(
        ws.resolve_file("story/main.tale", "outro"),
        Err(ResolveError::NotFound { .. })
    ));
}
