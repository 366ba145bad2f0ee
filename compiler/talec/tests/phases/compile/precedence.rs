//! Merge precedence of context layers and validation against builtins.

use pretty_assertions::assert_eq;
use serde_json::json;
use tale_diagnostic::ErrorCode;

use crate::common::{codes, workspace};

#[test]
fn explicit_over_file_over_builtin_default() {
    let text = "define image.hero:\n  width = 20\n";
    let mut ws = workspace(&[("main.tale", text)], &["hero.png"]);
    let program = ws.compile("main.tale");
    let hero = program.context.get("image", "hero").cloned().unwrap_or_default();
    assert_eq!(hero["src"], json!("hero.png"));
    assert_eq!(hero["width"], json!(20));
    assert_eq!(hero["anchor"], json!("center"));
}

#[test]
fn document_default_applies_to_file_structs() {
    let text = "define image.$default:\n  anchor = \"top\"\n";
    let mut ws = workspace(&[("main.tale", text)], &["hero.png"]);
    let program = ws.compile("main.tale");
    let hero = program.context.get("image", "hero").cloned().unwrap_or_default();
    assert_eq!(hero["anchor"], json!("top"));
    assert_eq!(hero["src"], json!("hero.png"));
}

#[test]
fn explicit_definition_beats_inferred_font() {
    let text = "define font.Lora-Bold:\n  weight = 650\n";
    let mut ws = workspace(&[("main.tale", text)], &["Lora-Bold.ttf"]);
    let program = ws.compile("main.tale");
    let lora = program.context.get("font", "Lora-Bold").cloned().unwrap_or_default();
    assert_eq!(lora["weight"], json!(650));
    assert_eq!(lora["family"], json!("Lora"));
}

#[test]
fn later_definition_replaces_earlier_one() {
    let text = "define font.title:\n  family = \"Lora\"\n  size = 30\ndefine font.title:\n  family = \"Inter\"\n";
    let mut ws = workspace(&[("main.tale", text)], &[]);
    let program = ws.compile("main.tale");
    let title = program.context.get("font", "title").cloned().unwrap_or_default();
    assert_eq!(title["family"], json!("Inter"));
    assert!(title.get("size").is_none());
}

#[test]
fn definitions_in_included_scripts_count() {
    let mut ws = workspace(
        &[
            ("main.tale", "INCLUDE assets\n== opening ==\n[[ann]]\n"),
            ("assets.tale", "define image.ann:\n  src = \"ann.png\"\n"),
        ],
        &[],
    );
    let program = ws.compile("main.tale");
    assert!(codes(&program, "main.tale").is_empty());
    assert!(program.context.contains("image", "ann"));
}

#[test]
fn literal_and_reference_types_are_checked() {
    let text = "define image.hero:\n  width = \"wide\"\n  height = \"auto\"\ndefine character.ann:\n  portrait = font.serif\n";
    let mut ws = workspace(&[("main.tale", text)], &[]);
    let program = ws.compile("main.tale");
    let mut found = codes(&program, "main.tale");
    found.sort();
    assert_eq!(found, vec![ErrorCode::E2002, ErrorCode::E2003]);
}

#[test]
fn knots_may_not_use_builtin_type_names() {
    let mut ws = workspace(&[("main.tale", "== audio ==\nHi\n== story ==\nHi\n")], &[]);
    let program = ws.compile("main.tale");
    let diagnostics = program.diagnostics_for("main.tale");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E2004);
    assert_eq!(diagnostics[0].range.start.line, 0);
    assert!(diagnostics[0].is_error());
}

#[test]
fn cyclic_filtered_images_are_reported() {
    let text = "define filtered_image.a:\n  image = b\ndefine filtered_image.b:\n  image = a\n[[a]]\n";
    let mut ws = workspace(&[("main.tale", text)], &[]);
    let program = ws.compile("main.tale");
    let cycles = codes(&program, "main.tale")
        .into_iter()
        .filter(|code| *code == ErrorCode::E2006)
        .count();
    assert_eq!(cycles, 2);
}
