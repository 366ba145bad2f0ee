//! Asset files, implicit structs and the references that use them.

use pretty_assertions::assert_eq;
use serde_json::json;
use tale_diagnostic::ErrorCode;

use crate::common::{codes, messages, warnings, workspace};

#[test]
fn missing_image_warns_until_its_file_is_added() {
    let mut ws = workspace(&[("main.tale", "A hero appears. [[hero]]\n")], &[]);
    let program = ws.compile("main.tale");
    assert_eq!(messages(&program, "main.tale"), vec!["Cannot find image named 'hero'"]);
    assert_eq!(warnings(&program).len(), 1);
    assert!(!program.has_errors());

    ws.add_file(talec::FileInfo::new("images/hero.png"));
    let program = ws.compile("main.tale");
    assert!(messages(&program, "main.tale").is_empty());
    let hero = program.context.get("image", "hero").cloned().unwrap_or_default();
    assert_eq!(hero["src"], json!("images/hero.png"));

    ws.remove_file("images/hero.png");
    let program = ws.compile("main.tale");
    assert_eq!(messages(&program, "main.tale"), vec!["Cannot find image named 'hero'"]);
}

#[test]
fn filtered_images_need_their_base() {
    let mut ws = workspace(&[("main.tale", "[[hero~blur~sepia]]\n")], &[]);
    let program = ws.compile("main.tale");
    assert_eq!(messages(&program, "main.tale"), vec!["Cannot find image named 'hero'"]);

    ws.add_file(talec::FileInfo::new("hero.png"));
    let program = ws.compile("main.tale");
    assert!(messages(&program, "main.tale").is_empty());
    assert!(program.context.contains("filtered_image", "hero~blur~sepia"));
}

#[test]
fn audio_references() {
    let mut ws = workspace(&[("main.tale", "Music starts. ((theme))\n")], &[]);
    let program = ws.compile("main.tale");
    assert_eq!(messages(&program, "main.tale"), vec!["Cannot find audio named 'theme'"]);

    ws.add_file(talec::FileInfo::new("audio/theme.ogg"));
    let program = ws.compile("main.tale");
    assert!(messages(&program, "main.tale").is_empty());
}

#[test]
fn fonts_are_found_by_inferred_family() {
    let text = "define character.ann:\n  font = font[family=\"Roboto\"]\n";
    let mut ws = workspace(&[("main.tale", text)], &[]);
    let program = ws.compile("main.tale");
    assert_eq!(codes(&program, "main.tale"), vec![ErrorCode::E2001]);

    ws.add_file(talec::FileInfo::new("fonts/Roboto-Bold.ttf"));
    let program = ws.compile("main.tale");
    assert!(codes(&program, "main.tale").is_empty());
    let roboto = program.context.get("font", "Roboto-Bold").cloned().unwrap_or_default();
    assert_eq!(roboto["family"], json!("Roboto"));
    assert_eq!(roboto["weight"], json!(700));
}

#[test]
fn files_are_listed_on_the_program() {
    let mut ws = workspace(&[("main.tale", "Hi\n")], &["a.png", "b.ogg", "notes.md"]);
    let program = ws.compile("main.tale");
    let uris: Vec<&str> = program.files.iter().map(|f| f.uri.as_str()).collect();
    assert_eq!(uris, vec!["a.png", "b.ogg", "notes.md"]);
    assert!(!program.context.contains("image", "notes"));
}
