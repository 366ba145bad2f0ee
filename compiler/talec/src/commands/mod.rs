//! Command handlers for the `tale` CLI.
//!
//! Shared loading lives here: a script is compiled together with the other
//! scripts and the asset files found next to it and in any `--include-dir`.

use std::path::Path;

use crate::files::{asset_type, FileInfo};
use crate::workspace::Workspace;

mod check;
mod compile;
mod eval;
mod explain;

pub use check::check_file;
pub use compile::compile_file;
pub use eval::eval_expression;
pub use explain::explain_error;

/// Extensions of files loaded as scripts.
const SCRIPT_EXTENSIONS: [&str; 3] = ["tale", "ink", "txt"];

/// Read a file from disk, exiting with a user-friendly error message on failure.
pub(super) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Forward-slash form of a path, used as its uri.
fn uri_of(path: &Path) -> String {
    let uri = path.to_string_lossy().replace('\\', "/");
    match uri.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => uri,
    }
}

/// Open `path` as the root document, then every script and asset in its
/// directory and in `include_dirs`. Returns the workspace and the root uri.
pub(super) fn load_project(path: &str, include_dirs: &[String]) -> (Workspace, String) {
    let text = read_file(path);
    let root = uri_of(Path::new(path));
    let mut workspace = Workspace::new();
    workspace.add_document(&root, 0, &text);

    let parent = Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let dirs = std::iter::once(parent).chain(include_dirs.iter().map(Path::new));
    for dir in dirs {
        load_dir(&mut workspace, dir);
    }
    tracing::debug!(
        root = %root,
        documents = workspace.documents().uris().count(),
        files = workspace.files().len(),
        "project loaded"
    );
    (workspace, root)
}

fn load_dir(workspace: &mut Workspace, dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("warning: cannot read directory '{}': {e}", dir.display());
            return;
        }
    };
    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    for path in paths {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let uri = uri_of(&path);
        if SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
            if workspace.documents().contains(&uri) {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    workspace.add_document(&uri, 0, &text);
                }
                Err(e) => tracing::warn!(uri = %uri, error = %e, "script skipped"),
            }
        } else if asset_type(&ext).is_some() {
            workspace.add_file(FileInfo::new(uri));
        }
    }
}

/// Split trailing `--include-dir <dir>` options off a command's arguments.
pub fn parse_include_dirs(args: &[String]) -> (Vec<String>, Vec<String>) {
    let mut positional = Vec::new();
    let mut include_dirs = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if let Some(dir) = args[i].strip_prefix("--include-dir=") {
            include_dirs.push(dir.to_string());
            i += 1;
        } else if args[i] == "--include-dir" && i + 1 < args.len() {
            include_dirs.push(args[i + 1].clone());
            i += 2;
        } else {
            positional.push(args[i].clone());
            i += 1;
        }
    }
    (positional, include_dirs)
}
