//! Shared test utilities for phase tests.

use serde_json::Value;
use tale_diagnostic::{Diagnostic, ErrorCode};
use tale_ir::{Position, Range};
use tale_syntax::ContentChange;
use talec::{FileInfo, Program, Workspace};

/// A workspace with `documents` open at version 1 and `files` registered.
pub fn workspace(documents: &[(&str, &str)], files: &[&str]) -> Workspace {
    talec::init_tracing();
    let mut workspace = Workspace::new();
    for (uri, text) in documents {
        assert!(workspace.add_document(uri, 1, text), "{uri} opened twice");
    }
    for uri in files {
        assert!(workspace.add_file(FileInfo::new(*uri)), "{uri} registered twice");
    }
    workspace
}

/// Replace `from..to` (line, character) with `text`.
pub fn replace(from: (u32, u32), to: (u32, u32), text: &str) -> ContentChange {
    ContentChange::replace(
        Range::new(Position::new(from.0, from.1), Position::new(to.0, to.1)),
        text,
    )
}

/// Insert `text` at `at`.
pub fn insert(at: (u32, u32), text: &str) -> ContentChange {
    replace(at, at, text)
}

pub fn messages<'p>(program: &'p Program, uri: &str) -> Vec<&'p str> {
    program
        .diagnostics_for(uri)
        .iter()
        .map(|d| d.message.as_str())
        .collect()
}

pub fn codes(program: &Program, uri: &str) -> Vec<ErrorCode> {
    program.diagnostics_for(uri).iter().map(|d| d.code).collect()
}

pub fn warnings(program: &Program) -> Vec<&Diagnostic> {
    program
        .all_diagnostics()
        .map(|(_, d)| d)
        .filter(|d| d.is_warning())
        .collect()
}

/// The runtime story without block ids, which differ between workspaces
/// that parsed the same text separately.
pub fn without_ids(story: &Value) -> Value {
    match story {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(key, _)| key.as_str() != "id")
                .map(|(key, value)| (key.clone(), without_ids(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_ids).collect()),
        other => other.clone(),
    }
}

/// Assert two programs agree on everything except block ids and versions.
pub fn assert_same_output(left: &Program, right: &Program) {
    pretty_assertions::assert_eq!(without_ids(&left.compiled), without_ids(&right.compiled));
    pretty_assertions::assert_eq!(left.path_locations, right.path_locations);
    pretty_assertions::assert_eq!(left.declaration_locations, right.declaration_locations);
    pretty_assertions::assert_eq!(left.diagnostics, right.diagnostics);
    pretty_assertions::assert_eq!(left.context, right.context);
}
