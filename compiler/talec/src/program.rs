//! The result of compiling a root script.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tale_context::ContextGraph;
use tale_diagnostic::Diagnostic;
use tale_ir::SourceLocation;

use crate::files::FileInfo;

/// Runtime path to the source range it came from, in
/// `(script_index, line, column)` order.
pub type LocationMap = IndexMap<String, SourceLocation>;

/// A compiled story plus everything a host needs to map it back to source.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub uri: String,
    /// Every script that contributed, root first, with the version used.
    /// A location's `script_index` indexes this map.
    pub scripts: IndexMap<String, i32>,
    pub files: Vec<FileInfo>,
    pub context: ContextGraph,
    /// The runtime story.
    pub compiled: Value,
    pub diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    pub path_locations: LocationMap,
    /// Locations of functions, knots, stitches, labels, scenes and branches.
    pub declaration_locations: LocationMap,
    /// Version of the root script.
    pub version: i32,
}

impl Program {
    pub fn script_index(&self, uri: &str) -> Option<usize> {
        self.scripts.get_index_of(uri)
    }

    pub fn script_uri(&self, index: u32) -> Option<&str> {
        self.scripts
            .get_index(index as usize)
            .map(|(uri, _)| uri.as_str())
    }

    pub fn diagnostics_for(&self, uri: &str) -> &[Diagnostic] {
        self.diagnostics.get(uri).map_or(&[], Vec::as_slice)
    }

    pub fn all_diagnostics(&self) -> impl Iterator<Item = (&str, &Diagnostic)> {
        self.diagnostics
            .iter()
            .flat_map(|(uri, list)| list.iter().map(move |d| (uri.as_str(), d)))
    }

    pub fn has_errors(&self) -> bool {
        self.all_diagnostics().any(|(_, d)| d.is_error())
    }

    /// Source location of a runtime path.
    pub fn locate(&self, path: &str) -> Option<(&str, SourceLocation)> {
        let location = self.path_locations.get(path)?;
        Some((self.script_uri(location.script_index)?, *location))
    }
}
