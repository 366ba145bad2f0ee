//! Per-document diagnostic collection.
//!
//! The compiler forwards diagnostics from every script it visits into one
//! sink keyed by uri. The sink drops suppressed and exact-duplicate
//! diagnostics and produces a deterministic ordering for output.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::Diagnostic;

#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    by_uri: BTreeMap<String, Vec<Diagnostic>>,
    seen: FxHashSet<(String, Diagnostic)>,
    suppressed: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `uri` appears in the output, even with no diagnostics.
    pub fn touch(&mut self, uri: &str) {
        if !self.by_uri.contains_key(uri) {
            self.by_uri.insert(uri.to_string(), Vec::new());
        }
    }

    /// Add a diagnostic for `uri`.
    ///
    /// Returns `false` if it was filtered (suppressed or duplicate).
    pub fn push(&mut self, uri: &str, diagnostic: Diagnostic) -> bool {
        self.touch(uri);
        if diagnostic.suppressed {
            self.suppressed += 1;
            return false;
        }
        if !self.seen.insert((uri.to_string(), diagnostic.clone())) {
            return false;
        }
        if let Some(list) = self.by_uri.get_mut(uri) {
            list.push(diagnostic);
        }
        true
    }

    pub fn extend(&mut self, uri: &str, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(uri, diagnostic);
        }
    }

    /// Number of diagnostics dropped because they were suppressed.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    pub fn error_count(&self) -> usize {
        self.by_uri
            .values()
            .flatten()
            .filter(|diag| diag.is_error())
            .count()
    }

    pub fn get(&self, uri: &str) -> &[Diagnostic] {
        self.by_uri.get(uri).map_or(&[], Vec::as_slice)
    }

    /// All diagnostics, each uri's list sorted by position then message.
    pub fn finish(self) -> BTreeMap<String, Vec<Diagnostic>> {
        let mut by_uri = self.by_uri;
        for list in by_uri.values_mut() {
            list.sort_by(|a, b| {
                a.range
                    .cmp(&b.range)
                    .then_with(|| a.severity.cmp(&b.severity))
                    .then_with(|| a.message.cmp(&b.message))
            });
        }
        by_uri
    }
}

#[cfg(test)]
mod tests;
