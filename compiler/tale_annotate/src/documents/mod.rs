//! Open documents with their incrementally maintained trees and annotations.

use rustc_hash::FxHashMap;
use tale_ir::{ChangeMarker, Span, TextChange};
use tale_syntax::{ContentChange, SyntaxTree, TextDocument, TreeFragment};
use tracing::{debug, trace, warn};

use crate::{AnnotateCx, Annotations, AnnotatorSet};

/// Everything kept for one open document.
#[derive(Debug)]
pub struct DocumentState {
    pub document: TextDocument,
    pub tree: SyntaxTree,
    fragments: Vec<TreeFragment>,
    pub annotations: Annotations,
}

impl DocumentState {
    fn open(document: TextDocument, active: AnnotatorSet) -> Self {
        let tree = SyntaxTree::parse(document.text());
        let fragments = TreeFragment::from_tree(&tree);
        let mut annotations = Annotations::new(active);
        annotations.create(&AnnotateCx::full(document.text(), &tree));
        DocumentState {
            document,
            tree,
            fragments,
            annotations,
        }
    }

    /// Apply one change and bring tree and annotations up to date.
    fn apply(&mut self, change: &ContentChange) {
        let old_len = self.document.len();
        let text_change = self.document.apply(change);
        let fragments = TreeFragment::apply_change(&self.fragments, &text_change);
        let parse = SyntaxTree::parse_with(self.document.text(), &fragments);
        trace!(
            reused = parse.reused_count(),
            units = parse.reused.len(),
            "reparsed"
        );

        let old_unit = self.tree.unit_at(text_change.start).map(|unit| unit.from());
        let region = safety_region(&text_change, &parse, old_unit, old_len);
        let tree = parse.tree;
        self.fragments = TreeFragment::from_tree(&tree);

        let marker = ChangeMarker::from_change(&text_change);
        let cx = AnnotateCx {
            text: self.document.text(),
            tree: &tree,
            marker: Some(&marker),
        };
        self.annotations.update(&cx, region);
        self.tree = tree;
    }
}

/// The region to re-annotate after `change`, snapped back to a unit
/// boundary of the new tree and extended to the end of the document.
fn safety_region(
    change: &TextChange,
    parse: &tale_syntax::Parse,
    old_unit: Option<u32>,
    old_len: u32,
) -> Span {
    let new_len = parse.tree.len();
    let start = [Some(change.start), parse.first_reparsed(), old_unit]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(0);
    let start = parse
        .tree
        .unit_at(start.min(new_len))
        .map_or(0, |unit| unit.from());
    let end = change
        .new_end()
        .max(new_len)
        .max(old_len)
        .min(new_len);
    Span::new(start.min(end), end)
}

/// The document store: open documents keyed by uri.
#[derive(Debug, Default)]
pub struct DocumentManager {
    active: AnnotatorSet,
    documents: FxHashMap<String, DocumentState>,
}

impl DocumentManager {
    pub fn new(active: AnnotatorSet) -> Self {
        DocumentManager {
            active,
            documents: FxHashMap::default(),
        }
    }

    /// Open (or reopen) `uri` with a full parse and annotation pass.
    #[tracing::instrument(level = "debug", skip(self, text))]
    pub fn open(&mut self, uri: &str, version: i32, text: &str) {
        let document = TextDocument::new(uri, version, text);
        self.documents
            .insert(uri.to_string(), DocumentState::open(document, self.active));
    }

    /// Apply `changes` in order. Returns `false` for an unknown document or
    /// a version that is not newer than the stored one.
    #[tracing::instrument(level = "debug", skip(self, changes), fields(changes = changes.len()))]
    pub fn update(&mut self, uri: &str, version: i32, changes: &[ContentChange]) -> bool {
        let Some(state) = self.documents.get_mut(uri) else {
            warn!("update for a document that is not open");
            return false;
        };
        if version <= state.document.version() {
            debug!(current = state.document.version(), "stale update ignored");
            return false;
        }
        for change in changes {
            state.apply(change);
        }
        state.document.set_version(version);
        true
    }

    pub fn close(&mut self, uri: &str) -> bool {
        self.documents.remove(uri).is_some()
    }

    pub fn get(&self, uri: &str) -> Option<&DocumentState> {
        self.documents.get(uri)
    }

    pub fn document(&self, uri: &str) -> Option<&TextDocument> {
        self.get(uri).map(|state| &state.document)
    }

    pub fn tree(&self, uri: &str) -> Option<&SyntaxTree> {
        self.get(uri).map(|state| &state.tree)
    }

    pub fn annotations(&self, uri: &str) -> Option<&Annotations> {
        self.get(uri).map(|state| &state.annotations)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Uris of all open documents, unordered.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn active(&self) -> AnnotatorSet {
        self.active
    }
}

#[cfg(test)]
mod tests;
