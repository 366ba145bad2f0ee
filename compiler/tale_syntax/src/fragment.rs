//! Reusable top-level units of a previous parse.

use std::sync::Arc;

use tale_ir::{ChangeMarker, Span, TextChange};

use crate::{GreenNode, SyntaxTree};

/// A unit's green node with its start offset in the current text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeFragment {
    pub start: u32,
    pub node: Arc<GreenNode>,
}

impl TreeFragment {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.start + self.node.len())
    }

    /// One fragment per unit of `tree`.
    pub fn from_tree(tree: &SyntaxTree) -> Vec<TreeFragment> {
        let mut start = 0;
        tree.green()
            .children()
            .iter()
            .map(|node| {
                let fragment = TreeFragment {
                    start,
                    node: Arc::clone(node),
                };
                start += node.len();
                fragment
            })
            .collect()
    }

    /// Carry fragments across `change`: those touching the replaced range
    /// are dropped, those after it are shifted by the length delta.
    pub fn apply_change(fragments: &[TreeFragment], change: &TextChange) -> Vec<TreeFragment> {
        let marker = ChangeMarker::from_change(change);
        fragments
            .iter()
            .filter_map(|fragment| {
                marker.adjust_span(fragment.span()).map(|span| TreeFragment {
                    start: span.start,
                    node: Arc::clone(&fragment.node),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn starts(fragments: &[TreeFragment]) -> Vec<u32> {
        fragments.iter().map(|f| f.start).collect()
    }

    #[test]
    fn test_from_tree_offsets() {
        let tree = SyntaxTree::parse("a\nbb\nccc\n");
        assert_eq!(starts(&TreeFragment::from_tree(&tree)), vec![0, 2, 5]);
    }

    #[test]
    fn test_change_drops_touched_and_shifts_later() {
        let tree = SyntaxTree::parse("a\nbb\nccc\n");
        let fragments = TreeFragment::from_tree(&tree);
        // "bb" -> "bbbb"
        let moved = TreeFragment::apply_change(&fragments, &TextChange::new(3, 4, 3));
        assert_eq!(starts(&moved), vec![0, 7]);
    }

    #[test]
    fn test_insert_at_unit_boundary_keeps_both_sides() {
        let tree = SyntaxTree::parse("a\nbb\n");
        let fragments = TreeFragment::from_tree(&tree);
        let moved = TreeFragment::apply_change(&fragments, &TextChange::insert(2, 4));
        assert_eq!(starts(&moved), vec![0, 6]);
    }

    #[test]
    fn test_reparse_reuses_shifted_fragments() {
        let old = "== intro ==\nHello\n-> END\n";
        let tree = SyntaxTree::parse(old);
        let fragments = TreeFragment::from_tree(&tree);
        let change = TextChange::new(12, 17, 9);
        let new_text = "== intro ==\nHello all\n-> END\n";
        let moved = TreeFragment::apply_change(&fragments, &change);
        let parse = SyntaxTree::parse_with(new_text, &moved);
        assert_eq!(parse.reused, vec![true, false, true]);
        assert_eq!(parse.first_reparsed(), Some(12));
        assert_eq!(parse.tree, SyntaxTree::parse(new_text));
    }
}
