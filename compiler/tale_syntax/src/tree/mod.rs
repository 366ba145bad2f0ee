//! Syntax tree snapshots and fragment-reusing parses.

use std::sync::Arc;

use tracing::trace;

use crate::tokenizer::{scan_units, tokenize_unit};
use crate::{GreenNode, SyntaxKind, SyntaxNode, TreeFragment};

/// Immutable syntax tree of one document version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxTree {
    root: Arc<GreenNode>,
}

/// Result of a parse: the tree plus which units were carried over.
#[derive(Clone, Debug)]
pub struct Parse {
    pub tree: SyntaxTree,
    /// One flag per unit, `true` when the unit's green node came from a
    /// fragment of the previous tree.
    pub reused: Vec<bool>,
}

impl Parse {
    /// Start of the first unit that had to be tokenized afresh.
    pub fn first_reparsed(&self) -> Option<u32> {
        self.tree
            .units()
            .zip(&self.reused)
            .find(|(_, reused)| !**reused)
            .map(|(unit, _)| unit.from())
    }

    pub fn reused_count(&self) -> usize {
        self.reused.iter().filter(|r| **r).count()
    }
}

impl SyntaxTree {
    /// Full parse without reuse.
    pub fn parse(text: &str) -> SyntaxTree {
        SyntaxTree::parse_with(text, &[]).tree
    }

    /// Parse `text`, reusing fragments whose span and kind match a freshly
    /// scanned unit exactly. `fragments` must be sorted by start.
    pub fn parse_with(text: &str, fragments: &[TreeFragment]) -> Parse {
        let units = scan_units(text);
        let mut children = Vec::with_capacity(units.len());
        let mut reused = Vec::with_capacity(units.len());
        for unit in units {
            let found = fragments
                .binary_search_by_key(&unit.span.start, |f| f.start)
                .ok()
                .and_then(|i| fragments.get(i))
                .filter(|f| f.node.kind() == unit.kind && f.span() == unit.span);
            match found {
                Some(fragment) => {
                    children.push(Arc::clone(&fragment.node));
                    reused.push(true);
                }
                None => {
                    let slice = text.get(unit.span.to_range()).unwrap_or("");
                    children.push(tokenize_unit(slice, unit.kind));
                    reused.push(false);
                }
            }
        }
        trace!(
            units = reused.len(),
            reused = reused.iter().filter(|r| **r).count(),
            "parsed document"
        );
        Parse {
            tree: SyntaxTree {
                root: GreenNode::node(SyntaxKind::Document, children),
            },
            reused,
        }
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(&self.root, 0)
    }

    pub fn green(&self) -> &Arc<GreenNode> {
        &self.root
    }

    pub fn len(&self) -> u32 {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Top-level units in source order.
    pub fn units(&self) -> impl Iterator<Item = SyntaxNode<'_>> {
        self.root().children()
    }

    /// The unit containing `offset`; an offset at the very end belongs to
    /// the last unit.
    pub fn unit_at(&self, offset: u32) -> Option<SyntaxNode<'_>> {
        let mut last = None;
        for unit in self.units() {
            if unit.span().contains(offset) {
                return Some(unit);
            }
            last = Some(unit);
        }
        last.filter(|unit| unit.to() == offset)
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        SyntaxTree::parse("")
    }
}
