//! Immutable, position-independent tree storage.
//!
//! A green node knows its kind, its byte length and its children, but not
//! where it sits in the document. That makes whole subtrees shareable
//! between parses: a unit that only moved is reused by cloning its `Arc`.

use std::sync::Arc;

use crate::SyntaxKind;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenNode {
    kind: SyntaxKind,
    len: u32,
    children: Vec<Arc<GreenNode>>,
}

impl GreenNode {
    /// A leaf covering `len` bytes.
    pub fn token(kind: SyntaxKind, len: u32) -> Arc<GreenNode> {
        Arc::new(GreenNode {
            kind,
            len,
            children: Vec::new(),
        })
    }

    /// An interior node; its length is the sum of its children.
    pub fn node(kind: SyntaxKind, children: Vec<Arc<GreenNode>>) -> Arc<GreenNode> {
        let len = children.iter().map(|child| child.len).sum();
        Arc::new(GreenNode {
            kind,
            len,
            children,
        })
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn children(&self) -> &[Arc<GreenNode>] {
        &self.children
    }
}

impl std::fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.children.is_empty() {
            write!(f, "{:?}@{}", self.kind, self.len)
        } else {
            f.debug_struct("GreenNode")
                .field("kind", &self.kind)
                .field("len", &self.len)
                .field("children", &self.children)
                .finish()
        }
    }
}
