//! Positioned views over green nodes and a depth-first tree cursor.

use std::sync::Arc;

use tale_ir::Span;

use crate::{GreenNode, SyntaxKind};

/// A green node together with its absolute start offset.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SyntaxNode<'a> {
    green: &'a GreenNode,
    offset: u32,
}

impl<'a> SyntaxNode<'a> {
    pub fn new(green: &'a GreenNode, offset: u32) -> Self {
        SyntaxNode { green, offset }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    #[inline]
    pub fn green(&self) -> &'a GreenNode {
        self.green
    }

    #[inline]
    pub fn from(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn to(&self) -> u32 {
        self.offset + self.green.len()
    }

    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.from(), self.to())
    }

    #[inline]
    pub fn is_token(&self) -> bool {
        self.green.children().is_empty()
    }

    /// The covered slice of `source`; empty if the node lies outside it.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span().to_range()).unwrap_or("")
    }

    /// Child nodes with their absolute offsets.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        let mut offset = self.offset;
        self.green.children().iter().map(move |child: &'a Arc<GreenNode>| {
            let node = SyntaxNode::new(child, offset);
            offset += child.len();
            node
        })
    }

    /// First direct child of `kind`.
    pub fn child(&self, kind: SyntaxKind) -> Option<SyntaxNode<'a>> {
        self.children().find(|child| child.kind() == kind)
    }

    /// Every node in this subtree in pre-order, including `self`.
    pub fn descendants(&self) -> Vec<SyntaxNode<'a>> {
        let mut out = Vec::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.span())
    }
}

/// Cursor over a subtree with explicit parent tracking.
///
/// Each stack frame holds the node and its index in the parent, so moving to
/// a sibling never needs to re-walk from the root.
#[derive(Clone, Debug)]
pub struct TreeCursor<'a> {
    stack: Vec<(SyntaxNode<'a>, usize)>,
}

impl<'a> TreeCursor<'a> {
    pub fn new(root: SyntaxNode<'a>) -> Self {
        TreeCursor {
            stack: vec![(root, 0)],
        }
    }

    #[inline]
    pub fn node(&self) -> SyntaxNode<'a> {
        // The root frame is never popped.
        self.stack[self.stack.len() - 1].0
    }

    /// Depth below the cursor's root (root is 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn goto_first_child(&mut self) -> bool {
        let node = self.node();
        match node.green().children().first() {
            Some(first) => {
                self.stack.push((SyntaxNode::new(first, node.from()), 0));
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let len = self.stack.len();
        if len < 2 {
            return false;
        }
        let parent = self.stack[len - 2].0;
        let (current, index) = self.stack[len - 1];
        let next = index + 1;
        match parent.green().children().get(next) {
            Some(sibling) => {
                self.stack[len - 1] = (SyntaxNode::new(sibling, current.to()), next);
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Pre-order walk of the subtree under the current node, calling
    /// `enter` on the way down and `leave` on the way up. The cursor ends
    /// where it started.
    pub fn walk(
        &mut self,
        mut enter: impl FnMut(SyntaxNode<'a>),
        mut leave: impl FnMut(SyntaxNode<'a>),
    ) {
        let base = self.depth();
        loop {
            enter(self.node());
            if self.goto_first_child() {
                continue;
            }
            loop {
                leave(self.node());
                if self.depth() == base {
                    return;
                }
                if self.goto_next_sibling() {
                    break;
                }
                self.goto_parent();
            }
        }
    }
}
