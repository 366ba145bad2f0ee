//! Stack-based green tree builder.

use std::sync::Arc;

use crate::{GreenNode, SyntaxKind};

/// Builds one unit's green node from left to right.
///
/// Positions are byte offsets into `src`. Tokens always extend from the
/// current position, so the resulting tree covers every byte exactly once.
pub(crate) struct Builder<'s> {
    src: &'s str,
    pos: usize,
    frames: Vec<(SyntaxKind, Vec<Arc<GreenNode>>)>,
}

impl<'s> Builder<'s> {
    pub(crate) fn new(src: &'s str) -> Self {
        Builder {
            src,
            pos: 0,
            frames: vec![(SyntaxKind::Document, Vec::new())],
        }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &'s [u8] {
        self.src.as_bytes()
    }

    /// Source between the current position and `end`.
    #[inline]
    pub(crate) fn rest(&self, end: usize) -> &'s str {
        self.src.get(self.pos..end).unwrap_or("")
    }

    #[inline]
    pub(crate) fn at(&self, byte: u8, end: usize) -> bool {
        self.pos < end && self.bytes().get(self.pos) == Some(&byte)
    }

    /// Emit a token up to `end`; no-op if it would be empty.
    pub(crate) fn token(&mut self, kind: SyntaxKind, end: usize) {
        let end = end.min(self.src.len());
        if end <= self.pos {
            return;
        }
        let len = u32::try_from(end - self.pos).unwrap_or(u32::MAX);
        self.push(GreenNode::token(kind, len));
        self.pos = end;
    }

    /// Emit whitespace (spaces and tabs) up to `end`.
    pub(crate) fn ws(&mut self, end: usize) {
        let stop = skip_ws(self.bytes(), self.pos, end);
        self.token(SyntaxKind::Whitespace, stop);
    }

    pub(crate) fn start(&mut self, kind: SyntaxKind) {
        self.frames.push((kind, Vec::new()));
    }

    pub(crate) fn finish(&mut self) {
        if self.frames.len() < 2 {
            return;
        }
        if let Some((kind, children)) = self.frames.pop() {
            self.push(GreenNode::node(kind, children));
        }
    }

    /// Close any open nodes and wrap everything in a `kind` node.
    pub(crate) fn build(mut self, kind: SyntaxKind) -> Arc<GreenNode> {
        while self.frames.len() > 1 {
            self.finish();
        }
        let children = self.frames.pop().map(|(_, c)| c).unwrap_or_default();
        GreenNode::node(kind, children)
    }

    fn push(&mut self, node: Arc<GreenNode>) {
        if let Some((_, children)) = self.frames.last_mut() {
            children.push(node);
        }
    }
}

/// First index at or after `from` (bounded by `end`) that is not a space or tab.
#[inline]
pub(crate) fn skip_ws(bytes: &[u8], from: usize, end: usize) -> usize {
    let mut i = from;
    while i < end && matches!(bytes.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    i
}

/// End of an identifier starting at `from`.
///
/// Non-ASCII bytes count as identifier characters, so the end is always a
/// char boundary.
#[inline]
pub(crate) fn ident_end(bytes: &[u8], from: usize, end: usize) -> usize {
    let mut i = from;
    while i < end {
        match bytes.get(i) {
            Some(b) if b.is_ascii_alphanumeric() || *b == b'_' || *b >= 0x80 => i += 1,
            _ => break,
        }
    }
    i
}

/// Index of the delimiter closing the one at `open`, honoring nesting;
/// `None` when it is not closed before `end`.
pub(crate) fn matching(bytes: &[u8], open: usize, end: usize, left: u8, right: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    for i in open..end {
        let b = bytes.get(i).copied()?;
        if in_string {
            if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if b == b'"' {
            in_string = true;
        } else if b == left {
            depth += 1;
        } else if b == right {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
