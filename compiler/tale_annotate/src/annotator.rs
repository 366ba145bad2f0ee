//! The annotator protocol and the driver that runs several annotators in
//! one traversal.

use std::cell::RefCell;

use bitflags::bitflags;
use tale_ir::{ChangeMarker, Span};
use tale_syntax::{SyntaxNode, SyntaxTree, TreeCursor};

use crate::{Annotation, RangeSet};

bitflags! {
    /// Which annotators a host keeps up to date.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct AnnotatorSet: u8 {
        const DECLARATIONS = 1 << 0;
        const REFERENCES = 1 << 1;
        const IMPLICITS = 1 << 2;
        const COMPILATION = 1 << 3;
        /// Editor-only whitespace markers.
        const FORMATTING = 1 << 4;

        /// Everything a compile-only host needs.
        const COMPILE = Self::DECLARATIONS.bits()
            | Self::REFERENCES.bits()
            | Self::IMPLICITS.bits()
            | Self::COMPILATION.bits();
        const EDITOR = Self::COMPILE.bits() | Self::FORMATTING.bits();
    }
}

impl Default for AnnotatorSet {
    fn default() -> Self {
        AnnotatorSet::EDITOR
    }
}

/// What annotators see of the document being annotated.
#[derive(Clone, Copy)]
pub struct AnnotateCx<'a> {
    pub text: &'a str,
    pub tree: &'a SyntaxTree,
    /// Maps positions of the previous version into this one during an
    /// incremental pass; `None` on a full pass.
    pub marker: Option<&'a ChangeMarker>,
}

impl<'a> AnnotateCx<'a> {
    pub fn full(text: &'a str, tree: &'a SyntaxTree) -> Self {
        AnnotateCx {
            text,
            tree,
            marker: None,
        }
    }

    #[inline]
    pub fn slice(&self, node: SyntaxNode<'_>) -> &'a str {
        node.text(self.text)
    }
}

/// A visitor that derives annotations from the syntax tree.
///
/// `enter` and `leave` are called for every node in the annotated range in
/// pre-order; top-level units are always visited whole. `begin` is called
/// first with the range about to be re-annotated, which may start in the
/// middle of the document, and `end` last with what changed.
pub trait Annotator {
    type Value: Clone + std::fmt::Debug;

    fn begin(&mut self, _cx: &AnnotateCx<'_>, _range: Span) {}

    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) -> Vec<Annotation<Self::Value>>;

    fn leave(&mut self, _cx: &AnnotateCx<'_>, _node: SyntaxNode<'_>) -> Vec<Annotation<Self::Value>> {
        Vec::new()
    }

    fn end(
        &mut self,
        _cx: &AnnotateCx<'_>,
        _range: Span,
        _added: &[Annotation<Self::Value>],
        _removed: &[Annotation<Self::Value>],
    ) {
    }
}

/// An annotator together with the range set it maintains.
#[derive(Debug)]
pub(crate) struct Slot<A: Annotator> {
    pub(crate) annotator: A,
    pub(crate) set: RangeSet<A::Value>,
    pending: Vec<Annotation<A::Value>>,
}

impl<A: Annotator> Slot<A> {
    pub(crate) fn new(annotator: A) -> Self {
        Slot {
            annotator,
            set: RangeSet::default(),
            pending: Vec::new(),
        }
    }
}

/// Type-erased view of a [`Slot`] for the combining driver.
pub(crate) trait Pass {
    fn begin(&mut self, cx: &AnnotateCx<'_>, range: Span);
    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>);
    fn leave(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>);
    /// Replace the annotations starting in `removal` with what was
    /// collected since `begin`.
    fn end(&mut self, cx: &AnnotateCx<'_>, range: Span, removal: Span);
}

impl<A: Annotator> Pass for Slot<A> {
    fn begin(&mut self, cx: &AnnotateCx<'_>, range: Span) {
        self.pending.clear();
        self.annotator.begin(cx, range);
    }

    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) {
        let found = self.annotator.enter(cx, node);
        self.pending.extend(found);
    }

    fn leave(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) {
        let found = self.annotator.leave(cx, node);
        self.pending.extend(found);
    }

    fn end(&mut self, cx: &AnnotateCx<'_>, range: Span, removal: Span) {
        let mut added = std::mem::take(&mut self.pending);
        added.sort_by_key(|a| a.from);
        let removed = self.set.splice(removal, added);
        let added = self.set.starting_in(removal);
        self.annotator.end(cx, range, added, &removed);
    }
}

/// Run `passes` over every unit intersecting `range` in a single traversal.
///
/// `range` must start on a unit boundary. Annotations starting at or after
/// `range.start` are replaced; the range always reaches the end of the
/// document, so nothing after it needs shifting.
pub(crate) fn drive(cx: &AnnotateCx<'_>, range: Span, passes: &mut [&mut dyn Pass]) {
    for pass in passes.iter_mut() {
        pass.begin(cx, range);
    }
    for unit in cx.tree.units().skip_while(|unit| unit.to() <= range.start) {
        for (entering, node) in walk_events(unit) {
            for pass in passes.iter_mut() {
                if entering {
                    pass.enter(cx, node);
                } else {
                    pass.leave(cx, node);
                }
            }
        }
    }
    let removal = Span::new(range.start, u32::MAX);
    for pass in passes.iter_mut() {
        pass.end(cx, range, removal);
    }
}

/// Enter (`true`) and leave (`false`) events of the subtree at `node`.
fn walk_events(node: SyntaxNode<'_>) -> Vec<(bool, SyntaxNode<'_>)> {
    let events = RefCell::new(Vec::new());
    TreeCursor::new(node).walk(
        |n| events.borrow_mut().push((true, n)),
        |n| events.borrow_mut().push((false, n)),
    );
    events.into_inner()
}
