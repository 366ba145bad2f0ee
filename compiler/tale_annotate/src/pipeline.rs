//! Per-document annotation state: one range set per active annotator.

use std::sync::Arc;

use tale_diagnostic::Diagnostic;
use tale_ir::Span;
use tale_syntax::TextDocument;
use tracing::debug;

use crate::annotator::{drive, Pass, Slot};
use crate::annotators::{
    Compilation, CompiledBlock, Declaration, Declarations, FormatMarker, Formatting,
    ImplicitMarker, Implicits, Reference, References,
};
use crate::{AnnotateCx, AnnotatorSet, RangeSet};

/// All annotation sets of one document.
#[derive(Debug)]
pub struct Annotations {
    active: AnnotatorSet,
    declarations: Slot<Declarations>,
    references: Slot<References>,
    implicits: Slot<Implicits>,
    compilation: Slot<Compilation>,
    formatting: Slot<Formatting>,
}

impl Annotations {
    pub fn new(active: AnnotatorSet) -> Self {
        Annotations {
            active,
            declarations: Slot::new(Declarations::default()),
            references: Slot::new(References::default()),
            implicits: Slot::new(Implicits),
            compilation: Slot::new(Compilation::default()),
            formatting: Slot::new(Formatting),
        }
    }

    pub fn active(&self) -> AnnotatorSet {
        self.active
    }

    /// Annotate the whole document.
    pub fn create(&mut self, cx: &AnnotateCx<'_>) {
        let range = Span::new(0, cx.tree.len());
        debug!(len = range.end, "full annotation pass");
        self.run(cx, range);
    }

    /// Re-annotate `region`, which must start on a unit boundary and reach
    /// the end of the document.
    pub fn update(&mut self, cx: &AnnotateCx<'_>, region: Span) {
        debug!(from = region.start, to = region.end, "incremental annotation pass");
        self.run(cx, region);
    }

    fn run(&mut self, cx: &AnnotateCx<'_>, range: Span) {
        let active = self.active;
        let mut passes: Vec<&mut dyn Pass> = Vec::with_capacity(5);
        if active.contains(AnnotatorSet::DECLARATIONS) {
            passes.push(&mut self.declarations);
        }
        if active.contains(AnnotatorSet::REFERENCES) {
            passes.push(&mut self.references);
        }
        if active.contains(AnnotatorSet::IMPLICITS) {
            passes.push(&mut self.implicits);
        }
        if active.contains(AnnotatorSet::COMPILATION) {
            passes.push(&mut self.compilation);
        }
        if active.contains(AnnotatorSet::FORMATTING) {
            passes.push(&mut self.formatting);
        }
        drive(cx, range, &mut passes);
    }

    pub fn declarations(&self) -> &RangeSet<Declaration> {
        &self.declarations.set
    }

    pub fn references(&self) -> &RangeSet<Reference> {
        &self.references.set
    }

    pub fn implicits(&self) -> &RangeSet<ImplicitMarker> {
        &self.implicits.set
    }

    pub fn compilation(&self) -> &RangeSet<Arc<CompiledBlock>> {
        &self.compilation.set
    }

    pub fn formatting(&self) -> &RangeSet<FormatMarker> {
        &self.formatting.set
    }

    /// Block diagnostics in document coordinates. Suppressed ones are
    /// logged and dropped.
    pub fn diagnostics(&self, document: &TextDocument) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for block in &self.compilation.set {
            let line = document.lines().line_of(block.from);
            for diagnostic in &block.value.output.diagnostics {
                if diagnostic.suppressed {
                    debug!(%diagnostic, line, "suppressed diagnostic");
                    continue;
                }
                diagnostics.push(diagnostic.clone().offset_lines(line));
            }
        }
        diagnostics
    }
}

impl Default for Annotations {
    fn default() -> Self {
        Annotations::new(AnnotatorSet::default())
    }
}
