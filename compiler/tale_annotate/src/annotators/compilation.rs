use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use tale_block::{lower, BlockOutput};
use tale_diagnostic::{Diagnostic, ErrorCode};
use tale_ir::{Range, Span};
use tale_syntax::{SyntaxKind, SyntaxNode};
use tracing::{error, trace};
use uuid::Uuid;

use crate::{AnnotateCx, Annotation, Annotator};

/// Lowered output of one top-level unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompiledBlock {
    /// Stable while the block's own output is unchanged, so hosts can key
    /// caches on it.
    pub uuid: Uuid,
    #[serde(flatten)]
    pub output: BlockOutput,
}

impl CompiledBlock {
    pub fn new(output: BlockOutput) -> Self {
        CompiledBlock {
            uuid: Uuid::new_v4(),
            output,
        }
    }
}

/// Lowers every non-trivia unit through [`tale_block::lower`].
#[derive(Debug, Default)]
pub struct Compilation {
    /// Copy of the blocks currently in the range set, by old position.
    blocks: Vec<Annotation<Arc<CompiledBlock>>>,
    /// Blocks about to be replaced, keyed by their position in the new text.
    previous: FxHashMap<u32, Arc<CompiledBlock>>,
    /// Blocks that started inside the edited region and have no position in
    /// the new text. They are matched by output instead.
    displaced: Vec<Arc<CompiledBlock>>,
}

impl Annotator for Compilation {
    type Value = Arc<CompiledBlock>;

    fn begin(&mut self, cx: &AnnotateCx<'_>, range: Span) {
        self.previous.clear();
        self.displaced.clear();
        for block in self.blocks.iter().filter(|b| b.from >= range.start) {
            let from = match cx.marker {
                None => block.from,
                Some(marker) => {
                    if marker.affected_start < block.from && block.from < marker.affected_end {
                        self.displaced.push(Arc::clone(&block.value));
                        continue;
                    }
                    marker.adjust_position(block.from)
                }
            };
            self.previous.insert(from, Arc::clone(&block.value));
        }
    }

    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) -> Vec<Annotation<Self::Value>> {
        if !is_compiled_unit(node.kind()) {
            return Vec::new();
        }
        let output = lower_isolated(cx, node);
        let block = match self.reuse(node.from(), &output) {
            Some(previous) => {
                trace!(from = node.from(), uuid = %previous.uuid, "block unchanged");
                previous
            }
            None => Arc::new(CompiledBlock::new(output)),
        };
        vec![Annotation::new(node.span(), block)]
    }

    fn end(
        &mut self,
        _cx: &AnnotateCx<'_>,
        range: Span,
        added: &[Annotation<Self::Value>],
        _removed: &[Annotation<Self::Value>],
    ) {
        self.blocks.retain(|b| b.from < range.start);
        self.blocks.extend(added.iter().cloned());
        self.previous.clear();
        self.displaced.clear();
    }
}

impl Compilation {
    /// Take the old block for a unit at `from` lowering to `output`: the one
    /// now at the same position, else the first displaced one with equal
    /// output. Each old block is handed out at most once.
    fn reuse(&mut self, from: u32, output: &BlockOutput) -> Option<Arc<CompiledBlock>> {
        if self.previous.get(&from).is_some_and(|b| b.output == *output) {
            return self.previous.remove(&from);
        }
        let index = self.displaced.iter().position(|b| b.output == *output)?;
        Some(self.displaced.remove(index))
    }
}

/// Lower one unit; a panic in the lowering code costs only this block.
fn lower_isolated(cx: &AnnotateCx<'_>, unit: SyntaxNode<'_>) -> BlockOutput {
    let lowered = catch_unwind(AssertUnwindSafe(|| lower(unit, cx.text)));
    lowered.unwrap_or_else(|_| {
        error!(
            kind = ?unit.kind(),
            from = unit.from(),
            "lowering panicked; block contributes nothing"
        );
        let first_line = cx.slice(unit).lines().next().unwrap_or_default();
        let end = first_line.trim_end().chars().count();
        let diagnostic = Diagnostic::error(ErrorCode::E9001)
            .with_message("Internal error while compiling this line")
            .with_range(Range::on_line(0, 0, u32::try_from(end).unwrap_or(u32::MAX)));
        BlockOutput {
            diagnostics: vec![diagnostic],
            ..BlockOutput::default()
        }
    })
}

/// Whether `unit` is lowered at all.
pub fn is_compiled_unit(kind: SyntaxKind) -> bool {
    kind.is_unit() && !kind.is_trivia_unit()
}
