//! Annotation pipeline and incremental document manager.
//!
//! [`DocumentManager`] keeps one [`SyntaxTree`](tale_syntax::SyntaxTree) and
//! one [`Annotations`] per open document. Each content change reparses with
//! reused fragments, then re-runs the active annotators over a region that
//! starts at the first affected unit. Every annotator maintains its own
//! [`RangeSet`].

mod annotator;
pub mod annotators;
mod documents;
mod pipeline;
mod range_set;
mod scope;

pub use annotator::{AnnotateCx, Annotator, AnnotatorSet};
pub use annotators::{
    Assignment, CompiledBlock, Declaration, FormatKind, FormatMarker, ImplicitMarker, Reference,
    ReferenceKind, FILTERED_IMAGE,
};
pub use documents::{DocumentManager, DocumentState};
pub use pipeline::Annotations;
pub use range_set::{Annotation, RangeSet};
