//! Tale IR - shared vocabulary of the Tale toolchain.
//!
//! Everything that crosses a crate boundary lives here: byte spans and
//! line/character positions, the edit primitives used by incremental
//! reparsing, the narrative AST produced by block lowering, selectors and
//! declaration kinds.

pub mod ast;
mod declaration;
pub mod incremental;
mod position;
mod selector;
mod span;

pub use ast::{
    BinaryOp, Choice, Divert, Expr, FlowHeader, FlowKind, Gather, ListDecl, ListItem, Logic, Node,
    Statement, TextLine, TextPart, UnaryOp, Variable,
};
pub use declaration::DeclarationKind;
pub use incremental::{ChangeMarker, TextChange};
pub use position::{Position, Range, SourceLocation};
pub use selector::Selector;
pub use span::{Span, SpanError};

/// A struct or property value in the context graph.
pub type StructValue = serde_json::Value;
