//! Tale syntax: documents, tokenizer and incremental syntax trees.
//!
//! - [`TextDocument`] holds versioned text and applies content changes
//! - [`scan_units`] / [`tokenize_unit`] split text into top-level units and
//!   tokenize them into lossless [`GreenNode`]s
//! - [`SyntaxTree::parse_with`] reparses, reusing [`TreeFragment`]s of the
//!   previous tree wherever a unit's text did not change

mod cursor;
mod document;
mod fragment;
mod green;
mod kind;
mod tokenizer;
mod tree;

pub use cursor::{SyntaxNode, TreeCursor};
pub use document::{ContentChange, TextDocument};
pub use fragment::TreeFragment;
pub use green::GreenNode;
pub use kind::SyntaxKind;
pub use tokenizer::{classify_line, scan_units, tokenize_unit, UnitSpan};
pub use tree::{Parse, SyntaxTree};
