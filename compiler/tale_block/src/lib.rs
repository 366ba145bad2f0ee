//! Tale block lowering.
//!
//! Each top-level unit of a Tale document is lowered on its own:
//!
//! - [`lower`] turns a unit into diagnostics, narrative [`tale_ir::Node`]s,
//!   an include target or `define` structs, all positioned relative to the
//!   unit's first line
//! - [`parse_expression`] / [`parse_statement`] parse the expression
//!   language used in conditions, inline expressions and `~` logic
//! - [`evaluate`] evaluates an expression against an [`EvalContext`]

mod eval;
mod lexer;
mod lower;
mod parser;
mod stack;
mod transpile;

pub use eval::{eval_expr, evaluate, EmptyContext, EvalContext, EvalError, Value};
pub use lower::{
    lower, parse_property_value, reference_of, BlockOutput, PropertyDef, PropertyValue,
    StructDefinition, DEFAULT_NAME, REFERENCE_KEY,
};
pub use parser::{parse_expression, parse_statement, ParseError};
pub use transpile::{transpile_compound, Transpiled};
