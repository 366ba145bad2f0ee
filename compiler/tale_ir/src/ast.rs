//! Narrative AST produced by block lowering.
//!
//! Each top-level unit lowers independently to a short list of [`Node`]s.
//! Ranges inside nodes are block-relative: line 0 is the first line of the
//! unit that produced them, so a block that merely moves keeps an identical
//! lowered form.

use serde::{Deserialize, Serialize};

use crate::Range;

/// Kind of flow a header opens.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Knot,
    Function,
    Scene,
    Stitch,
    Branch,
}

impl FlowKind {
    /// Top-level flows (knot, function, scene) versus sub-flows.
    pub fn is_top_level(self) -> bool {
        matches!(self, FlowKind::Knot | FlowKind::Function | FlowKind::Scene)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::Knot => "knot",
            FlowKind::Function => "function",
            FlowKind::Scene => "scene",
            FlowKind::Stitch => "stitch",
            FlowKind::Branch => "branch",
        }
    }
}

/// A knot, function, scene, stitch or branch header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowHeader {
    pub kind: FlowKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    pub range: Range,
}

/// One piece of a line of narrative text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPart {
    Literal(String),
    Expr(Expr),
    Image(String),
    Audio(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub parts: Vec<TextPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divert: Option<String>,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Nesting depth: `*` is 1, `* *` is 2.
    pub depth: u32,
    pub sticky: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Expr>,
    /// Text shown both in the menu and in the output.
    pub start: String,
    /// Text inside `[...]`, shown only in the menu.
    pub choice_only: String,
    /// Text after `[...]`, shown only in the output.
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divert: Option<String>,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gather {
    pub depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<TextPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divert: Option<String>,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Divert {
    pub target: String,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Assign {
        name: String,
        temp: bool,
        value: Expr,
    },
    Eval(Expr),
    Return(Option<Expr>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Logic {
    pub statement: Statement,
    pub range: Range,
}

/// `VAR` or `CONST` declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub constant: bool,
    pub value: Expr,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub name: String,
    pub value: i64,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListDecl {
    pub name: String,
    pub items: Vec<ListItem>,
    pub range: Range,
}

/// A lowered top-level unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Flow(FlowHeader),
    Text(TextLine),
    Choice(Choice),
    Gather(Gather),
    Divert(Divert),
    Logic(Logic),
    Variable(Variable),
    List(ListDecl),
}

impl Node {
    pub fn range(&self) -> Range {
        match self {
            Node::Flow(n) => n.range,
            Node::Text(n) => n.range,
            Node::Choice(n) => n.range,
            Node::Gather(n) => n.range,
            Node::Divert(n) => n.range,
            Node::Logic(n) => n.range,
            Node::Variable(n) => n.range,
            Node::List(n) => n.range,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    /// List containment: `list ? item`.
    Has,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Has => "?",
        }
    }
}

/// Embedded expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Variable or dotted list item (`colors.red`).
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}
