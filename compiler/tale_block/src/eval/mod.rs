//! Expression evaluation.
//!
//! Used by the host's `evaluate` entry point and by constant folding of
//! `VAR`/`CONST` initializers. Variables come from an [`EvalContext`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tale_ir::{BinaryOp, Expr, UnaryOp};
use thiserror::Error;

use crate::parser::{parse_expression, ParseError};
use crate::stack::ensure_sufficient_stack;

/// A runtime scalar or list value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Selected list items, as `list.item` names.
    List(Vec<String>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Truthiness: zero, empty and `false` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Convert a JSON context value; objects and nulls have no counterpart.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            serde_json::Value::Array(items) => Some(Value::List(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("{}", .0.message)]
    Parse(ParseError),
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("'{op}' cannot be applied to {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("'{op}' cannot be applied to {operand}")]
    InvalidOperand {
        op: &'static str,
        operand: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("'{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Source of variable values during evaluation.
pub trait EvalContext {
    fn variable(&self, name: &str) -> Option<Value>;
}

impl EvalContext for BTreeMap<String, Value> {
    fn variable(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl EvalContext for serde_json::Map<String, serde_json::Value> {
    fn variable(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(Value::from_json)
    }
}

/// A context with no variables.
pub struct EmptyContext;

impl EvalContext for EmptyContext {
    fn variable(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Parse and evaluate `source`.
pub fn evaluate(source: &str, context: &dyn EvalContext) -> Result<Value, EvalError> {
    let expr = parse_expression(source).map_err(EvalError::Parse)?;
    eval_expr(&expr, context)
}

/// Evaluate a parsed expression.
pub fn eval_expr(expr: &Expr, context: &dyn EvalContext) -> Result<Value, EvalError> {
    ensure_sufficient_stack(|| eval_inner(expr, context))
}

fn eval_inner(expr: &Expr, context: &dyn EvalContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Float(f) => Ok(Value::Float(*f)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Var(name) => context
            .variable(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, context)?;
            eval_unary(*op, value)
        }
        Expr::Binary { op, lhs, rhs } => {
            // Short-circuit before evaluating the right side.
            let left = eval_expr(lhs, context)?;
            match op {
                BinaryOp::And if !left.is_truthy() => return Ok(Value::Bool(false)),
                BinaryOp::Or if left.is_truthy() => return Ok(Value::Bool(true)),
                _ => {}
            }
            let right = eval_expr(rhs, context)?;
            eval_binary(*op, left, right)
        }
        Expr::Call { name, args } => {
            let values = args
                .iter()
                .map(|arg| eval_expr(arg, context))
                .collect::<Result<Vec<_>, _>>()?;
            call_builtin(name, values)
        }
    }
}

fn eval_unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, other) => Err(EvalError::InvalidOperand {
            op: "-",
            operand: other.type_name(),
        }),
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let (lhs, rhs) = (left.type_name(), right.type_name());
    let mismatch = || EvalError::TypeMismatch {
        op: op.symbol(),
        lhs,
        rhs,
    };
    match op {
        BinaryOp::And | BinaryOp::Or => Ok(Value::Bool(right.is_truthy())),
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&left, &right))),
        BinaryOp::Has => match (&left, &right) {
            (Value::List(items), Value::List(wanted)) => {
                Ok(Value::Bool(wanted.iter().all(|w| items.contains(w))))
            }
            (Value::List(items), Value::Str(wanted)) => Ok(Value::Bool(items.contains(wanted))),
            (Value::Str(text), Value::Str(part)) => Ok(Value::Bool(text.contains(part.as_str()))),
            _ => Err(mismatch()),
        },
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
                return Err(mismatch());
            };
            Ok(Value::Bool(match op {
                BinaryOp::Lt => a < b,
                BinaryOp::LtEq => a <= b,
                BinaryOp::Gt => a > b,
                _ => a >= b,
            }))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, &left, &right).unwrap_or_else(|| Err(mismatch()))
        }
    }
}

/// `None` on a type mismatch; `Some(Err)` on division by zero.
fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Option<Result<Value, EvalError>> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(int_arithmetic(op, *a, *b)),
        (Value::Str(a), _) if op == BinaryOp::Add => Some(Ok(Value::Str(format!("{a}{right}")))),
        (Value::List(a), Value::List(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub) => {
            let items = if op == BinaryOp::Add {
                let mut items = a.clone();
                items.extend(b.iter().filter(|item| !a.contains(item)).cloned());
                items
            } else {
                a.iter().filter(|item| !b.contains(item)).cloned().collect()
            };
            Some(Ok(Value::List(items)))
        }
        _ => {
            let (a, b) = (left.as_f64()?, right.as_f64()?);
            Some(match op {
                BinaryOp::Add => Ok(Value::Float(a + b)),
                BinaryOp::Sub => Ok(Value::Float(a - b)),
                BinaryOp::Mul => Ok(Value::Float(a * b)),
                BinaryOp::Div if b == 0.0 => Err(EvalError::DivisionByZero),
                BinaryOp::Div => Ok(Value::Float(a / b)),
                _ if b == 0.0 => Err(EvalError::DivisionByZero),
                _ => Ok(Value::Float(a % b)),
            })
        }
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => Ok(Value::Int(a.wrapping_add(b))),
        BinaryOp::Sub => Ok(Value::Int(a.wrapping_sub(b))),
        BinaryOp::Mul => Ok(Value::Int(a.wrapping_mul(b))),
        _ if b == 0 => Err(EvalError::DivisionByZero),
        BinaryOp::Div => Ok(Value::Int(a.wrapping_div(b))),
        _ => Ok(Value::Int(a.wrapping_rem(b))),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => left == right,
    }
}

fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(EvalError::Arity {
                name: name.to_string(),
                expected,
                found: args.len(),
            })
        }
    };
    let number = |value: &Value| {
        value.as_f64().ok_or(EvalError::InvalidOperand {
            op: "number",
            operand: value.type_name(),
        })
    };
    match name {
        "MIN" | "MAX" => {
            arity(2)?;
            let (a, b) = (number(&args[0])?, number(&args[1])?);
            let pick_first = if name == "MIN" { a <= b } else { a >= b };
            Ok(args[usize::from(!pick_first)].clone())
        }
        #[allow(clippy::cast_possible_truncation)]
        "INT" | "FLOOR" => {
            arity(1)?;
            Ok(Value::Int(number(&args[0])?.floor() as i64))
        }
        #[allow(clippy::cast_possible_truncation)]
        "CEILING" => {
            arity(1)?;
            Ok(Value::Int(number(&args[0])?.ceil() as i64))
        }
        "FLOAT" => {
            arity(1)?;
            Ok(Value::Float(number(&args[0])?))
        }
        "LIST_COUNT" => {
            arity(1)?;
            match &args[0] {
                Value::List(items) => Ok(Value::Int(i64::try_from(items.len()).unwrap_or(i64::MAX))),
                other => Err(EvalError::InvalidOperand {
                    op: "LIST_COUNT",
                    operand: other.type_name(),
                }),
            }
        }
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}
