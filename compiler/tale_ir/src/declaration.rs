//! Declaration kinds shared by the declarations annotator and the compiler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a named declaration introduces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Knot,
    Function,
    Scene,
    Stitch,
    Branch,
    Label,
    Variable,
    Constant,
    List,
    /// A `define type.name:` struct.
    Struct,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Knot => "knot",
            DeclarationKind::Function => "function",
            DeclarationKind::Scene => "scene",
            DeclarationKind::Stitch => "stitch",
            DeclarationKind::Branch => "branch",
            DeclarationKind::Label => "label",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Constant => "constant",
            DeclarationKind::List => "list",
            DeclarationKind::Struct => "struct",
        }
    }

    /// Kinds whose names become runtime flow paths.
    pub fn is_flow(self) -> bool {
        matches!(
            self,
            DeclarationKind::Knot
                | DeclarationKind::Function
                | DeclarationKind::Scene
                | DeclarationKind::Stitch
                | DeclarationKind::Branch
                | DeclarationKind::Label
        )
    }

    /// Kinds that may not reuse a builtin type name.
    pub fn forbids_type_names(self) -> bool {
        matches!(
            self,
            DeclarationKind::Knot
                | DeclarationKind::Function
                | DeclarationKind::Scene
                | DeclarationKind::Variable
                | DeclarationKind::Constant
                | DeclarationKind::List
        )
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<crate::FlowKind> for DeclarationKind {
    fn from(kind: crate::FlowKind) -> Self {
        match kind {
            crate::FlowKind::Knot => DeclarationKind::Knot,
            crate::FlowKind::Function => DeclarationKind::Function,
            crate::FlowKind::Scene => DeclarationKind::Scene,
            crate::FlowKind::Stitch => DeclarationKind::Stitch,
            crate::FlowKind::Branch => DeclarationKind::Branch,
        }
    }
}
