//! Compiler configuration.
//!
//! ```json
//! {
//!   "builtins": { "image": { "$default": { ... } } },
//!   "extensions": ["", ".tale", ".ink", ".txt"],
//!   "reserved_kinds": ["knot", "function", "scene", "variable", "constant", "list"]
//! }
//! ```
//!
//! Every field is optional. Without `builtins` the embedded definitions
//! shipped with the toolchain are used.

use serde::Deserialize;
use serde_json::Value;
use tale_context::{Builtins, BuiltinsError};
use tale_ir::DeclarationKind;
use thiserror::Error;

/// Extensions tried by file resolution, in order. The empty extension
/// stands for the path as written and only applies when it has one.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["", ".tale", ".ink", ".txt"];

const ALL_KINDS: [DeclarationKind; 10] = [
    DeclarationKind::Knot,
    DeclarationKind::Function,
    DeclarationKind::Scene,
    DeclarationKind::Stitch,
    DeclarationKind::Branch,
    DeclarationKind::Label,
    DeclarationKind::Variable,
    DeclarationKind::Constant,
    DeclarationKind::List,
    DeclarationKind::Struct,
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid compiler configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Builtins(#[from] BuiltinsError),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Builtin struct types; `None` selects the embedded set.
    pub builtins: Option<Value>,
    pub extensions: Vec<String>,
    /// Declaration kinds that may not be named after a builtin type.
    pub reserved_kinds: Vec<DeclarationKind>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            builtins: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
            reserved_kinds: ALL_KINDS
                .into_iter()
                .filter(|kind| kind.forbids_type_names())
                .collect(),
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(text: &str) -> Result<CompilerConfig, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the builtin context this configuration describes.
    pub fn load_builtins(&self) -> Result<Builtins, ConfigError> {
        match &self.builtins {
            Some(json) => Ok(Builtins::from_json(json)?),
            None => Ok(Builtins::embedded()?),
        }
    }

    pub fn is_reserved(&self, kind: DeclarationKind) -> bool {
        self.reserved_kinds.contains(&kind)
    }
}
