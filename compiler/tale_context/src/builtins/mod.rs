//! Builtin struct types and their defaults.
//!
//! Each builtin type maps names to structs. Keys starting with `$` are not
//! structs:
//!
//! - `$default`: properties every struct of the type starts from
//! - `$optional`: properties a struct may set that have no default
//! - `$optional:<name>`: the same, for one struct name only
//! - `$schema`: per-property kinds, struct types and valid scalar
//!   alternatives, keyed by dotted property path

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::json::{get_path, merge_into, JsonKind, META_PREFIX};
use crate::{ContextGraph, PropertyRegistry};

const EMBEDDED: &str = include_str!("builtins.json");

const DEFAULT_KEY: &str = "$default";
const OPTIONAL_KEY: &str = "$optional";
const SCHEMA_KEY: &str = "$schema";

#[derive(Debug, Error)]
pub enum BuiltinsError {
    #[error("invalid builtins JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("builtins must be an object keyed by type name")]
    NotAnObject,
    #[error("builtin type `{0}` must be an object keyed by struct name")]
    BadType(String),
}

/// Builtin types with their materialized structs and index.
///
/// Immutable once built; reconfiguring swaps in a fresh value.
#[derive(Clone, Debug, Default)]
pub struct Builtins {
    types: BTreeMap<String, Map<String, Value>>,
    context: ContextGraph,
    registry: PropertyRegistry,
}

impl Builtins {
    /// The builtins shipped with the toolchain.
    pub fn embedded() -> Result<Builtins, BuiltinsError> {
        let json: Value = serde_json::from_str(EMBEDDED)?;
        Builtins::from_json(&json)
    }

    /// Like [`Builtins::embedded`], falling back to no builtins at all.
    pub fn embedded_or_empty() -> Builtins {
        Builtins::embedded().unwrap_or_else(|err| {
            error!(%err, "embedded builtins failed to load");
            Builtins::default()
        })
    }

    pub fn from_json(json: &Value) -> Result<Builtins, BuiltinsError> {
        let Value::Object(root) = json else {
            return Err(BuiltinsError::NotAnObject);
        };
        let mut types = BTreeMap::new();
        for (type_name, entries) in root {
            let Value::Object(entries) = entries else {
                return Err(BuiltinsError::BadType(type_name.clone()));
            };
            types.insert(type_name.clone(), entries.clone());
        }

        let mut context = ContextGraph::new();
        for (type_name, entries) in &types {
            context.declare_type(type_name);
            let default = entries.get(DEFAULT_KEY);
            for (name, value) in entries {
                if name.starts_with(META_PREFIX) {
                    continue;
                }
                let mut materialized = default.cloned().unwrap_or(Value::Object(Map::new()));
                merge_into(&mut materialized, value);
                context.insert(type_name, name, materialized);
            }
        }
        let registry = PropertyRegistry::build(&context);
        debug!(types = types.len(), structs = context.len(), "builtins loaded");
        Ok(Builtins {
            types,
            context,
            registry,
        })
    }

    /// Builtin structs with their type's `$default` applied.
    pub fn context(&self) -> &ContextGraph {
        &self.context
    }

    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn is_builtin_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// A builtin struct as written, without defaults.
    pub fn named(&self, type_name: &str, name: &str) -> Option<&Value> {
        self.entry(type_name, name)
    }

    pub fn default_of(&self, type_name: &str) -> Option<&Value> {
        self.entry(type_name, DEFAULT_KEY)
    }

    pub fn optional_of(&self, type_name: &str) -> Option<&Value> {
        self.entry(type_name, OPTIONAL_KEY)
    }

    /// `$optional:<name>` of `type_name`.
    pub fn optional_for(&self, type_name: &str, name: &str) -> Option<&Value> {
        self.entry(type_name, &format!("{OPTIONAL_KEY}:{name}"))
    }

    pub fn schema_of(&self, type_name: &str) -> Option<&Value> {
        self.entry(type_name, SCHEMA_KEY)
    }

    /// Schema of one property, by dotted path.
    pub fn schema_entry(&self, type_name: &str, path: &str) -> Option<SchemaEntry> {
        let schema = self.schema_of(type_name)?.as_object()?;
        schema.get(path).and_then(SchemaEntry::from_json)
    }

    fn entry(&self, type_name: &str, key: &str) -> Option<&Value> {
        self.types.get(type_name)?.get(key)
    }

    /// Property `path` of the builtin `$default` of `type_name`.
    pub fn default_property(&self, type_name: &str, path: &str) -> Option<&Value> {
        get_path(self.default_of(type_name)?, path)
    }
}

/// One `$schema` property: `"kind"` or `{"type": kind | [kinds], "values": [...]}`.
///
/// Kinds are scalar kind names (`string`, `number`, `boolean`, `list`, ...)
/// or struct type names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaEntry {
    pub kinds: Vec<JsonKind>,
    pub struct_types: Vec<String>,
    /// Scalars accepted regardless of kind.
    pub values: Vec<Value>,
}

impl SchemaEntry {
    pub fn from_json(json: &Value) -> Option<SchemaEntry> {
        let mut entry = SchemaEntry::default();
        let types = match json {
            Value::String(_) => json,
            Value::Object(object) => {
                if let Some(Value::Array(values)) = object.get("values") {
                    entry.values.clone_from(values);
                }
                object.get("type").unwrap_or(&Value::Null)
            }
            _ => return None,
        };
        let names: Vec<&str> = match types {
            Value::String(name) => vec![name.as_str()],
            Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        for name in names {
            match JsonKind::from_name(name) {
                Some(kind) => entry.kinds.push(kind),
                None => entry.struct_types.push(name.to_string()),
            }
        }
        Some(entry)
    }

    /// Whether a literal is listed as a valid alternative.
    pub fn allows_value(&self, value: &Value) -> bool {
        self.values.contains(value)
    }
}

#[cfg(test)]
mod tests;
