//! The merged `type → name → struct` map.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::json::{NAME_KEY, TYPE_KEY};

/// Structs of one type, by name.
pub type TypeBucket = BTreeMap<String, Value>;

/// Every known struct, builtin and document-declared.
///
/// `BTreeMap`s keep iteration (and therefore resolution order and the
/// serialized program) deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContextGraph {
    types: BTreeMap<String, TypeBucket>,
}

impl ContextGraph {
    pub fn new() -> Self {
        ContextGraph::default()
    }

    /// Make sure `type_name` has a (possibly empty) bucket.
    pub fn declare_type(&mut self, type_name: &str) {
        self.types.entry(type_name.to_string()).or_default();
    }

    pub fn get(&self, type_name: &str, name: &str) -> Option<&Value> {
        self.types.get(type_name)?.get(name)
    }

    pub fn bucket(&self, type_name: &str) -> Option<&TypeBucket> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str, name: &str) -> bool {
        self.get(type_name, name).is_some()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// All structs as `(type, name, value)`, sorted by type then name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.types.iter().flat_map(|(type_name, bucket)| {
            bucket
                .iter()
                .map(move |(name, value)| (type_name.as_str(), name.as_str(), value))
        })
    }

    pub fn len(&self) -> usize {
        self.types.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or replace a struct wholesale, stamping `$type`/`$name`.
    pub fn insert(&mut self, type_name: &str, name: &str, mut value: Value) {
        stamp(&mut value, type_name, name);
        self.types
            .entry(type_name.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }
}

/// Set `$type` and `$name` unless already present; a struct's identity is
/// fixed by whoever created it first.
fn stamp(value: &mut Value, type_name: &str, name: &str) {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    if let Value::Object(object) = value {
        object
            .entry(TYPE_KEY)
            .or_insert_with(|| Value::String(type_name.to_string()));
        object
            .entry(NAME_KEY)
            .or_insert_with(|| Value::String(name.to_string()));
    }
}
