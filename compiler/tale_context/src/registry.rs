//! Flattened dotted-path index over a [`ContextGraph`].
//!
//! Every struct is indexed under `type.name`, and every nested property
//! under `type.name.path.to.property`, so finding a struct by name takes one
//! map access.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::json::META_PREFIX;
use crate::ContextGraph;

#[derive(Clone, Debug, Default)]
pub struct PropertyRegistry {
    entries: FxHashMap<String, Value>,
}

impl PropertyRegistry {
    pub fn build(graph: &ContextGraph) -> Self {
        let mut registry = PropertyRegistry::default();
        for (type_name, name, value) in graph.iter() {
            registry.insert_struct(type_name, name, value);
        }
        registry
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get_struct(&self, type_name: &str, name: &str) -> Option<&Value> {
        self.get(&struct_key(type_name, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index a struct and all of its properties.
    pub fn insert_struct(&mut self, type_name: &str, name: &str, value: &Value) {
        let key = struct_key(type_name, name);
        self.index_properties(&key, value);
        self.entries.insert(key, value.clone());
    }

    /// Drop a struct's entries, then index `value` in its place.
    pub fn replace_struct(&mut self, type_name: &str, name: &str, value: &Value) {
        self.remove_struct(type_name, name);
        self.insert_struct(type_name, name, value);
    }

    pub fn remove_struct(&mut self, type_name: &str, name: &str) {
        let key = struct_key(type_name, name);
        let prefix = format!("{key}.");
        self.entries
            .retain(|path, _| path != &key && !path.starts_with(&prefix));
    }

    fn index_properties(&mut self, prefix: &str, value: &Value) {
        let Value::Object(object) = value else {
            return;
        };
        for (key, child) in object {
            if key.starts_with(META_PREFIX) {
                continue;
            }
            let path = format!("{prefix}.{key}");
            self.index_properties(&path, child);
            self.entries.insert(path, child.clone());
        }
    }
}

pub fn struct_key(type_name: &str, name: &str) -> String {
    format!("{type_name}.{name}")
}
