//! Assembling the context of one compile from builtins and document
//! contributions.
//!
//! A struct is materialized by merging, lowest precedence first:
//!
//! 1. its type's builtin `$default`
//! 2. the builtin struct of the same name
//! 3. the document `$default` of its type
//! 4. implicit entries (`name~filter` images)
//! 5. asset file metadata
//! 6. the explicit `define` block
//!
//! Redefining a struct in a document replaces the earlier definition
//! wholesale instead of merging with it.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::debug;

use crate::json::merge_into;
use crate::{Builtins, ContextGraph, PropertyRegistry};

type Key = (String, String);

/// The finished context of a compile.
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub graph: ContextGraph,
    pub registry: PropertyRegistry,
}

pub struct ContextBuilder<'b> {
    builtins: &'b Builtins,
    defaults: BTreeMap<String, Value>,
    implicit: BTreeMap<Key, Value>,
    files: BTreeMap<Key, Value>,
    explicit: BTreeMap<Key, Value>,
}

impl<'b> ContextBuilder<'b> {
    pub fn new(builtins: &'b Builtins) -> Self {
        ContextBuilder {
            builtins,
            defaults: BTreeMap::new(),
            implicit: BTreeMap::new(),
            files: BTreeMap::new(),
            explicit: BTreeMap::new(),
        }
    }

    /// Merge a document `define type.$default:` block.
    pub fn add_default(&mut self, type_name: &str, value: &Value) {
        let entry = self
            .defaults
            .entry(type_name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        merge_into(entry, value);
    }

    /// Record an explicit definition. Returns `true` if it replaced an
    /// earlier one.
    pub fn define(&mut self, type_name: &str, name: &str, value: Value) -> bool {
        let replaced = self.explicit.insert(key(type_name, name), value).is_some();
        if replaced {
            debug!(type_name, name, "struct redefined");
        }
        replaced
    }

    pub fn add_implicit(&mut self, type_name: &str, name: &str, value: &Value) {
        merge_layer(&mut self.implicit, type_name, name, value);
    }

    pub fn add_file(&mut self, type_name: &str, name: &str, metadata: &Value) {
        merge_layer(&mut self.files, type_name, name, metadata);
    }

    pub fn build(self) -> Context {
        let builtin_context = self.builtins.context();
        let mut keys: BTreeSet<Key> = builtin_context
            .iter()
            .map(|(type_name, name, _)| key(type_name, name))
            .collect();
        keys.extend(self.implicit.keys().cloned());
        keys.extend(self.files.keys().cloned());
        keys.extend(self.explicit.keys().cloned());

        let mut graph = ContextGraph::new();
        for type_name in self.builtins.type_names().chain(self.defaults.keys().map(String::as_str)) {
            graph.declare_type(type_name);
        }
        let mut registry = self.builtins.registry().clone();
        for (type_name, name) in &keys {
            let value = self.materialize(type_name, name);
            graph.insert(type_name, name, value);
            let Some(materialized) = graph.get(type_name, name) else {
                continue;
            };
            if builtin_context.get(type_name, name) != Some(materialized) {
                registry.replace_struct(type_name, name, materialized);
            }
        }
        debug!(structs = graph.len(), "context built");
        Context { graph, registry }
    }

    fn materialize(&self, type_name: &str, name: &str) -> Value {
        let key = key(type_name, name);
        let layers = [
            self.builtins.default_of(type_name),
            self.builtins.named(type_name, name),
            self.defaults.get(type_name),
            self.implicit.get(&key),
            self.files.get(&key),
            self.explicit.get(&key),
        ];
        let mut value = Value::Object(Map::new());
        for layer in layers.into_iter().flatten() {
            merge_into(&mut value, layer);
        }
        value
    }
}

fn key(type_name: &str, name: &str) -> Key {
    (type_name.to_string(), name.to_string())
}

fn merge_layer(layer: &mut BTreeMap<Key, Value>, type_name: &str, name: &str, value: &Value) {
    let entry = layer
        .entry(key(type_name, name))
        .or_insert_with(|| Value::Object(Map::new()));
    merge_into(entry, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn builtins() -> Builtins {
        let json = json!({
            "font": {
                "$default": {"family": "builtin-default", "weight": 400, "size": 12, "color": "black"},
                "body": {"family": "builtin-named", "weight": 500, "size": 14},
            }
        });
        match Builtins::from_json(&json) {
            Ok(builtins) => builtins,
            Err(err) => panic!("{err}"),
        }
    }

    fn font(context: &Context, name: &str) -> Value {
        context.graph.get("font", name).cloned().unwrap_or_default()
    }

    #[test]
    fn test_builtin_layers_only() {
        let builtins = builtins();
        let context = ContextBuilder::new(&builtins).build();
        let body = font(&context, "body");
        assert_eq!(body["family"], json!("builtin-named"));
        assert_eq!(body["color"], json!("black"));
    }

    #[test]
    fn test_precedence_of_every_layer() {
        let builtins = builtins();
        let mut builder = ContextBuilder::new(&builtins);
        builder.add_default("font", &json!({"weight": 300, "size": 10}));
        builder.define("font", "body", json!({"size": 20}));
        let context = builder.build();
        let body = font(&context, "body");
        // builtin $default < builtin named < document $default < explicit
        assert_eq!(body["color"], json!("black"));
        assert_eq!(body["family"], json!("builtin-named"));
        assert_eq!(body["weight"], json!(300));
        assert_eq!(body["size"], json!(20));
        assert_eq!(body["$type"], json!("font"));
        assert_eq!(body["$name"], json!("body"));
    }

    #[test]
    fn test_document_default_fills_new_structs() {
        let builtins = builtins();
        let mut builder = ContextBuilder::new(&builtins);
        builder.add_default("font", &json!({"size": 10}));
        builder.define("font", "title", json!({"family": "Lora"}));
        let context = builder.build();
        let title = font(&context, "title");
        assert_eq!(title["family"], json!("Lora"));
        assert_eq!(title["size"], json!(10));
        assert_eq!(title["weight"], json!(400));
        assert_eq!(
            context.registry.get("font.title.family"),
            Some(&json!("Lora"))
        );
    }

    #[test]
    fn test_redefinition_replaces_wholesale() {
        let builtins = builtins();
        let mut builder = ContextBuilder::new(&builtins);
        assert!(!builder.define("font", "title", json!({"family": "Lora", "size": 30})));
        assert!(builder.define("font", "title", json!({"family": "Inter"})));
        let context = builder.build();
        let title = font(&context, "title");
        assert_eq!(title["family"], json!("Inter"));
        assert_eq!(title["size"], json!(12));
        assert_eq!(context.registry.get("font.title.size"), Some(&json!(12)));
    }

    #[test]
    fn test_files_and_implicits_sit_below_explicit() {
        let builtins = builtins();
        let mut builder = ContextBuilder::new(&builtins);
        builder.add_file("font", "title", &json!({"src": "Lora.ttf", "family": "Lora"}));
        builder.define("font", "title", json!({"family": "Lora Display"}));
        builder.add_implicit("filtered_image", "hero~blur", &json!({"filters": ["blur"]}));
        let context = builder.build();
        let title = font(&context, "title");
        assert_eq!(title["src"], json!("Lora.ttf"));
        assert_eq!(title["family"], json!("Lora Display"));
        assert!(context.graph.contains("filtered_image", "hero~blur"));
    }
}
