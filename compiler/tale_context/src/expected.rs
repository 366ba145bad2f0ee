//! What a struct property is expected to hold.
//!
//! The expectation for `type.name.path` comes from the first of these that
//! has a non-null value at `path`: the type's builtin `$default`, its
//! `$optional:<name>`, its `$optional`. Failing all three, the `$schema`
//! entry alone describes it. The schema's listed scalar alternatives apply
//! in every case.

use serde_json::Value;
use tale_block::reference_of;

use crate::builtins::{Builtins, SchemaEntry};
use crate::json::{get_path, JsonKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExpectedSource {
    Default,
    NamedOptional,
    Optional,
    Schema,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expected {
    pub source: ExpectedSource,
    /// The template value; `None` when only the schema knows the property.
    pub value: Option<Value>,
    pub schema: Option<SchemaEntry>,
}

/// Look up the expectation for property `path` of struct `type_name.name`.
pub fn expected_for(builtins: &Builtins, type_name: &str, name: &str, path: &str) -> Option<Expected> {
    let schema = builtins.schema_entry(type_name, path);
    let sources = [
        (ExpectedSource::Default, builtins.default_of(type_name)),
        (ExpectedSource::NamedOptional, builtins.optional_for(type_name, name)),
        (ExpectedSource::Optional, builtins.optional_of(type_name)),
    ];
    for (source, template) in sources {
        let found = template.and_then(|template| get_path(template, path));
        if let Some(value) = found.filter(|value| !value.is_null()) {
            return Some(Expected {
                source,
                value: Some(value.clone()),
                schema,
            });
        }
    }
    schema.map(|schema| Expected {
        source: ExpectedSource::Schema,
        value: None,
        schema: Some(schema),
    })
}

impl Expected {
    /// Struct types a reference in this position may resolve to.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .value
            .as_ref()
            .and_then(reference_of)
            .map(|selector| selector.types)
            .unwrap_or_default();
        if let Some(schema) = &self.schema {
            for type_name in &schema.struct_types {
                if !types.contains(type_name) {
                    types.push(type_name.clone());
                }
            }
        }
        types
    }

    /// Runtime kinds a literal in this position may have.
    pub fn kinds(&self) -> Vec<JsonKind> {
        match &self.value {
            Some(value) => vec![JsonKind::of(value)],
            None => self
                .schema
                .as_ref()
                .map(|schema| schema.kinds.clone())
                .unwrap_or_default(),
        }
    }

    /// Whether a literal fits. Schema-listed alternatives always do, and a
    /// position that only expects struct references never takes literals.
    pub fn accepts_literal(&self, literal: &Value) -> bool {
        if literal.is_null() {
            return true;
        }
        if self.schema.as_ref().is_some_and(|s| s.allows_value(literal)) {
            return true;
        }
        let kinds = self.kinds();
        if kinds.is_empty() {
            return self.types().is_empty();
        }
        kinds.contains(&JsonKind::of(literal))
    }

    /// Human-readable expectation for diagnostics.
    pub fn describe(&self) -> String {
        let kinds: Vec<&str> = self
            .kinds()
            .into_iter()
            .filter(|kind| *kind != JsonKind::Reference)
            .map(JsonKind::as_str)
            .collect();
        let mut parts: Vec<String> = kinds.into_iter().map(str::to_string).collect();
        parts.extend(self.types());
        if parts.is_empty() {
            "any value".to_string()
        } else {
            parts.join(" or ")
        }
    }
}
