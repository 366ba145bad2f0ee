//! Helpers over struct JSON.

use std::fmt;

use serde_json::Value;
use tale_block::REFERENCE_KEY;

/// Property keys starting with this are bookkeeping, not user properties.
pub const META_PREFIX: char = '$';

/// Key of a struct's type.
pub const TYPE_KEY: &str = "$type";

/// Key of a struct's name.
pub const NAME_KEY: &str = "$name";

/// Deep-merge `overlay` into `base`. Objects merge key by key; anything
/// else, references included, replaces what was there.
pub fn merge_into(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) if !is_reference(overlay) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) if !is_reference_value(existing) => merge_into(existing, value),
                    _ => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

fn is_reference(object: &serde_json::Map<String, Value>) -> bool {
    object.contains_key(REFERENCE_KEY)
}

fn is_reference_value(value: &Value) -> bool {
    value.as_object().is_some_and(is_reference)
}

/// Look up a dotted `path` inside `value`.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Runtime type of a JSON value, as named in schemas and diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    List,
    Object,
    /// `{"$ref": selector}`.
    Reference,
}

impl JsonKind {
    pub fn of(value: &Value) -> JsonKind {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::List,
            Value::Object(object) if is_reference(object) => JsonKind::Reference,
            Value::Object(_) => JsonKind::Object,
        }
    }

    /// Parse a scalar kind name used in `$schema`.
    pub fn from_name(name: &str) -> Option<JsonKind> {
        Some(match name {
            "null" => JsonKind::Null,
            "boolean" | "bool" => JsonKind::Boolean,
            "number" | "integer" | "int" | "float" => JsonKind::Number,
            "string" => JsonKind::String,
            "list" | "array" => JsonKind::List,
            "object" => JsonKind::Object,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::List => "list",
            JsonKind::Object => "object",
            JsonKind::Reference => "reference",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_merge_is_deep_for_objects() {
        let mut base = json!({"size": {"w": 1, "h": 2}, "src": "a"});
        merge_into(&mut base, &json!({"size": {"w": 5}, "alt": true}));
        assert_eq!(base, json!({"size": {"w": 5, "h": 2}, "src": "a", "alt": true}));
    }

    #[test]
    fn test_references_replace_wholesale() {
        let mut base = json!({"font": {"$ref": {"types": ["font"], "name": "a"}}});
        merge_into(&mut base, &json!({"font": {"$ref": {"name": "b"}}}));
        assert_eq!(base, json!({"font": {"$ref": {"name": "b"}}}));
    }

    #[test]
    fn test_get_path() {
        let value = json!({"a": {"b": {"c": 3}}});
        assert_eq!(get_path(&value, "a.b.c"), Some(&json!(3)));
        assert_eq!(get_path(&value, "a.x"), None);
        assert_eq!(get_path(&value, ""), Some(&value));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(JsonKind::of(&json!({"$ref": {}})), JsonKind::Reference);
        assert_eq!(JsonKind::of(&json!([1])), JsonKind::List);
        assert_eq!(JsonKind::from_name("integer"), Some(JsonKind::Number));
        assert_eq!(JsonKind::from_name("image"), None);
    }
}
