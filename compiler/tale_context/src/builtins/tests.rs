use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn builtins() -> Builtins {
    match Builtins::embedded() {
        Ok(builtins) => builtins,
        Err(err) => panic!("embedded builtins: {err}"),
    }
}

#[test]
fn test_embedded_types() {
    let builtins = builtins();
    let types: Vec<&str> = builtins.type_names().collect();
    assert_eq!(
        types,
        vec!["audio", "character", "filter", "filtered_image", "font", "image", "style", "ui"]
    );
}

#[test]
fn test_named_structs_get_type_defaults() {
    let builtins = builtins();
    assert_eq!(
        builtins.context().get("filter", "blur"),
        Some(&json!({"amount": 4, "$type": "filter", "$name": "blur"}))
    );
    let Some(serif) = builtins.context().get("font", "serif") else {
        panic!("expected font.serif");
    };
    assert_eq!(serif["family"], json!("serif"));
    assert_eq!(serif["weight"], json!(400));
}

#[test]
fn test_meta_entries_are_not_structs() {
    let builtins = builtins();
    assert!(!builtins.context().contains("image", "$default"));
    assert!(!builtins.context().contains("character", "$optional:narrator"));
    assert!(builtins.context().type_names().any(|t| t == "image"));
    assert!(builtins.registry().contains("filter.blur.amount"));
}

#[test]
fn test_meta_accessors() {
    let builtins = builtins();
    assert_eq!(builtins.default_property("image", "anchor"), Some(&json!("center")));
    assert_eq!(
        builtins.optional_for("character", "narrator"),
        Some(&json!({"visible": false}))
    );
    assert!(builtins.optional_of("character").is_some());
    assert!(builtins.is_builtin_type("filtered_image"));
    assert!(!builtins.is_builtin_type("knot"));
}

#[test]
fn test_schema_entries() {
    let builtins = builtins();
    let Some(width) = builtins.schema_entry("image", "width") else {
        panic!("expected image width schema");
    };
    assert_eq!(width.kinds, vec![JsonKind::Number]);
    assert!(width.allows_value(&json!("auto")));
    assert!(!width.allows_value(&json!("wide")));

    let Some(filters) = builtins.schema_entry("filtered_image", "filters") else {
        panic!("expected filters schema");
    };
    assert_eq!(filters.kinds, vec![JsonKind::List]);
    assert_eq!(filters.struct_types, vec!["filter".to_string()]);
}

#[test]
fn test_rejects_malformed_builtins() {
    assert!(matches!(
        Builtins::from_json(&json!([])),
        Err(BuiltinsError::NotAnObject)
    ));
    assert!(matches!(
        Builtins::from_json(&json!({"image": 3})),
        Err(BuiltinsError::BadType(name)) if name == "image"
    ));
}
