//! Resolution of [`Selector`]s against the context graph.
//!
//! For each candidate type, in order:
//!
//! 1. by name, through the property registry when one is supplied, else by
//!    a recursive search of the type's structs;
//! 2. by `property == value` across the type's structs;
//! 3. the type's whole bucket, for selectors with neither.
//!
//! The first hit wins.

use serde_json::Value;
use tale_ir::Selector;
use tracing::trace;

use crate::json::{get_path, META_PREFIX};
use crate::registry::struct_key;
use crate::{ContextGraph, PropertyRegistry};

/// A selector's target.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub type_name: String,
    /// `None` when the whole type bucket matched.
    pub name: Option<String>,
    /// Dotted path of the hit, starting with the type.
    pub path: String,
    pub value: Value,
}

/// Resolve `selector`, trying its own types or else `expected`. With no
/// types at all, every type of the graph is a candidate.
pub fn resolve_selector(
    selector: &Selector,
    expected: &[String],
    context: &ContextGraph,
    registry: Option<&PropertyRegistry>,
) -> Option<Resolved> {
    let candidates: Vec<String> = {
        let types = selector.candidate_types(expected);
        if types.is_empty() {
            context.type_names().map(str::to_string).collect()
        } else {
            types.to_vec()
        }
    };
    for type_name in &candidates {
        let hit = if let Some(name) = &selector.name {
            match registry {
                Some(registry) => by_index(type_name, name, selector.fuzzy, registry),
                None => by_search(type_name, name, selector.fuzzy, context),
            }
        } else if let Some(property) = &selector.property {
            by_property(type_name, property, selector.value.as_ref(), context)
        } else {
            whole_bucket(type_name, context)
        };
        if let Some(hit) = hit {
            trace!(%selector, path = %hit.path, "selector resolved");
            return Some(hit);
        }
    }
    None
}

/// Names a selector name can match: itself, then, when fuzzy, each of its
/// whitespace-separated words.
fn name_candidates(name: &str, fuzzy: bool) -> Vec<&str> {
    let mut names = vec![name];
    if fuzzy {
        names.extend(name.split_whitespace().filter(|word| *word != name));
    }
    names
}

fn by_index(
    type_name: &str,
    name: &str,
    fuzzy: bool,
    registry: &PropertyRegistry,
) -> Option<Resolved> {
    name_candidates(name, fuzzy).into_iter().find_map(|candidate| {
        let path = struct_key(type_name, candidate);
        registry.get(&path).map(|value| Resolved {
            type_name: type_name.to_string(),
            name: Some(candidate.to_string()),
            value: value.clone(),
            path,
        })
    })
}

fn by_search(type_name: &str, name: &str, fuzzy: bool, context: &ContextGraph) -> Option<Resolved> {
    let bucket = context.bucket(type_name)?;
    let candidates = name_candidates(name, fuzzy);
    // Top-level struct names first, then nested properties.
    for candidate in &candidates {
        if let Some(value) = bucket.get(*candidate) {
            return Some(Resolved {
                type_name: type_name.to_string(),
                name: Some((*candidate).to_string()),
                path: struct_key(type_name, candidate),
                value: value.clone(),
            });
        }
    }
    for (struct_name, value) in bucket {
        let prefix = struct_key(type_name, struct_name);
        if let Some((path, found)) = search_nested(&prefix, value, &candidates) {
            return Some(Resolved {
                type_name: type_name.to_string(),
                name: Some(struct_name.clone()),
                path,
                value: found.clone(),
            });
        }
    }
    None
}

/// Depth-first search for a key in `candidates` below `value`.
fn search_nested<'a>(prefix: &str, value: &'a Value, candidates: &[&str]) -> Option<(String, &'a Value)> {
    let Value::Object(object) = value else {
        return None;
    };
    for (key, child) in object {
        if key.starts_with(META_PREFIX) {
            continue;
        }
        let path = format!("{prefix}.{key}");
        if candidates.contains(&key.as_str()) {
            return Some((path, child));
        }
        if let Some(found) = search_nested(&path, child, candidates) {
            return Some(found);
        }
    }
    None
}

fn by_property(
    type_name: &str,
    property: &str,
    value: Option<&Value>,
    context: &ContextGraph,
) -> Option<Resolved> {
    let bucket = context.bucket(type_name)?;
    bucket.iter().find_map(|(name, candidate)| {
        let actual = get_path(candidate, property)?;
        if value.is_some_and(|expected| expected != actual) {
            return None;
        }
        Some(Resolved {
            type_name: type_name.to_string(),
            name: Some(name.clone()),
            path: struct_key(type_name, name),
            value: candidate.clone(),
        })
    })
}

fn whole_bucket(type_name: &str, context: &ContextGraph) -> Option<Resolved> {
    let bucket = context.bucket(type_name)?;
    let value = Value::Object(
        bucket
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    );
    Some(Resolved {
        type_name: type_name.to_string(),
        name: None,
        path: type_name.to_string(),
        value,
    })
}
