//! Walking `filtered_image` chains down to their base image.

use serde_json::Value;
use tale_block::reference_of;

use crate::ContextGraph;

pub const IMAGE: &str = "image";
pub const FILTERED_IMAGE: &str = "filtered_image";

/// Where a `filtered_image` chain ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainResult {
    /// A base image plus the filters applied to it, innermost first.
    Image { base: String, filters: Vec<String> },
    /// The chain points at a name that is neither kind of image.
    Missing { name: String },
    /// The chain revisits a struct; `path` lists it from the start through
    /// the repeated name.
    Cycle { path: Vec<String> },
}

/// Follow the `image` property of `filtered_image.name` until a plain image
/// is reached.
pub fn walk_filtered_image(context: &ContextGraph, name: &str) -> ChainResult {
    let mut visited: Vec<String> = Vec::new();
    let mut layers: Vec<Vec<String>> = Vec::new();
    let mut current = name.to_string();
    loop {
        if visited.contains(&current) {
            visited.push(current);
            return ChainResult::Cycle { path: visited };
        }
        if let Some(filtered) = context.get(FILTERED_IMAGE, &current) {
            layers.push(
                filtered
                    .get("filters")
                    .and_then(Value::as_array)
                    .map(|filters| filters.iter().filter_map(target_name).collect())
                    .unwrap_or_default(),
            );
            let next = filtered.get("image").and_then(target_name);
            visited.push(current);
            match next {
                Some(next) => current = next,
                None => {
                    return ChainResult::Missing {
                        name: visited.last().cloned().unwrap_or_default(),
                    }
                }
            }
        } else if context.contains(IMAGE, &current) {
            layers.reverse();
            return ChainResult::Image {
                base: current,
                filters: layers.into_iter().flatten().collect(),
            };
        } else {
            return ChainResult::Missing { name: current };
        }
    }
}

/// Name referenced by a property: a reference's selector name or a plain
/// string.
fn target_name(value: &Value) -> Option<String> {
    match reference_of(value) {
        Some(selector) => selector.name,
        None => value.as_str().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reference(types: &[&str], name: &str) -> Value {
        json!({"$ref": {"types": types, "name": name}})
    }

    #[test]
    fn test_chain_collects_filters_innermost_first() {
        let mut graph = ContextGraph::new();
        graph.insert(IMAGE, "hero", json!({"src": "hero.png"}));
        graph.insert(
            FILTERED_IMAGE,
            "hero~blur",
            json!({"image": reference(&["image"], "hero"), "filters": [reference(&["filter"], "blur")]}),
        );
        graph.insert(
            FILTERED_IMAGE,
            "hero~blur~grey",
            json!({"image": "hero~blur", "filters": ["grey"]}),
        );
        assert_eq!(
            walk_filtered_image(&graph, "hero~blur~grey"),
            ChainResult::Image {
                base: "hero".to_string(),
                filters: vec!["blur".to_string(), "grey".to_string()],
            }
        );
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut graph = ContextGraph::new();
        graph.insert(FILTERED_IMAGE, "a", json!({"image": "b"}));
        graph.insert(FILTERED_IMAGE, "b", json!({"image": "a"}));
        assert_eq!(
            walk_filtered_image(&graph, "a"),
            ChainResult::Cycle {
                path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_base() {
        let mut graph = ContextGraph::new();
        graph.insert(FILTERED_IMAGE, "x", json!({"image": "nowhere"}));
        assert_eq!(
            walk_filtered_image(&graph, "x"),
            ChainResult::Missing {
                name: "nowhere".to_string()
            }
        );
        graph.insert(FILTERED_IMAGE, "y", json!({"image": null}));
        assert_eq!(
            walk_filtered_image(&graph, "y"),
            ChainResult::Missing { name: "y".to_string() }
        );
    }
}
