//! Export of the stitched story to runtime JSON.
//!
//! ```json
//! {
//!   "root": [ ... ],
//!   "flows": { "intro": { "kind": "knot", "content": [ ... ], "flows": { ... } } },
//!   "variables": { "gold": { "value": { "int": 3 }, "constant": false } },
//!   "lists": { "colors": { "items": { "red": 1 }, "selected": ["red"] } }
//! }
//! ```
//!
//! Content entries are objects tagged with `"type"`. A choice entry carries
//! its nested weave in `"content"`. Runtime paths are dotted: `intro.2`,
//! `intro.c-0.1`, `intro.stitch`. While writing, every path records the
//! source location it came from; a container's location grows to cover its
//! header and all of its children.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::{Map, Value};
use tale_ir::{Node, SourceLocation};
use tracing::error;

use super::stitch::{ContainerId, ContainerKind, Entry, Located, Stitcher};
use crate::program::LocationMap;

/// Output of an export: the story plus its location maps.
#[derive(Debug, Default)]
pub(crate) struct Exported {
    pub story: Value,
    pub path_locations: LocationMap,
    pub declaration_locations: LocationMap,
}

pub(crate) fn export(stitcher: &Stitcher) -> Exported {
    let mut exporter = Exporter {
        stitcher,
        out: Exported::default(),
    };
    let root: Vec<&Entry> = stitcher.top_level().collect();
    let (root_json, _) = exporter.entries("", root);

    let mut flows = Map::new();
    for (name, &id) in stitcher.flows() {
        let (json, _) = exporter.flow(name, id);
        flows.insert(name.clone(), json);
    }

    let mut story = Map::new();
    story.insert("root".to_string(), Value::Array(root_json));
    story.insert("flows".to_string(), Value::Object(flows));
    story.insert("variables".to_string(), exporter.variables());
    story.insert("lists".to_string(), exporter.lists());
    exporter.out.story = Value::Object(story);
    exporter.out
}

struct Exporter<'s> {
    stitcher: &'s Stitcher,
    out: Exported,
}

fn join(prefix: &str, leaf: &str) -> String {
    if prefix.is_empty() {
        leaf.to_string()
    } else {
        format!("{prefix}.{leaf}")
    }
}

fn union(into: &mut Option<SourceLocation>, other: Option<SourceLocation>) {
    let Some(other) = other else {
        return;
    };
    match into {
        Some(existing) => existing.expand(&other),
        None => *into = Some(other),
    }
}

impl Exporter<'_> {
    /// Record `location` for `path`, growing any earlier record.
    fn record(&mut self, path: &str, location: SourceLocation) {
        self.out
            .path_locations
            .entry(path.to_string())
            .and_modify(|existing| existing.expand(&location))
            .or_insert(location);
    }

    fn declare(&mut self, path: &str, location: SourceLocation) {
        self.out
            .declaration_locations
            .entry(path.to_string())
            .or_insert(location);
    }

    /// Export content entries under `prefix`; returns them with the union
    /// of their locations.
    fn entries<'e>(
        &mut self,
        prefix: &str,
        entries: impl IntoIterator<Item = &'e Entry>,
    ) -> (Vec<Value>, Option<SourceLocation>) {
        let mut json = Vec::new();
        let mut covered = None;
        for entry in entries {
            match entry {
                Entry::Node(located) => {
                    let Some(value) = node_json(located) else {
                        continue;
                    };
                    let path = join(prefix, &json.len().to_string());
                    self.record(&path, located.location);
                    self.label(prefix, &located.node, located.location);
                    union(&mut covered, Some(located.location));
                    json.push(value);
                }
                Entry::Choice(id) => {
                    let (value, location) = self.choice(prefix, *id);
                    union(&mut covered, location);
                    json.push(value);
                }
            }
        }
        (json, covered)
    }

    fn choice(&mut self, prefix: &str, id: ContainerId) -> (Value, Option<SourceLocation>) {
        let container = self.stitcher.container(id);
        let path = join(prefix, &container.name);
        let mut value = container
            .header
            .as_ref()
            .and_then(node_json)
            .unwrap_or_else(|| Value::Object(Map::new()));
        let mut covered = container.header.as_ref().map(|h| h.location);
        if let Some(header) = &container.header {
            self.label(prefix, &header.node, header.location);
        }
        let (content, inner) = self.entries(&path, &container.content);
        union(&mut covered, inner);
        if let Value::Object(object) = &mut value {
            object.insert("content".to_string(), Value::Array(content));
        }
        if let Some(location) = covered {
            self.record(&path, location);
        }
        (value, covered)
    }

    fn flow(&mut self, path: &str, id: ContainerId) -> (Value, Option<SourceLocation>) {
        let container = self.stitcher.container(id);
        let mut object = Map::new();
        let mut covered = None;
        if let ContainerKind::Flow(kind) = container.kind {
            object.insert("kind".to_string(), Value::from(kind.as_str()));
        }
        if let Some(header) = &container.header {
            if let Node::Flow(flow) = &header.node {
                if !flow.params.is_empty() {
                    object.insert("params".to_string(), Value::from(flow.params.clone()));
                }
            }
            self.declare(path, header.location);
            covered = Some(header.location);
        }

        let (content, inner) = self.entries(path, &container.content);
        union(&mut covered, inner);
        object.insert("content".to_string(), Value::Array(content));

        if !container.flows.is_empty() {
            let mut flows = Map::new();
            for (name, &child) in &container.flows {
                let (json, location) = self.flow(&join(path, name), child);
                union(&mut covered, location);
                flows.insert(name.clone(), json);
            }
            object.insert("flows".to_string(), Value::Object(flows));
        }
        if let Some(location) = covered {
            self.record(path, location);
        }
        (Value::Object(object), covered)
    }

    /// Labels of choices and gathers are addressable by `flow.label`.
    fn label(&mut self, prefix: &str, node: &Node, location: SourceLocation) {
        let label = match node {
            Node::Choice(choice) => choice.label.as_deref(),
            Node::Gather(gather) => gather.label.as_deref(),
            _ => None,
        };
        if let Some(label) = label {
            let path = join(flow_prefix(prefix), label);
            self.record(&path, location);
            self.declare(&path, location);
        }
    }

    fn variables(&mut self) -> Value {
        let stitcher = self.stitcher;
        let mut variables = Map::new();
        for located in &stitcher.variables {
            let Node::Variable(variable) = &located.node else {
                continue;
            };
            let mut object = Map::new();
            object.insert("value".to_string(), to_json(&variable.value));
            object.insert("constant".to_string(), Value::from(variable.constant));
            variables.insert(variable.name.clone(), Value::Object(object));
            self.record(&variable.name, located.location);
        }
        Value::Object(variables)
    }

    fn lists(&mut self) -> Value {
        let stitcher = self.stitcher;
        let mut lists = Map::new();
        for located in &stitcher.lists {
            let Node::List(list) = &located.node else {
                continue;
            };
            let items: Map<String, Value> = list
                .items
                .iter()
                .map(|item| (item.name.clone(), Value::from(item.value)))
                .collect();
            let selected: Vec<Value> = list
                .items
                .iter()
                .filter(|item| item.selected)
                .map(|item| Value::from(item.name.clone()))
                .collect();
            let mut object = Map::new();
            object.insert("items".to_string(), Value::Object(items));
            object.insert("selected".to_string(), Value::Array(selected));
            lists.insert(list.name.clone(), Value::Object(object));
            self.record(&list.name, located.location);
        }
        Value::Object(lists)
    }
}

/// Strip weave segments (`c-N` and indices) from a content prefix.
fn flow_prefix(prefix: &str) -> &str {
    let mut end = 0;
    for (i, segment) in prefix.split('.').enumerate() {
        if segment.starts_with("c-") || segment.parse::<usize>().is_ok() {
            break;
        }
        end = if i == 0 { segment.len() } else { end + 1 + segment.len() };
    }
    &prefix[..end]
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// The runtime form of one node: the node's fields under a `"type"` tag,
/// without its block-relative range.
fn node_json(located: &Located) -> Option<Value> {
    let exported = catch_unwind(AssertUnwindSafe(|| {
        let Value::Object(tagged) = serde_json::to_value(&located.node).ok()? else {
            return None;
        };
        let (tag, fields) = tagged.into_iter().next()?;
        let mut object = match fields {
            Value::Object(fields) => fields,
            other => {
                let mut object = Map::new();
                object.insert("value".to_string(), other);
                object
            }
        };
        object.remove("range");
        object.insert("type".to_string(), Value::from(tag));
        object.insert("id".to_string(), Value::from(located.id.clone()));
        Some(Value::Object(object))
    }));
    match exported {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            error!(id = %located.id, "node did not serialize");
            None
        }
        Err(_) => {
            error!(id = %located.id, "panic while exporting node");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::stitch::ScriptScope;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tale_ir::{Choice, Divert, FlowHeader, FlowKind, Range};

    fn located(node: Node, line: u32, start: u32, end: u32) -> Located {
        Located {
            node,
            location: SourceLocation::new(0, Range::on_line(line, start, end)),
            id: format!("id-{line}"),
        }
    }

    fn divert(target: &str) -> Node {
        Node::Divert(Divert {
            target: target.to_string(),
            range: Range::on_line(0, 0, 9),
        })
    }

    fn sample() -> Stitcher {
        let mut stitcher = Stitcher::new();
        let mut scope = ScriptScope::default();
        let knot = Node::Flow(FlowHeader {
            kind: FlowKind::Knot,
            name: "intro".to_string(),
            params: Vec::new(),
            range: Range::default(),
        });
        let choice = Node::Choice(Choice {
            depth: 1,
            sticky: false,
            label: Some("ask".to_string()),
            condition: None,
            start: "Ask".to_string(),
            choice_only: String::new(),
            output: String::new(),
            divert: None,
            range: Range::default(),
        });
        stitcher.push(&mut scope, located(divert("intro"), 0, 0, 8));
        stitcher.push(&mut scope, located(knot, 1, 0, 12));
        stitcher.push(&mut scope, located(choice, 2, 0, 11));
        stitcher.push(&mut scope, located(divert("END"), 3, 4, 10));
        stitcher.finish(scope, false);
        stitcher
    }

    #[test]
    fn test_story_shape() {
        let exported = export(&sample());
        let story = &exported.story;
        assert_eq!(story["root"][0]["type"], json!("divert"));
        assert_eq!(story["root"][0]["target"], json!("intro"));
        assert_eq!(story["root"][0]["id"], json!("id-0"));
        assert!(story["root"][0].get("range").is_none());
        assert_eq!(story["flows"]["intro"]["kind"], json!("knot"));
        let choice = &story["flows"]["intro"]["content"][0];
        assert_eq!(choice["type"], json!("choice"));
        assert_eq!(choice["content"][0]["target"], json!("END"));
    }

    #[test]
    fn test_locations_cover_children() {
        let exported = export(&sample());
        let locations = &exported.path_locations;
        assert_eq!(locations["0"], SourceLocation::new(0, Range::on_line(0, 0, 8)));
        assert_eq!(
            locations["intro.c-0.0"],
            SourceLocation::new(0, Range::on_line(3, 4, 10))
        );
        let choice = locations["intro.c-0"];
        assert_eq!((choice.start_line, choice.end_line, choice.end_col), (2, 3, 10));
        let intro = locations["intro"];
        assert_eq!((intro.start_line, intro.start_col), (1, 0));
        assert_eq!((intro.end_line, intro.end_col), (3, 10));
    }

    #[test]
    fn test_declarations_include_labels() {
        let exported = export(&sample());
        let declared: Vec<&String> = exported.declaration_locations.keys().collect();
        assert_eq!(declared, vec!["intro", "intro.ask"]);
        assert!(exported.path_locations.contains_key("intro.ask"));
    }

    #[test]
    fn test_flow_prefix() {
        assert_eq!(flow_prefix("intro.stitch.c-0.c-1"), "intro.stitch");
        assert_eq!(flow_prefix("c-0"), "");
        assert_eq!(flow_prefix(""), "");
        assert_eq!(flow_prefix("intro"), "intro");
    }
}
