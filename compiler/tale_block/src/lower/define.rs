//! `define type.name:` blocks and their property values.
//!
//! ```text
//! define image.hero:
//!     file = "hero.png"
//!     size.width = 320
//!     filters = [blur, filter.sepia]
//! ```
//!
//! Property paths are dotted and build a nested object. Values are
//! literals, lists, or references to other structs written as selectors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tale_diagnostic::ErrorCode;
use tale_ir::{Range, Selector};
use tale_syntax::{SyntaxKind, SyntaxNode};

use super::content::is_identifier;
use super::Lowering;
use crate::lexer::unescape_string;

/// Name of the struct holding a type's default properties.
pub const DEFAULT_NAME: &str = "$default";

/// Key marking a reference object in lowered struct JSON.
pub const REFERENCE_KEY: &str = "$ref";

/// A struct declared by one `define` block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructDefinition {
    pub type_name: String,
    pub name: String,
    /// The nested property object, without `$type`/`$name`.
    pub value: Value,
    pub properties: Vec<PropertyDef>,
}

impl StructDefinition {
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_NAME
    }
}

/// One `path = value` line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub path: String,
    pub value: PropertyValue,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum PropertyValue {
    Literal(Value),
    Reference(Selector),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// The value as stored in struct JSON; references become
    /// `{"$ref": selector}` objects.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Literal(value) => value.clone(),
            PropertyValue::Reference(selector) => {
                let mut object = Map::new();
                object.insert(
                    REFERENCE_KEY.to_string(),
                    serde_json::to_value(selector).unwrap_or(Value::Null),
                );
                Value::Object(object)
            }
            PropertyValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Every selector in this value, list items included.
    pub fn selectors(&self) -> Vec<&Selector> {
        match self {
            PropertyValue::Literal(_) => Vec::new(),
            PropertyValue::Reference(selector) => vec![selector],
            PropertyValue::List(items) => items.iter().flat_map(Self::selectors).collect(),
        }
    }
}

/// The selector of a `{"$ref": ...}` object.
pub fn reference_of(value: &Value) -> Option<Selector> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    serde_json::from_value(object.get(REFERENCE_KEY)?.clone()).ok()
}

/// Parse the right-hand side of a property line.
pub fn parse_property_value(text: &str) -> Result<PropertyValue, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Expected property value".to_string());
    }
    if text.starts_with('"') {
        if text.len() < 2 || !text.ends_with('"') || text.ends_with("\\\"") {
            return Err("Unterminated string".to_string());
        }
        return Ok(PropertyValue::Literal(Value::String(unescape_string(text))));
    }
    if let Some(inner) = text.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| "Unclosed '[': expected ']'".to_string())?;
        let items = split_top_level(inner)
            .into_iter()
            .filter(|item| !item.trim().is_empty())
            .map(parse_property_value)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(PropertyValue::List(items));
    }
    match text {
        "true" => return Ok(PropertyValue::Literal(Value::Bool(true))),
        "false" => return Ok(PropertyValue::Literal(Value::Bool(false))),
        "null" => return Ok(PropertyValue::Literal(Value::Null)),
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        return Ok(PropertyValue::Literal(Value::from(int)));
    }
    if let Some(number) = text
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Ok(PropertyValue::Literal(Value::Number(number)));
    }
    if let Some((type_name, filter)) = text.split_once('[') {
        return property_selector(type_name.trim(), filter);
    }
    if let Some((type_name, name)) = text.split_once('.') {
        if is_identifier(type_name) && is_struct_name(name) {
            return Ok(PropertyValue::Reference(Selector::typed(&[type_name], name)));
        }
        return Err(format!("Invalid reference '{text}'"));
    }
    if is_struct_name(text) {
        return Ok(PropertyValue::Reference(Selector::named(text)));
    }
    Err(format!("Invalid property value '{text}'"))
}

/// `type[property=value]`.
fn property_selector(type_name: &str, filter: &str) -> Result<PropertyValue, String> {
    let filter = filter
        .strip_suffix(']')
        .ok_or_else(|| "Unclosed '[': expected ']'".to_string())?;
    let (property, value) = filter
        .split_once('=')
        .ok_or_else(|| format!("Expected '=' in '[{filter}]'"))?;
    let property = property.trim();
    if !is_identifier(type_name) || !property.split('.').all(is_identifier) {
        return Err(format!("Invalid selector '{type_name}[{filter}]'"));
    }
    match parse_property_value(value)? {
        PropertyValue::Literal(value) => Ok(PropertyValue::Reference(Selector::by_property(
            &[type_name],
            property,
            value,
        ))),
        _ => Err(format!("Expected a literal to compare '{property}' against")),
    }
}

/// Struct names allow spaces (fuzzy lookup), dashes and `~filter` suffixes.
fn is_struct_name(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ' ' | '~'))
        && !text.ends_with(' ')
}

/// Split on commas outside strings and brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Set `value` at a dotted `path` in `object`, creating intermediate objects.
fn insert_path(object: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = object;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
}

impl<'a> Lowering<'a> {
    pub(super) fn define(&mut self) {
        let unit = self.unit;
        let Some(header) = unit.child(SyntaxKind::DefineHeader) else {
            return;
        };
        let Some((type_name, name)) = self.define_header(header) else {
            return;
        };

        let mut object = Map::new();
        let mut properties = Vec::new();
        for line in unit.children().filter(|n| n.kind() == SyntaxKind::Property) {
            if let Some(property) = self.property(line) {
                insert_path(&mut object, &property.path, property.value.to_json());
                properties.push(property);
            }
        }

        let definition = StructDefinition {
            type_name,
            name,
            value: Value::Object(object),
            properties,
        };
        if definition.is_default() {
            self.out.defaults.push(definition);
        } else {
            self.out.definitions.push(definition);
        }
    }

    fn define_header(&mut self, header: SyntaxNode<'_>) -> Option<(String, String)> {
        let Some(type_node) = header.child(SyntaxKind::DefineType) else {
            let span = header.child(SyntaxKind::Keyword).map_or(header.span(), |k| k.span());
            self.error(ErrorCode::E1007, span, "Expected struct type after 'define'");
            return None;
        };
        let type_name = self.slice(type_node).to_string();
        let Some(name_node) = header.child(SyntaxKind::DefineName) else {
            self.error(
                ErrorCode::E1007,
                type_node.span(),
                format!("Expected 'define {type_name}.name:'"),
            );
            return None;
        };
        let name = self.slice(name_node).to_string();
        let has_colon = header
            .children()
            .any(|child| child.kind() == SyntaxKind::Punct && self.slice(child) == ":");
        if !has_colon {
            self.error(
                ErrorCode::E1007,
                name_node.span(),
                format!("Expected ':' after '{type_name}.{name}'"),
            );
            return None;
        }
        Some((type_name, name))
    }

    fn property(&mut self, line: SyntaxNode<'_>) -> Option<PropertyDef> {
        let range = self.node_range(line);
        let Some(path_node) = line.child(SyntaxKind::PropertyPath) else {
            self.error(ErrorCode::E1008, line.span(), "Expected property name before '='");
            return None;
        };
        let path = self.slice(path_node);
        if !path.split('.').all(is_identifier) {
            self.error(
                ErrorCode::E1008,
                path_node.span(),
                format!("Invalid property name '{path}'"),
            );
            return None;
        }
        let Some(eq) = line.child(SyntaxKind::Punct) else {
            self.error(
                ErrorCode::E1008,
                path_node.span(),
                format!("Expected '=' after '{path}'"),
            );
            return None;
        };
        let Some(value_node) = line.child(SyntaxKind::Value) else {
            self.error(ErrorCode::E1008, eq.span(), "Expected value after '='");
            return None;
        };
        match parse_property_value(self.slice(value_node)) {
            Ok(value) => Some(PropertyDef {
                path: path.to_string(),
                value,
                range,
            }),
            Err(message) => {
                self.error(ErrorCode::E1008, value_node.span(), message);
                None
            }
        }
    }
}
