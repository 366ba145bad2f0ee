use serde::Serialize;
use tale_block::parse_property_value;
use tale_ir::{Selector, Span};
use tale_syntax::{SyntaxKind, SyntaxNode};

use crate::scope::Scope;
use crate::{AnnotateCx, Annotation, Annotator};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `-> target`
    Divert,
    /// `[[name]]` in text.
    Image,
    /// `((name))` in text.
    Audio,
    /// A selector on the right of a `define` property.
    Property,
}

impl ReferenceKind {
    /// Types a bare name in this position may resolve to. Property
    /// references take theirs from the schema instead.
    pub fn expected_types(self) -> &'static [&'static str] {
        match self {
            ReferenceKind::Image => &["image", "filtered_image"],
            ReferenceKind::Audio => &["audio"],
            ReferenceKind::Divert | ReferenceKind::Property => &[],
        }
    }
}

/// The `define` property a reference is assigned into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub type_name: String,
    pub name: String,
    pub property: String,
}

/// A usage of a flow, asset or struct.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// The text as written.
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
    /// Enclosing flow path, for resolving relative divert targets.
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

#[derive(Debug, Default)]
pub struct References {
    scope: Scope,
    /// `(type, name)` of the `define` unit being visited.
    define: Option<(String, String)>,
}

impl Annotator for References {
    type Value = Reference;

    fn begin(&mut self, cx: &AnnotateCx<'_>, range: Span) {
        self.scope = Scope::restore(cx, range.start);
        self.define = None;
    }

    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) -> Vec<Annotation<Reference>> {
        let kind = node.kind();
        if kind.is_unit() {
            self.scope.observe(cx, node);
            self.define = (kind == SyntaxKind::Define)
                .then(|| define_name(cx, node))
                .flatten();
            return Vec::new();
        }
        match kind {
            SyntaxKind::DivertTarget => {
                let target = cx.slice(node).trim();
                if target.is_empty() {
                    return Vec::new();
                }
                vec![Annotation::new(
                    node.span(),
                    self.reference(ReferenceKind::Divert, target, None),
                )]
            }
            SyntaxKind::AssetRef | SyntaxKind::AudioRef => {
                let Some(name_node) = node.child(SyntaxKind::AssetName) else {
                    return Vec::new();
                };
                let name = cx.slice(name_node).trim();
                if name.is_empty() {
                    return Vec::new();
                }
                let reference_kind = if kind == SyntaxKind::AssetRef {
                    ReferenceKind::Image
                } else {
                    ReferenceKind::Audio
                };
                let selector = Selector::named(name);
                vec![Annotation::new(
                    name_node.span(),
                    self.reference(reference_kind, name, Some(selector)),
                )]
            }
            SyntaxKind::Property => self.property(cx, node),
            _ => Vec::new(),
        }
    }
}

impl References {
    fn reference(&self, kind: ReferenceKind, target: &str, selector: Option<Selector>) -> Reference {
        Reference {
            kind,
            target: target.to_string(),
            selector,
            scope: self.scope.flow_path(),
            assignment: None,
        }
    }

    fn property(&self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) -> Vec<Annotation<Reference>> {
        let Some((type_name, name)) = &self.define else {
            return Vec::new();
        };
        let (Some(path), Some(value)) = (
            node.child(SyntaxKind::PropertyPath),
            node.child(SyntaxKind::Value),
        ) else {
            return Vec::new();
        };
        let text = cx.slice(value);
        // Malformed values are reported by the compilation annotator.
        let Ok(parsed) = parse_property_value(text) else {
            return Vec::new();
        };
        parsed
            .selectors()
            .into_iter()
            .map(|selector| {
                let mut reference =
                    self.reference(ReferenceKind::Property, text.trim(), Some(selector.clone()));
                reference.assignment = Some(Assignment {
                    type_name: type_name.clone(),
                    name: name.clone(),
                    property: cx.slice(path).to_string(),
                });
                Annotation::new(value.span(), reference)
            })
            .collect()
    }
}

fn define_name(cx: &AnnotateCx<'_>, unit: SyntaxNode<'_>) -> Option<(String, String)> {
    let header = unit.child(SyntaxKind::DefineHeader)?;
    let type_name = header.child(SyntaxKind::DefineType)?;
    let name = header.child(SyntaxKind::DefineName)?;
    Some((cx.slice(type_name).to_string(), cx.slice(name).to_string()))
}
