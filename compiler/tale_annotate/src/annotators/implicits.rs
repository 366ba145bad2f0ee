use smallvec::SmallVec;
use tale_block::parse_property_value;
use tale_syntax::{SyntaxKind, SyntaxNode};

use crate::{AnnotateCx, Annotation, Annotator};

/// Type of the structs synthesized for `name~filter` references.
pub const FILTERED_IMAGE: &str = "filtered_image";

/// A reference like `hero~blur~sepia` that implies a `filtered_image`
/// struct named after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplicitMarker {
    pub name: String,
    pub base: String,
    pub filters: SmallVec<[String; 2]>,
}

impl ImplicitMarker {
    /// Split `base~filter~...`; `None` without a filter or with an empty
    /// segment.
    pub fn parse(name: &str) -> Option<ImplicitMarker> {
        let mut parts = name.split('~').map(str::trim);
        let base = parts.next().filter(|b| !b.is_empty())?;
        let filters: SmallVec<[String; 2]> = parts.map(str::to_string).collect();
        if filters.is_empty() || filters.iter().any(String::is_empty) {
            return None;
        }
        Some(ImplicitMarker {
            name: name.trim().to_string(),
            base: base.to_string(),
            filters,
        })
    }
}

/// Derived-struct markers for filtered images.
#[derive(Debug, Default)]
pub struct Implicits;

impl Annotator for Implicits {
    type Value = ImplicitMarker;

    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) -> Vec<Annotation<ImplicitMarker>> {
        match node.kind() {
            SyntaxKind::AssetRef => node
                .child(SyntaxKind::AssetName)
                .and_then(|name| {
                    ImplicitMarker::parse(cx.slice(name))
                        .map(|marker| Annotation::new(name.span(), marker))
                })
                .into_iter()
                .collect(),
            SyntaxKind::Value => {
                let Ok(value) = parse_property_value(cx.slice(node)) else {
                    return Vec::new();
                };
                value
                    .selectors()
                    .into_iter()
                    .filter_map(|selector| selector.name.as_deref())
                    .filter_map(ImplicitMarker::parse)
                    .map(|marker| Annotation::new(node.span(), marker))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
