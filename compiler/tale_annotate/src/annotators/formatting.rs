use serde::Serialize;
use tale_syntax::{SyntaxKind, SyntaxNode};

use crate::{AnnotateCx, Annotation, Annotator};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    TrailingWhitespace,
    /// Indentation mixing tabs and spaces.
    MixedIndentation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormatMarker {
    pub kind: FormatKind,
}

/// Whitespace problems, for editors only.
#[derive(Debug, Default)]
pub struct Formatting;

impl Annotator for Formatting {
    type Value = FormatMarker;

    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) -> Vec<Annotation<FormatMarker>> {
        if node.kind() != SyntaxKind::Whitespace {
            return Vec::new();
        }
        let text = cx.slice(node);
        let before = cx.text.get(..node.from() as usize).unwrap_or_default();
        let after = cx.text.get(node.to() as usize..).unwrap_or_default();

        let mut markers = Vec::new();
        if (before.is_empty() || before.ends_with('\n')) && text.contains(' ') && text.contains('\t')
        {
            markers.push(marker(node, FormatKind::MixedIndentation));
        }
        if after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n") {
            markers.push(marker(node, FormatKind::TrailingWhitespace));
        }
        markers
    }
}

fn marker(node: SyntaxNode<'_>, kind: FormatKind) -> Annotation<FormatMarker> {
    Annotation::new(node.span(), FormatMarker { kind })
}
