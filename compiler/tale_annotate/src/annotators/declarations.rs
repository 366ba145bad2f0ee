use serde::Serialize;
use tale_ir::{DeclarationKind, Span};
use tale_syntax::{SyntaxKind, SyntaxNode};

use crate::scope::Scope;
use crate::{AnnotateCx, Annotation, Annotator};

/// A named thing introduced by the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    /// Full dotted path; stitches and labels nest under their flow.
    pub path: String,
}

/// Knots, stitches, labels, variables, lists and `define` structs.
#[derive(Debug, Default)]
pub struct Declarations {
    scope: Scope,
}

impl Annotator for Declarations {
    type Value = Declaration;

    fn begin(&mut self, cx: &AnnotateCx<'_>, range: Span) {
        self.scope = Scope::restore(cx, range.start);
    }

    fn enter(&mut self, cx: &AnnotateCx<'_>, node: SyntaxNode<'_>) -> Vec<Annotation<Declaration>> {
        let declared = match node.kind() {
            SyntaxKind::KnotHeader | SyntaxKind::StitchHeader => self.flow(cx, node),
            SyntaxKind::Label => node.child(SyntaxKind::LabelName).map(|name| {
                let label = cx.slice(name);
                let declaration = Declaration {
                    kind: DeclarationKind::Label,
                    name: label.to_string(),
                    path: self.scope.path(label),
                };
                (name.span(), declaration)
            }),
            SyntaxKind::VarDecl | SyntaxKind::ConstDecl | SyntaxKind::ListDecl => {
                let kind = match node.kind() {
                    SyntaxKind::VarDecl => DeclarationKind::Variable,
                    SyntaxKind::ConstDecl => DeclarationKind::Constant,
                    _ => DeclarationKind::List,
                };
                node.child(SyntaxKind::Name).map(|name| {
                    let name_text = cx.slice(name).to_string();
                    let declaration = Declaration {
                        kind,
                        path: name_text.clone(),
                        name: name_text,
                    };
                    (name.span(), declaration)
                })
            }
            SyntaxKind::DefineHeader => {
                let type_node = node.child(SyntaxKind::DefineType);
                let name_node = node.child(SyntaxKind::DefineName);
                type_node.zip(name_node).map(|(ty, name)| {
                    let path = format!("{}.{}", cx.slice(ty), cx.slice(name));
                    let declaration = Declaration {
                        kind: DeclarationKind::Struct,
                        name: path.clone(),
                        path,
                    };
                    (ty.span().merge(name.span()), declaration)
                })
            }
            _ => None,
        };
        declared
            .map(|(span, declaration)| vec![Annotation::new(span, declaration)])
            .unwrap_or_default()
    }
}

impl Declarations {
    fn flow(&mut self, cx: &AnnotateCx<'_>, unit: SyntaxNode<'_>) -> Option<(Span, Declaration)> {
        let name_node = unit.child(SyntaxKind::Name)?;
        let name = self.scope.observe(cx, unit)?;
        let keyword = unit.child(SyntaxKind::Keyword).map(|k| cx.slice(k));
        let kind = match (unit.kind(), keyword) {
            (SyntaxKind::KnotHeader, Some("function")) => DeclarationKind::Function,
            (SyntaxKind::KnotHeader, Some("scene")) => DeclarationKind::Scene,
            (SyntaxKind::KnotHeader, _) => DeclarationKind::Knot,
            (_, Some("branch")) => DeclarationKind::Branch,
            _ => DeclarationKind::Stitch,
        };
        let declaration = Declaration {
            kind,
            name,
            path: self.scope.flow_path(),
        };
        Some((name_node.span(), declaration))
    }
}
