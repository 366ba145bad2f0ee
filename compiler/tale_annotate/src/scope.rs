//! Enclosing-flow tracking shared by the declaration and reference
//! annotators.

use tale_syntax::{SyntaxKind, SyntaxNode};

use crate::AnnotateCx;

/// The knot (or function/scene) and stitch (or branch) currently open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Scope {
    knot: Option<String>,
    stitch: Option<String>,
}

impl Scope {
    /// The scope in effect at `offset`, rebuilt from the units before it.
    pub(crate) fn restore(cx: &AnnotateCx<'_>, offset: u32) -> Scope {
        let mut scope = Scope::default();
        for unit in cx.tree.units().take_while(|unit| unit.to() <= offset) {
            scope.observe(cx, unit);
        }
        scope
    }

    /// Update for a top-level unit; returns the header name if it opened a
    /// flow.
    pub(crate) fn observe(&mut self, cx: &AnnotateCx<'_>, unit: SyntaxNode<'_>) -> Option<String> {
        let kind = unit.kind();
        if !matches!(kind, SyntaxKind::KnotHeader | SyntaxKind::StitchHeader) {
            return None;
        }
        let name = unit
            .child(SyntaxKind::Name)
            .map(|n| cx.slice(n).to_string())?;
        if kind == SyntaxKind::KnotHeader {
            self.knot = Some(name.clone());
            self.stitch = None;
        } else {
            self.stitch = Some(name.clone());
        }
        Some(name)
    }

    /// Dotted path of the innermost open flow; empty at the top level.
    pub(crate) fn flow_path(&self) -> String {
        match (&self.knot, &self.stitch) {
            (Some(knot), Some(stitch)) => format!("{knot}.{stitch}"),
            (Some(knot), None) => knot.clone(),
            (None, Some(stitch)) => stitch.clone(),
            (None, None) => String::new(),
        }
    }

    /// `leaf` nested under the innermost open flow.
    pub(crate) fn path(&self, leaf: &str) -> String {
        let flow = self.flow_path();
        if flow.is_empty() {
            leaf.to_string()
        } else {
            format!("{flow}.{leaf}")
        }
    }
}
