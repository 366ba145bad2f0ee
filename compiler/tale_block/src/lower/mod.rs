//! Lowering of one top-level unit to diagnostics and narrative AST.
//!
//! Everything produced here is block-relative: line 0 is the unit's first
//! line, so a unit that only moved lowers to identical output.

mod content;
mod define;

use serde::Serialize;
use tale_diagnostic::{Diagnostic, ErrorCode, LineIndex};
use tale_ir::{Node, Range, Span};
use tale_syntax::{SyntaxKind, SyntaxNode};
use tracing::trace;

use crate::ParseError;
pub use define::{
    parse_property_value, reference_of, PropertyDef, PropertyValue, StructDefinition,
    DEFAULT_NAME, REFERENCE_KEY,
};

/// Everything one unit contributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlockOutput {
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    /// Explicitly named `define` structs. Each also stands for the struct's
    /// property registry entry, which the context builder replaces wholesale.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<StructDefinition>,
    /// `define type.$default:` structs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<StructDefinition>,
}

impl BlockOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Lower `unit`, a direct child of the document tree over `source`.
pub fn lower(unit: SyntaxNode<'_>, source: &str) -> BlockOutput {
    let mut cx = Lowering::new(unit, source);
    match unit.kind() {
        SyntaxKind::KnotHeader | SyntaxKind::StitchHeader => cx.flow_header(),
        SyntaxKind::Choice => cx.choice(),
        SyntaxKind::Gather => cx.gather(),
        SyntaxKind::Divert => cx.divert(),
        SyntaxKind::Logic => cx.logic(),
        SyntaxKind::VarDecl | SyntaxKind::ConstDecl => cx.variable(),
        SyntaxKind::ListDecl => cx.list(),
        SyntaxKind::Include => cx.include(),
        SyntaxKind::Define => cx.define(),
        SyntaxKind::TextLine => cx.text_line(),
        _ => {}
    }
    cx.report_error_tokens();
    trace!(
        kind = ?unit.kind(),
        diagnostics = cx.out.diagnostics.len(),
        nodes = cx.out.content.len(),
        "lowered unit"
    );
    cx.out
}

pub(crate) struct Lowering<'a> {
    unit: SyntaxNode<'a>,
    source: &'a str,
    text: &'a str,
    lines: LineIndex,
    out: BlockOutput,
}

impl<'a> Lowering<'a> {
    fn new(unit: SyntaxNode<'a>, source: &'a str) -> Self {
        let text = unit.text(source);
        Lowering {
            unit,
            source,
            text,
            lines: LineIndex::build(text),
            out: BlockOutput::default(),
        }
    }

    /// Block-relative range of an absolute span.
    fn range(&self, span: Span) -> Range {
        let base = self.unit.from();
        let relative = Span::new(
            span.start.saturating_sub(base),
            span.end.saturating_sub(base),
        );
        self.lines.range_of(self.text, relative)
    }

    fn node_range(&self, node: SyntaxNode<'_>) -> Range {
        self.range(node.span())
    }

    /// The unit's first line without its line break.
    fn line_range(&self) -> Range {
        let end = self
            .unit
            .child(SyntaxKind::Newline)
            .map_or(self.unit.to(), |nl| nl.from());
        self.range(Span::new(self.unit.from(), end))
    }

    fn slice(&self, node: SyntaxNode<'_>) -> &'a str {
        node.text(self.source)
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        self.out.diagnostics.push(diagnostic);
    }

    fn error(&mut self, code: ErrorCode, span: Span, message: impl Into<String>) {
        let range = self.range(span);
        self.push(Diagnostic::error(code).with_message(message).with_range(range));
    }

    /// Report a parse error whose span is relative to text starting at
    /// absolute offset `base`.
    fn parse_error(&mut self, err: ParseError, base: u32) {
        let span = err.span.offset_by(base);
        self.error(err.code, span, err.message);
    }

    fn report_error_tokens(&mut self) {
        let stray: Vec<Span> = self
            .unit
            .descendants()
            .into_iter()
            .filter(|node| node.kind() == SyntaxKind::Error)
            .map(|node| node.span())
            .collect();
        for span in stray {
            let text = self.source.get(span.to_range()).unwrap_or("").trim();
            self.error(ErrorCode::E1001, span, format!("Unexpected '{text}'"));
        }
    }
}
