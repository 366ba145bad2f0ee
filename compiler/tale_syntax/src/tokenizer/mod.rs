//! Line-oriented tokenizer.
//!
//! The document is split into top-level units (one per line, except `define`
//! blocks, which also take their indented body). Each unit is tokenized on
//! its own, so a unit's green node depends only on its own text and can be
//! reused verbatim wherever the same text reappears.

mod builder;
mod lines;

use std::sync::Arc;

use tale_ir::Span;

use crate::{GreenNode, SyntaxKind};
use builder::Builder;

/// Kind and span of one top-level unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnitSpan {
    pub kind: SyntaxKind,
    pub span: Span,
}

/// Split `text` into top-level units without tokenizing them.
pub fn scan_units(text: &str) -> Vec<UnitSpan> {
    let mut units = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let line_end = next_line_end(text, pos);
        let kind = classify_line(text.get(pos..line_end).unwrap_or(""));
        let mut end = line_end;
        if kind == SyntaxKind::Define {
            while end < text.len() {
                let next = next_line_end(text, end);
                if !is_define_body(text.get(end..next).unwrap_or("")) {
                    break;
                }
                end = next;
            }
        }
        units.push(UnitSpan {
            kind,
            span: Span::new(to_u32(pos), to_u32(end)),
        });
        pos = end;
    }
    units
}

/// Tokenize the text of a single unit of `kind`.
pub fn tokenize_unit(text: &str, kind: SyntaxKind) -> Arc<GreenNode> {
    let mut b = Builder::new(text);
    let mut pos = 0;
    let mut first = true;
    while pos < text.len() {
        let line_end = next_line_end(text, pos);
        let form = if kind == SyntaxKind::Define && !first {
            SyntaxKind::Property
        } else {
            kind
        };
        lines::line(&mut b, line_end, form);
        pos = line_end;
        first = false;
    }
    b.build(kind)
}

/// Classify a single line (including its line break).
pub fn classify_line(line: &str) -> SyntaxKind {
    if line.starts_with("define ") || line.starts_with("define\t") {
        return SyntaxKind::Define;
    }
    let t = line.trim_start_matches([' ', '\t']);
    if t.trim().is_empty() {
        SyntaxKind::Blank
    } else if t.starts_with("//") {
        SyntaxKind::Comment
    } else if starts_with_keyword(t, "INCLUDE") {
        SyntaxKind::Include
    } else if starts_with_keyword(t, "VAR") {
        SyntaxKind::VarDecl
    } else if starts_with_keyword(t, "CONST") {
        SyntaxKind::ConstDecl
    } else if starts_with_keyword(t, "LIST") {
        SyntaxKind::ListDecl
    } else if t.starts_with("==") {
        SyntaxKind::KnotHeader
    } else if t.starts_with('=') {
        SyntaxKind::StitchHeader
    } else if t.starts_with('*') || t.starts_with('+') {
        SyntaxKind::Choice
    } else if t.starts_with("->") {
        SyntaxKind::Divert
    } else if t.starts_with('-') {
        SyntaxKind::Gather
    } else if t.starts_with('~') {
        SyntaxKind::Logic
    } else {
        SyntaxKind::TextLine
    }
}

fn is_define_body(line: &str) -> bool {
    (line.starts_with(' ') || line.starts_with('\t')) && !line.trim().is_empty()
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.strip_prefix(keyword)
        .is_some_and(|rest| rest.starts_with([' ', '\t']) || rest.trim().is_empty())
}

/// End of the line starting at `from`, including its `\n`.
pub(crate) fn next_line_end(text: &str, from: usize) -> usize {
    text.get(from..)
        .and_then(|rest| rest.find('\n'))
        .map_or(text.len(), |nl| from + nl + 1)
}

#[inline]
pub(crate) fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
