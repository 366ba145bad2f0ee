//! Tokenization of single lines, one function per line form.
//!
//! Every form function receives the builder positioned after the line's
//! indentation and an `end` that excludes trailing whitespace, any `//`
//! comment and the line break; [`line`] emits those around it.

use super::builder::{ident_end, matching, skip_ws, Builder};
use crate::SyntaxKind;

pub(crate) fn line(b: &mut Builder<'_>, line_end: usize, form: SyntaxKind) {
    let bytes = b.bytes();
    let start = b.pos();
    let break_start = line_break_start(bytes, start, line_end);
    let code_end = comment_start(bytes, start, break_start);
    let indent_end = skip_ws(bytes, start, code_end);
    let mut content_end = code_end;
    while content_end > indent_end && matches!(bytes.get(content_end - 1), Some(b' ' | b'\t')) {
        content_end -= 1;
    }

    b.token(SyntaxKind::Whitespace, indent_end);
    if content_end > indent_end {
        form_body(b, content_end, form);
        // Forms stop early on malformed input; keep the tree lossless.
        b.token(SyntaxKind::Error, content_end);
    }
    b.token(SyntaxKind::Whitespace, code_end);
    if code_end < break_start {
        b.start(SyntaxKind::LineComment);
        b.token(SyntaxKind::CommentText, break_start);
        b.finish();
    }
    b.token(SyntaxKind::Newline, line_end);
}

fn form_body(b: &mut Builder<'_>, end: usize, form: SyntaxKind) {
    match form {
        SyntaxKind::KnotHeader => knot_header(b, end),
        SyntaxKind::StitchHeader => stitch_header(b, end),
        SyntaxKind::Choice => choice(b, end),
        SyntaxKind::Gather => gather(b, end),
        SyntaxKind::Divert => divert_clause(b, end),
        SyntaxKind::Logic => {
            b.token(SyntaxKind::Marker, b.pos() + 1);
            b.ws(end);
            b.token(SyntaxKind::Expression, end);
        }
        SyntaxKind::VarDecl | SyntaxKind::ConstDecl => declaration(b, end, SyntaxKind::Expression),
        SyntaxKind::ListDecl => declaration(b, end, SyntaxKind::ListItems),
        SyntaxKind::Include => {
            keyword(b, end);
            b.ws(end);
            b.token(SyntaxKind::Path, end);
        }
        SyntaxKind::Define => define_header(b, end),
        SyntaxKind::Property => property(b, end),
        SyntaxKind::TextLine => inline_content(b, end),
        // Blank and comment lines have no content of their own.
        _ => {}
    }
}

/// Offset of `\r\n` or `\n` ending the line, or `line_end` if unterminated.
fn line_break_start(bytes: &[u8], start: usize, line_end: usize) -> usize {
    let mut i = line_end;
    if i > start && bytes.get(i - 1) == Some(&b'\n') {
        i -= 1;
        if i > start && bytes.get(i - 1) == Some(&b'\r') {
            i -= 1;
        }
    }
    i
}

/// Offset of a `//` comment outside string literals, or `end`.
fn comment_start(bytes: &[u8], start: usize, end: usize) -> usize {
    let mut in_string = false;
    let mut i = start;
    while i < end {
        match bytes.get(i) {
            Some(b'"') => in_string = !in_string,
            Some(b'/') if !in_string && bytes.get(i + 1) == Some(&b'/') && i + 1 < end => {
                return i;
            }
            _ => {}
        }
        i += 1;
    }
    end
}

fn keyword(b: &mut Builder<'_>, end: usize) {
    let stop = ident_end(b.bytes(), b.pos(), end);
    b.token(SyntaxKind::Keyword, stop);
}

/// Keyword from `words` if one is followed by whitespace and more text.
fn optional_keyword(b: &mut Builder<'_>, end: usize, words: &[&str]) {
    let bytes = b.bytes();
    let stop = ident_end(bytes, b.pos(), end);
    let after = skip_ws(bytes, stop, end);
    if after > stop && after < end && words.contains(&b.rest(stop)) {
        b.token(SyntaxKind::Keyword, stop);
        b.ws(end);
    }
}

fn name_and_params(b: &mut Builder<'_>, end: usize) {
    let stop = ident_end(b.bytes(), b.pos(), end);
    b.token(SyntaxKind::Name, stop);
    if b.at(b'(', end) {
        let close = matching(b.bytes(), b.pos(), end, b'(', b')').map_or(end, |i| i + 1);
        b.token(SyntaxKind::Params, close);
    }
}

fn run_of(b: &Builder<'_>, end: usize, byte: u8) -> usize {
    let mut i = b.pos();
    while i < end && b.bytes().get(i) == Some(&byte) {
        i += 1;
    }
    i
}

fn knot_header(b: &mut Builder<'_>, end: usize) {
    b.token(SyntaxKind::Marker, run_of(b, end, b'='));
    b.ws(end);
    optional_keyword(b, end, &["function", "scene"]);
    name_and_params(b, end);
    b.ws(end);
    b.token(SyntaxKind::Marker, run_of(b, end, b'='));
}

fn stitch_header(b: &mut Builder<'_>, end: usize) {
    b.token(SyntaxKind::Marker, b.pos() + 1);
    b.ws(end);
    optional_keyword(b, end, &["branch"]);
    name_and_params(b, end);
}

/// Bullets such as `* *` or `- -`, interleaved whitespace included.
fn bullets(b: &mut Builder<'_>, end: usize, set: &[u8]) {
    let bytes = b.bytes();
    let mut i = b.pos();
    let mut last = i;
    loop {
        let j = skip_ws(bytes, i, end);
        match bytes.get(j) {
            Some(c) if j < end && set.contains(c) && !(*c == b'-' && bytes.get(j + 1) == Some(&b'>')) => {
                i = j + 1;
                last = i;
            }
            _ => break,
        }
    }
    b.token(SyntaxKind::Marker, last);
}

fn label(b: &mut Builder<'_>, end: usize) {
    if !b.at(b'(', end) {
        return;
    }
    b.start(SyntaxKind::Label);
    b.token(SyntaxKind::Punct, b.pos() + 1);
    b.ws(end);
    let stop = ident_end(b.bytes(), b.pos(), end);
    b.token(SyntaxKind::LabelName, stop);
    b.ws(end);
    if b.at(b')', end) {
        b.token(SyntaxKind::Punct, b.pos() + 1);
    }
    b.finish();
    b.ws(end);
}

/// `{ ... }` wrapped in `kind`, tolerating a missing close brace.
fn braced(b: &mut Builder<'_>, end: usize, kind: SyntaxKind) {
    let close = matching(b.bytes(), b.pos(), end, b'{', b'}');
    b.start(kind);
    b.token(SyntaxKind::Punct, b.pos() + 1);
    b.token(SyntaxKind::Expression, close.unwrap_or(end));
    if let Some(close) = close {
        b.token(SyntaxKind::Punct, close + 1);
    }
    b.finish();
}

fn choice(b: &mut Builder<'_>, end: usize) {
    bullets(b, end, b"*+");
    b.ws(end);
    label(b, end);
    while b.at(b'{', end) {
        braced(b, end, SyntaxKind::Condition);
        b.ws(end);
    }
    while b.pos() < end {
        let rest = b.rest(end);
        let bracket = rest.find('[');
        let arrow = rest.find("->");
        match (bracket, arrow) {
            (Some(br), Some(ar)) if br < ar => choice_only(b, end, br),
            (Some(br), None) => choice_only(b, end, br),
            (_, Some(ar)) => {
                b.token(SyntaxKind::Text, b.pos() + ar);
                divert_clause(b, end);
            }
            (None, None) => b.token(SyntaxKind::Text, end),
        }
    }
}

fn choice_only(b: &mut Builder<'_>, end: usize, offset: usize) {
    b.token(SyntaxKind::Text, b.pos() + offset);
    b.start(SyntaxKind::ChoiceOnly);
    b.token(SyntaxKind::Punct, b.pos() + 1);
    let close = b.rest(end).find(']').map(|i| b.pos() + i);
    b.token(SyntaxKind::Text, close.unwrap_or(end));
    if let Some(close) = close {
        b.token(SyntaxKind::Punct, close + 1);
    }
    b.finish();
}

fn gather(b: &mut Builder<'_>, end: usize) {
    bullets(b, end, b"-");
    b.ws(end);
    label(b, end);
    inline_content(b, end);
}

fn divert_clause(b: &mut Builder<'_>, end: usize) {
    b.start(SyntaxKind::DivertClause);
    b.token(SyntaxKind::Arrow, b.pos() + 2);
    b.ws(end);
    b.token(SyntaxKind::DivertTarget, end);
    b.finish();
}

/// Text with `[[image]]`, `((audio))`, `{expr}` and a trailing divert.
fn inline_content(b: &mut Builder<'_>, end: usize) {
    const OPENERS: [&str; 4] = ["[[", "((", "{", "->"];
    while b.pos() < end {
        let rest = b.rest(end);
        let next = OPENERS
            .iter()
            .filter_map(|open| rest.find(*open).map(|at| (at, *open)))
            .min_by_key(|(at, _)| *at);
        let Some((at, open)) = next else {
            b.token(SyntaxKind::Text, end);
            break;
        };
        b.token(SyntaxKind::Text, b.pos() + at);
        match open {
            "[[" => delimited(b, end, SyntaxKind::AssetRef, "]]"),
            "((" => delimited(b, end, SyntaxKind::AudioRef, "))"),
            "{" => braced(b, end, SyntaxKind::InlineExpr),
            _ => divert_clause(b, end),
        }
    }
}

fn delimited(b: &mut Builder<'_>, end: usize, kind: SyntaxKind, close: &str) {
    b.start(kind);
    b.token(SyntaxKind::Punct, b.pos() + 2);
    let found = b.rest(end).find(close).map(|i| b.pos() + i);
    b.token(SyntaxKind::AssetName, found.unwrap_or(end));
    if let Some(found) = found {
        b.token(SyntaxKind::Punct, found + close.len());
    }
    b.finish();
}

fn declaration(b: &mut Builder<'_>, end: usize, value: SyntaxKind) {
    keyword(b, end);
    b.ws(end);
    let stop = ident_end(b.bytes(), b.pos(), end);
    b.token(SyntaxKind::Name, stop);
    b.ws(end);
    if b.at(b'=', end) {
        b.token(SyntaxKind::Punct, b.pos() + 1);
        b.ws(end);
        b.token(value, end);
    }
}

fn define_header(b: &mut Builder<'_>, end: usize) {
    b.start(SyntaxKind::DefineHeader);
    keyword(b, end);
    b.ws(end);
    let stop = ident_end(b.bytes(), b.pos(), end);
    b.token(SyntaxKind::DefineType, stop);
    if b.at(b'.', end) {
        b.token(SyntaxKind::Punct, b.pos() + 1);
        let name_end = b
            .rest(end)
            .find([':', ' ', '\t'])
            .map_or(end, |i| b.pos() + i);
        b.token(SyntaxKind::DefineName, name_end);
    }
    if b.at(b':', end) {
        b.token(SyntaxKind::Punct, b.pos() + 1);
    }
    b.finish();
}

fn property(b: &mut Builder<'_>, end: usize) {
    b.start(SyntaxKind::Property);
    let path_end = b.rest(end).find(['=', ' ', '\t']).map_or(end, |i| b.pos() + i);
    b.token(SyntaxKind::PropertyPath, path_end);
    b.ws(end);
    if b.at(b'=', end) {
        b.token(SyntaxKind::Punct, b.pos() + 1);
        b.ws(end);
        b.token(SyntaxKind::Value, end);
    }
    b.finish();
}
