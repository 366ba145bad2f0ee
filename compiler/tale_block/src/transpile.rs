//! Rewriting of compound assignments into plain ones.
//!
//! `x += e` becomes `x = x + (e)`, `x -= e` becomes `x = x - (e)`, and
//! `x++` / `x--` become `x = x + 1` / `x = x - 1`. The rewritten text is
//! parsed like any other statement; positions map back to the original
//! and anything reported inside injected text is flagged as such.

use tale_ir::Span;

use crate::lexer::{lex, RawToken, TokenKind};

/// A rewritten statement plus the bookkeeping to map spans back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transpiled {
    pub text: String,
    /// Spans of `text` that do not exist in the original.
    injected: Vec<Span>,
    /// Where the copied name sits in the original.
    name: Span,
    /// Where the copied right-hand side sits in the original and in `text`.
    rhs_original: Span,
    rhs_start: u32,
    /// The compound operator in the original.
    operator: Span,
}

impl Transpiled {
    /// The compound operator's span in the original text.
    pub fn operator(&self) -> Span {
        self.operator
    }

    /// The right-hand side in the original text (empty for `++`/`--`).
    pub fn rhs(&self) -> Span {
        self.rhs_original
    }

    /// Whether `span` (in `text`) falls in synthesized text.
    pub fn is_injected(&self, span: Span) -> bool {
        self.injected.iter().any(|injected| {
            if span.is_empty() {
                injected.start <= span.start && span.start < injected.end
            } else {
                injected.intersects(span)
            }
        })
    }

    /// Map a span of `text` back to the original; injected text maps to
    /// the operator.
    pub fn to_original(&self, span: Span) -> Span {
        if self.is_injected(span) {
            return self.operator;
        }
        let name_len = self.name.len();
        let map = |pos: u32| {
            if pos <= name_len {
                self.name.start + pos
            } else {
                self.rhs_original.start + pos.saturating_sub(self.rhs_start)
            }
        };
        Span::new(map(span.start), map(span.end).max(map(span.start)))
    }
}

/// Rewrite `source` if it is a compound assignment.
pub fn transpile_compound(source: &str) -> Option<Transpiled> {
    let tokens = lex(source);
    let (name_tok, op_tok) = (tokens.first()?, tokens.get(1)?);
    if name_tok.kind != TokenKind::Raw(RawToken::Ident) {
        return None;
    }
    let name = source.get(name_tok.span.to_range())?;
    let name_len = name_tok.span.len();

    let (symbol, rhs_original) = match op_tok.kind {
        TokenKind::Raw(RawToken::PlusEq) => ('+', Span::new(op_tok.span.end, to_u32(source.len()))),
        TokenKind::Raw(RawToken::MinusEq) => ('-', Span::new(op_tok.span.end, to_u32(source.len()))),
        TokenKind::Raw(RawToken::PlusPlus | RawToken::MinusMinus) => {
            // Only a bare `x++`.
            if tokens.get(2).map(|t| t.kind) != Some(TokenKind::Eof) {
                return None;
            }
            let symbol = if op_tok.kind == TokenKind::Raw(RawToken::PlusPlus) {
                '+'
            } else {
                '-'
            };
            let text = format!("{name} = {name} {symbol} 1");
            let injected = vec![Span::new(name_len, to_u32(text.len()))];
            return Some(Transpiled {
                text,
                injected,
                name: name_tok.span,
                rhs_original: Span::point(op_tok.span.end),
                rhs_start: name_len,
                operator: op_tok.span,
            });
        }
        _ => return None,
    };

    let rhs = source.get(rhs_original.to_range())?;
    let prefix = format!("{name} = {name} {symbol} (");
    let rhs_start = to_u32(prefix.len());
    let text = format!("{prefix}{rhs})");
    let close = to_u32(text.len());
    Some(Transpiled {
        injected: vec![Span::new(name_len, rhs_start), Span::new(close - 1, close)],
        text,
        name: name_tok.span,
        rhs_original,
        rhs_start,
        operator: op_tok.span,
    })
}

#[inline]
fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
