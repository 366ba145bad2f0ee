//! Expression and logic-statement parsing.
//!
//! A recursive-descent precedence chain, lowest to highest:
//! `or` → `and` → equality → comparison/`has` → additive → multiplicative
//! → unary → primary.

use tale_diagnostic::ErrorCode;
use tale_ir::{BinaryOp, Expr, Span, Statement, UnaryOp};

use crate::lexer::{lex, unescape_string, RawToken, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;

/// A parse failure with a span relative to the parsed text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
        }
    }

    #[cold]
    fn expected_expression(after: &str, span: Span) -> Self {
        ParseError::new(
            ErrorCode::E1002,
            format!("Expected expression after '{after}'"),
            span,
        )
    }

    /// Shift the span by `offset` bytes.
    #[must_use]
    pub fn offset_by(mut self, offset: u32) -> Self {
        self.span = self.span.offset_by(offset);
        self
    }
}

/// Parse a complete expression.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(source);
    if parser.at_eof() {
        return Err(ParseError::new(
            ErrorCode::E1002,
            "Expected expression",
            parser.current().span,
        ));
    }
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse the body of a `~` logic line.
///
/// Compound assignments must already be rewritten (see
/// [`crate::transpile_compound`]).
pub fn parse_statement(source: &str) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(source);
    let statement = parser.parse_statement()?;
    parser.expect_eof()?;
    Ok(statement)
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Parser {
            source,
            tokens: lex(source),
            pos: 0,
        }
    }

    fn current(&self) -> Token {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens[self.pos.min(last)]
    }

    fn peek(&self, ahead: usize) -> Token {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens[(self.pos + ahead).min(last)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn at_eof(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    fn check(&self, raw: RawToken) -> bool {
        self.current_kind() == TokenKind::Raw(raw)
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn slice(&self, token: Token) -> &'a str {
        self.source.get(token.span.to_range()).unwrap_or("")
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        let token = self.current();
        match token.kind {
            TokenKind::Eof => Ok(()),
            TokenKind::Raw(RawToken::RParen) => Err(ParseError::new(
                ErrorCode::E1001,
                "Unexpected ')' without matching '('",
                token.span,
            )),
            _ => Err(self.unexpected(token)),
        }
    }

    #[cold]
    fn unexpected(&self, token: Token) -> ParseError {
        ParseError::new(
            ErrorCode::E1001,
            format!("Unexpected '{}'", self.slice(token)),
            token.span,
        )
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        if self.check(RawToken::Return) {
            self.advance();
            if self.at_eof() {
                return Ok(Statement::Return(None));
            }
            return Ok(Statement::Return(Some(self.parse_expr()?)));
        }
        let temp = self.check(RawToken::Temp);
        if temp {
            self.advance();
        }
        let is_assign = self.check(RawToken::Ident)
            && self.peek(1).kind == TokenKind::Raw(RawToken::Eq);
        if is_assign {
            let ident = self.advance();
            let name = self.slice(ident).to_string();
            let eq = self.advance();
            if self.at_eof() {
                return Err(ParseError::expected_expression("=", eq.span));
            }
            let value = self.parse_expr()?;
            return Ok(Statement::Assign { name, temp, value });
        }
        if temp {
            let token = self.current();
            return Err(ParseError::new(
                ErrorCode::E1004,
                "Expected variable name after 'temp'",
                token.span,
            ));
        }
        Ok(Statement::Eval(self.parse_expr()?))
    }

    /// Parse an expression, growing the stack for deep nesting.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_binary_or())
    }

    fn binary_rhs(
        &mut self,
        op_token: Token,
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        if self.at_eof() {
            return Err(ParseError::expected_expression(
                self.slice(op_token),
                op_token.span,
            ));
        }
        next(self)
    }

    fn parse_binary_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_binary_and()?;
        while self.check(RawToken::Or) || self.check(RawToken::PipePipe) {
            let op = self.advance();
            let right = self.binary_rhs(op, Self::parse_binary_and)?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_binary_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(RawToken::And) || self.check(RawToken::AmpAmp) {
            let op = self.advance();
            let right = self.binary_rhs(op, Self::parse_equality)?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while let Some(kind) = self.match_equality_op() {
            let op = self.advance();
            let right = self.binary_rhs(op, Self::parse_comparison)?;
            left = binary(kind, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        while let Some(kind) = self.match_comparison_op() {
            let op = self.advance();
            let right = self.binary_rhs(op, Self::parse_additive)?;
            left = binary(kind, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(kind) = self.match_additive_op() {
            let op = self.advance();
            let right = self.binary_rhs(op, Self::parse_multiplicative)?;
            left = binary(kind, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(kind) = self.match_multiplicative_op() {
            let op = self.advance();
            let right = self.binary_rhs(op, Self::parse_unary)?;
            left = binary(kind, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Raw(RawToken::Minus) => UnaryOp::Neg,
            TokenKind::Raw(RawToken::Bang | RawToken::Not) => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let token = self.advance();
        if self.at_eof() {
            return Err(ParseError::expected_expression(self.slice(token), token.span));
        }
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current();
        let raw = match token.kind {
            TokenKind::Raw(raw) => raw,
            TokenKind::Eof => {
                return Err(ParseError::new(
                    ErrorCode::E1002,
                    "Expected expression",
                    token.span,
                ))
            }
            TokenKind::Error => return Err(self.unexpected(token)),
        };
        match raw {
            RawToken::Int(n) => {
                self.advance();
                Ok(Expr::Int(n))
            }
            RawToken::Float(f) => {
                self.advance();
                Ok(Expr::Float(f))
            }
            RawToken::True | RawToken::False => {
                self.advance();
                Ok(Expr::Bool(raw == RawToken::True))
            }
            RawToken::String => {
                self.advance();
                Ok(Expr::Str(unescape_string(self.slice(token))))
            }
            RawToken::Ident => {
                self.advance();
                let name = self.slice(token).to_string();
                if self.check(RawToken::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            RawToken::LParen => {
                let open = self.advance();
                if self.at_eof() {
                    return Err(ParseError::expected_expression("(", open.span));
                }
                let inner = self.parse_expr()?;
                if !self.check(RawToken::RParen) {
                    return Err(unclosed(open.span, self.current().span));
                }
                self.advance();
                Ok(inner)
            }
            _ => Err(self.unexpected(token)),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let open = self.advance();
        let mut args = Vec::new();
        if self.check(RawToken::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            if self.at_eof() {
                return Err(unclosed(open.span, self.current().span));
            }
            args.push(self.parse_expr()?);
            if self.check(RawToken::Comma) {
                let comma = self.advance();
                if self.at_eof() {
                    return Err(ParseError::expected_expression(",", comma.span));
                }
                continue;
            }
            if self.check(RawToken::RParen) {
                self.advance();
                return Ok(args);
            }
            return Err(unclosed(open.span, self.current().span));
        }
    }

    fn match_equality_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Raw(RawToken::EqEq) => Some(BinaryOp::Eq),
            TokenKind::Raw(RawToken::NotEq) => Some(BinaryOp::NotEq),
            _ => None,
        }
    }

    fn match_comparison_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Raw(RawToken::Lt) => Some(BinaryOp::Lt),
            TokenKind::Raw(RawToken::LtEq) => Some(BinaryOp::LtEq),
            TokenKind::Raw(RawToken::Gt) => Some(BinaryOp::Gt),
            TokenKind::Raw(RawToken::GtEq) => Some(BinaryOp::GtEq),
            TokenKind::Raw(RawToken::Question | RawToken::Has) => Some(BinaryOp::Has),
            _ => None,
        }
    }

    fn match_additive_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Raw(RawToken::Plus) => Some(BinaryOp::Add),
            TokenKind::Raw(RawToken::Minus) => Some(BinaryOp::Sub),
            _ => None,
        }
    }

    fn match_multiplicative_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Raw(RawToken::Star) => Some(BinaryOp::Mul),
            TokenKind::Raw(RawToken::Slash) => Some(BinaryOp::Div),
            TokenKind::Raw(RawToken::Percent | RawToken::ModKw) => Some(BinaryOp::Mod),
            _ => None,
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cold]
fn unclosed(open: Span, found: Span) -> ParseError {
    ParseError::new(
        ErrorCode::E1003,
        "Unclosed '(': expected ')'",
        open.merge(found),
    )
}

#[cfg(test)]
mod tests;
