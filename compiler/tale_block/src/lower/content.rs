//! Narrative forms: flow headers, choices, gathers, diverts, logic and text.

use tale_diagnostic::{expected_expression, unclosed_delimiter, Diagnostic, ErrorCode};
use tale_ir::{
    BinaryOp, Choice, Divert, Expr, FlowHeader, FlowKind, Gather, ListDecl, ListItem, Logic, Node,
    Span, TextLine, TextPart, Variable,
};
use tale_syntax::{SyntaxKind, SyntaxNode};

use super::Lowering;
use crate::{parse_expression, parse_statement, transpile_compound};

impl<'a> Lowering<'a> {
    pub(super) fn flow_header(&mut self) {
        let unit = self.unit;
        let keyword = unit.child(SyntaxKind::Keyword).map(|k| self.slice(k));
        let kind = match (unit.kind(), keyword) {
            (SyntaxKind::KnotHeader, Some("function")) => FlowKind::Function,
            (SyntaxKind::KnotHeader, Some("scene")) => FlowKind::Scene,
            (SyntaxKind::KnotHeader, _) => FlowKind::Knot,
            (_, Some("branch")) => FlowKind::Branch,
            _ => FlowKind::Stitch,
        };
        let name = unit
            .child(SyntaxKind::Name)
            .map(|n| self.slice(n).to_string())
            .unwrap_or_default();
        if name.is_empty() {
            let marker = unit.child(SyntaxKind::Marker).map_or(unit.span(), |m| m.span());
            let marker_text = self.source.get(marker.to_range()).unwrap_or("==");
            self.error(
                ErrorCode::E1005,
                marker,
                format!("Expected {} name after '{marker_text}'", kind.as_str()),
            );
            return;
        }
        let params = unit
            .child(SyntaxKind::Params)
            .map(|p| self.params(p))
            .unwrap_or_default();
        let range = self.line_range();
        self.out.content.push(Node::Flow(FlowHeader {
            kind,
            name,
            params,
            range,
        }));
    }

    fn params(&mut self, node: SyntaxNode<'_>) -> Vec<String> {
        let text = self.slice(node);
        let Some(inner) = text.strip_prefix('(') else {
            return Vec::new();
        };
        let inner = match inner.strip_suffix(')') {
            Some(inner) => inner,
            None => {
                let range = self.node_range(node);
                self.push(unclosed_delimiter(range, "(", ")"));
                inner
            }
        };
        let mut params = Vec::new();
        for param in inner.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let name = param.strip_prefix("ref ").map_or(param, str::trim);
            if is_identifier(name) {
                params.push(name.to_string());
            } else {
                self.error(
                    ErrorCode::E1004,
                    node.span(),
                    format!("Invalid parameter name '{name}'"),
                );
            }
        }
        params
    }

    pub(super) fn choice(&mut self) {
        let unit = self.unit;
        let marker = unit.child(SyntaxKind::Marker).map(|m| self.slice(m)).unwrap_or("*");
        let depth = bullet_depth(marker, &['*', '+']);
        let sticky = marker.contains('+');
        let label = unit.child(SyntaxKind::Label).and_then(|l| self.label(l));

        let mut condition: Option<Expr> = None;
        for node in unit.children().filter(|n| n.kind() == SyntaxKind::Condition) {
            if let Some(expr) = self.braced_expression(node) {
                condition = Some(match condition {
                    Some(prev) => Expr::Binary {
                        op: BinaryOp::And,
                        lhs: Box::new(prev),
                        rhs: Box::new(expr),
                    },
                    None => expr,
                });
            }
        }

        let mut start = String::new();
        let mut choice_only = String::new();
        let mut output = String::new();
        let mut seen_bracket = false;
        let mut divert = None;
        for node in unit.children() {
            match node.kind() {
                SyntaxKind::Text if seen_bracket => output.push_str(self.slice(node)),
                SyntaxKind::Text => start.push_str(self.slice(node)),
                SyntaxKind::ChoiceOnly => {
                    seen_bracket = true;
                    if let Some(text) = node.child(SyntaxKind::Text) {
                        choice_only.push_str(self.slice(text));
                    }
                    if !has_closing_punct(node, 2) {
                        let range = self.node_range(node);
                        self.push(unclosed_delimiter(range, "[", "]"));
                    }
                }
                SyntaxKind::DivertClause => divert = self.divert_target(node),
                _ => {}
            }
        }
        let (start, output) = if seen_bracket {
            (start.trim_start().to_string(), output.trim_end().to_string())
        } else {
            (start.trim().to_string(), output)
        };
        if start.is_empty() && choice_only.is_empty() && output.is_empty() && divert.is_none() {
            let span = unit.child(SyntaxKind::Marker).map_or(unit.span(), |m| m.span());
            self.error(ErrorCode::E1006, span, "Expected choice text or divert");
        }
        let range = self.line_range();
        self.out.content.push(Node::Choice(Choice {
            depth,
            sticky,
            label,
            condition,
            start,
            choice_only,
            output,
            divert,
            range,
        }));
    }

    pub(super) fn gather(&mut self) {
        let unit = self.unit;
        let marker = unit.child(SyntaxKind::Marker).map(|m| self.slice(m)).unwrap_or("-");
        let depth = bullet_depth(marker, &['-']);
        let label = unit.child(SyntaxKind::Label).and_then(|l| self.label(l));
        let (parts, divert) = self.inline_parts(unit);
        let range = self.line_range();
        self.out.content.push(Node::Gather(Gather {
            depth,
            label,
            parts,
            divert,
            range,
        }));
    }

    pub(super) fn divert(&mut self) {
        let Some(clause) = self.unit.child(SyntaxKind::DivertClause) else {
            return;
        };
        if let Some(target) = self.divert_target(clause) {
            let range = self.line_range();
            self.out.content.push(Node::Divert(Divert { target, range }));
        }
    }

    pub(super) fn logic(&mut self) {
        let unit = self.unit;
        let Some(expr_node) = unit.child(SyntaxKind::Expression) else {
            let span = unit.child(SyntaxKind::Marker).map_or(unit.span(), |m| m.span());
            let range = self.range(span);
            self.push(expected_expression(range, "~"));
            return;
        };
        let source = self.slice(expr_node);
        let base = expr_node.from();

        let statement = match transpile_compound(source) {
            Some(rewritten) => match parse_statement(&rewritten.text) {
                Ok(statement) => Some(statement),
                Err(err) if rewritten.is_injected(err.span) => {
                    // Reported against synthesized text; surface the author's
                    // own right-hand side error instead, if there is one.
                    let span = rewritten.operator().offset_by(base);
                    let range = self.range(span);
                    self.push(
                        Diagnostic::error(err.code)
                            .with_message(err.message)
                            .with_range(range)
                            .suppressed(),
                    );
                    let rhs = rewritten.rhs();
                    let rhs_text = source.get(rhs.to_range()).unwrap_or("");
                    if rhs_text.trim().is_empty() {
                        let op = source.get(rewritten.operator().to_range()).unwrap_or("+=");
                        let range = self.range(span);
                        self.push(expected_expression(range, op));
                    } else if let Err(inner) = parse_expression(rhs_text) {
                        self.parse_error(inner, base + rhs.start);
                    }
                    None
                }
                Err(mut err) => {
                    err.span = rewritten.to_original(err.span);
                    self.parse_error(err, base);
                    None
                }
            },
            None => match parse_statement(source) {
                Ok(statement) => Some(statement),
                Err(err) => {
                    self.parse_error(err, base);
                    None
                }
            },
        };
        if let Some(statement) = statement {
            let range = self.line_range();
            self.out.content.push(Node::Logic(Logic { statement, range }));
        }
    }

    pub(super) fn variable(&mut self) {
        let unit = self.unit;
        let constant = unit.kind() == SyntaxKind::ConstDecl;
        let keyword = if constant { "CONST" } else { "VAR" };
        let Some(name_node) = unit.child(SyntaxKind::Name).filter(|n| !n.span().is_empty()) else {
            let span = unit.child(SyntaxKind::Keyword).map_or(unit.span(), |k| k.span());
            self.error(
                ErrorCode::E1004,
                span,
                format!("Expected variable name after '{keyword}'"),
            );
            return;
        };
        let name = self.slice(name_node).to_string();
        let Some(eq) = unit.child(SyntaxKind::Punct) else {
            self.error(
                ErrorCode::E1001,
                name_node.span(),
                format!("Expected '=' after '{name}'"),
            );
            return;
        };
        let Some(expr_node) = unit.child(SyntaxKind::Expression) else {
            let range = self.range(eq.span());
            self.push(expected_expression(range, "="));
            return;
        };
        match parse_expression(self.slice(expr_node)) {
            Ok(value) => {
                let range = self.line_range();
                self.out.content.push(Node::Variable(Variable {
                    name,
                    constant,
                    value,
                    range,
                }));
            }
            Err(err) => self.parse_error(err, expr_node.from()),
        }
    }

    pub(super) fn list(&mut self) {
        let unit = self.unit;
        let Some(name_node) = unit.child(SyntaxKind::Name).filter(|n| !n.span().is_empty()) else {
            let span = unit.child(SyntaxKind::Keyword).map_or(unit.span(), |k| k.span());
            self.error(ErrorCode::E1009, span, "Expected list name after 'LIST'");
            return;
        };
        let name = self.slice(name_node).to_string();
        let Some(items_node) = unit.child(SyntaxKind::ListItems) else {
            self.error(
                ErrorCode::E1009,
                name_node.span(),
                format!("Expected '= item, ...' after '{name}'"),
            );
            return;
        };
        let mut items = Vec::new();
        let mut next_value = 1i64;
        let mut offset = items_node.from();
        for raw in self.slice(items_node).split(',') {
            let span = Span::new(offset, offset + u32::try_from(raw.len()).unwrap_or(0));
            offset = span.end + 1;
            match parse_list_item(raw, next_value) {
                Ok(item) => {
                    next_value = item.value + 1;
                    items.push(item);
                }
                Err(message) => self.error(ErrorCode::E1009, span, message),
            }
        }
        let range = self.line_range();
        self.out.content.push(Node::List(ListDecl { name, items, range }));
    }

    pub(super) fn include(&mut self) {
        match self.unit.child(SyntaxKind::Path) {
            Some(path) => self.out.include = Some(self.slice(path).to_string()),
            None => {
                let span = self
                    .unit
                    .child(SyntaxKind::Keyword)
                    .map_or(self.unit.span(), |k| k.span());
                self.error(ErrorCode::E1011, span, "Expected file path after 'INCLUDE'");
            }
        }
    }

    pub(super) fn text_line(&mut self) {
        let (parts, divert) = self.inline_parts(self.unit);
        if parts.is_empty() && divert.is_none() {
            return;
        }
        let range = self.line_range();
        self.out.content.push(Node::Text(TextLine {
            parts,
            divert,
            range,
        }));
    }

    fn label(&mut self, node: SyntaxNode<'_>) -> Option<String> {
        if !has_closing_punct(node, 2) {
            let range = self.node_range(node);
            self.push(unclosed_delimiter(range, "(", ")"));
        }
        match node.child(SyntaxKind::LabelName) {
            Some(name) if !name.span().is_empty() => Some(self.slice(name).to_string()),
            _ => {
                self.error(ErrorCode::E1004, node.span(), "Expected label name");
                None
            }
        }
    }

    /// Parse the expression of a `{...}` node.
    fn braced_expression(&mut self, node: SyntaxNode<'_>) -> Option<Expr> {
        if !has_closing_punct(node, 2) {
            let range = self.node_range(node);
            self.push(unclosed_delimiter(range, "{", "}"));
            return None;
        }
        let Some(expr_node) = node.child(SyntaxKind::Expression) else {
            let range = self.node_range(node);
            self.push(expected_expression(range, "{"));
            return None;
        };
        match parse_expression(self.slice(expr_node)) {
            Ok(expr) => Some(expr),
            Err(err) => {
                self.parse_error(err, expr_node.from());
                None
            }
        }
    }

    fn divert_target(&mut self, clause: SyntaxNode<'_>) -> Option<String> {
        let target = clause
            .child(SyntaxKind::DivertTarget)
            .map(|t| self.slice(t).trim())
            .unwrap_or("");
        if target.is_empty() {
            let span = clause.child(SyntaxKind::Arrow).map_or(clause.span(), |a| a.span());
            self.error(ErrorCode::E1010, span, "Expected divert target after '->'");
            return None;
        }
        if !target.split('.').all(is_identifier) {
            self.error(
                ErrorCode::E1004,
                clause.span(),
                format!("Invalid divert target '{target}'"),
            );
            return None;
        }
        Some(target.to_string())
    }

    /// Text parts of `parent`'s direct children, plus a trailing divert.
    fn inline_parts(&mut self, parent: SyntaxNode<'_>) -> (Vec<TextPart>, Option<String>) {
        let mut parts: Vec<TextPart> = Vec::new();
        let mut divert = None;
        for node in parent.children() {
            match node.kind() {
                SyntaxKind::Text => {
                    let text = self.slice(node);
                    if let Some(TextPart::Literal(prev)) = parts.last_mut() {
                        prev.push_str(text);
                    } else {
                        parts.push(TextPart::Literal(text.to_string()));
                    }
                }
                SyntaxKind::AssetRef | SyntaxKind::AudioRef => {
                    let (open, close, what) = if node.kind() == SyntaxKind::AssetRef {
                        ("[[", "]]", "image")
                    } else {
                        ("((", "))", "audio")
                    };
                    if !has_closing_punct(node, 2) {
                        let range = self.node_range(node);
                        self.push(unclosed_delimiter(range, open, close));
                        continue;
                    }
                    let name = node
                        .child(SyntaxKind::AssetName)
                        .map(|n| self.slice(n).trim())
                        .unwrap_or("");
                    if name.is_empty() {
                        self.error(
                            ErrorCode::E1004,
                            node.span(),
                            format!("Expected {what} name inside '{open} {close}'"),
                        );
                        continue;
                    }
                    parts.push(if what == "image" {
                        TextPart::Image(name.to_string())
                    } else {
                        TextPart::Audio(name.to_string())
                    });
                }
                SyntaxKind::InlineExpr => {
                    if let Some(expr) = self.braced_expression(node) {
                        parts.push(TextPart::Expr(expr));
                    }
                }
                SyntaxKind::DivertClause => divert = self.divert_target(node),
                _ => {}
            }
        }
        if let Some(TextPart::Literal(last)) = parts.last_mut() {
            let trimmed = last.trim_end().len();
            last.truncate(trimmed);
            if last.is_empty() {
                parts.pop();
            }
        }
        (parts, divert)
    }
}

/// Number of bullet characters in a marker such as `* *` or `- -`.
fn bullet_depth(marker: &str, bullets: &[char]) -> u32 {
    let count = marker.chars().filter(|c| bullets.contains(c)).count();
    u32::try_from(count.max(1)).unwrap_or(1)
}

/// Whether a delimited node has both its opening and closing punctuation.
fn has_closing_punct(node: SyntaxNode<'_>, expected: usize) -> bool {
    node.children()
        .filter(|child| child.kind() == SyntaxKind::Punct)
        .count()
        >= expected
}

pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// `name`, `(name)` for an initially selected item, either with `= n`.
fn parse_list_item(raw: &str, default_value: i64) -> Result<ListItem, String> {
    let (item, value) = match raw.split_once('=') {
        Some((item, value)) => {
            let value = value.trim();
            let parsed = value
                .parse::<i64>()
                .map_err(|_| format!("Invalid list item value '{value}'"))?;
            (item.trim(), parsed)
        }
        None => (raw.trim(), default_value),
    };
    let (name, selected) = match item.strip_prefix('(').and_then(|i| i.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (item, false),
    };
    if name.is_empty() {
        return Err("Expected list item name".to_string());
    }
    if !is_identifier(name) {
        return Err(format!("Invalid list item name '{name}'"));
    }
    Ok(ListItem {
        name: name.to_string(),
        value,
        selected,
    })
}
