//! Core diagnostic types.
//!
//! Diagnostics are plain data with a builder API. Blocks produce them with
//! block-relative ranges; the compiler shifts them into file coordinates
//! with [`Diagnostic::offset_lines`] before they reach the host.

use serde::Serialize;
use std::fmt;
use tale_ir::Range;

use crate::ErrorCode;

/// Source tag attached to every diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "tale";

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
        }
    }
}

/// A location elsewhere that explains a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedInformation {
    pub uri: String,
    pub range: Range,
    pub message: String,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<RelatedInformation>,
    pub source: &'static str,
    /// Raised inside text the toolchain synthesized; never shown to authors.
    #[serde(skip)]
    pub suppressed: bool,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            range: Range::default(),
            related_information: Vec::new(),
            source: DIAGNOSTIC_SOURCE,
            suppressed: false,
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    #[cold]
    pub fn information(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Information)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    pub fn with_related(
        mut self,
        uri: impl Into<String>,
        range: Range,
        message: impl Into<String>,
    ) -> Self {
        self.related_information.push(RelatedInformation {
            uri: uri.into(),
            range,
            message: message.into(),
        });
        self
    }

    /// Mark as raised inside synthesized text.
    pub fn suppressed(mut self) -> Self {
        self.suppressed = true;
        self
    }

    /// Shift the range down by `lines` (block-relative → file coordinates).
    pub fn offset_lines(mut self, lines: u32) -> Self {
        self.range = self.range.offset_lines(lines);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}:{}: {}",
            self.severity,
            self.code,
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.message
        )
    }
}

/// `Expected expression` at `range`.
#[cold]
pub fn expected_expression(range: Range, after: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("Expected expression after '{after}'"))
        .with_range(range)
}

/// `Unclosed 'open'` at `range`.
#[cold]
pub fn unclosed_delimiter(range: Range, open: &str, close: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1003)
        .with_message(format!("Unclosed '{open}': expected '{close}'"))
        .with_range(range)
}
