//! Diagnostic system for the Tale toolchain.
//!
//! - Error codes for searchability ([`ErrorCode`])
//! - Structured diagnostics with a builder API ([`Diagnostic`])
//! - Line/offset conversion for documents ([`LineIndex`])
//! - A per-document collection with dedup and deterministic order
//!   ([`DiagnosticSink`])

mod diagnostic;
mod error_code;
pub mod line_index;
pub mod sink;

pub use diagnostic::{
    expected_expression, unclosed_delimiter, Diagnostic, RelatedInformation, Severity,
    DIAGNOSTIC_SOURCE,
};
pub use error_code::ErrorCode;
pub use line_index::LineIndex;
pub use sink::DiagnosticSink;
