//! Error codes for all toolchain diagnostics.
//!
//! Format: E#### where the first digit indicates the phase:
//! - E1xxx: block parse/lowering errors
//! - E2xxx: reference validation
//! - E9xxx: internal errors

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Parse Errors (E1xxx)
    /// Unexpected token in an expression
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected identifier
    E1004,
    /// Malformed flow header
    E1005,
    /// Malformed choice or gather
    E1006,
    /// Malformed `define` block
    E1007,
    /// Malformed property value
    E1008,
    /// Malformed `LIST` declaration
    E1009,
    /// Missing divert target
    E1010,
    /// Missing `INCLUDE` path
    E1011,

    // Reference Errors (E2xxx)
    /// Selector did not resolve
    E2001,
    /// Resolved struct has an unexpected type
    E2002,
    /// Literal assignment has the wrong type
    E2003,
    /// Declaration reuses a reserved type name
    E2004,
    /// Divert target not found
    E2005,
    /// Cyclic struct reference
    E2006,

    // Internal Errors (E9xxx)
    /// Lowering or export of a block failed
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Short description, used by `tale explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "unexpected token in expression",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E1003 => "unclosed delimiter",
            ErrorCode::E1004 => "expected identifier",
            ErrorCode::E1005 => "malformed flow header",
            ErrorCode::E1006 => "malformed choice or gather",
            ErrorCode::E1007 => "malformed define block",
            ErrorCode::E1008 => "malformed property value",
            ErrorCode::E1009 => "malformed list declaration",
            ErrorCode::E1010 => "missing divert target",
            ErrorCode::E1011 => "missing include path",
            ErrorCode::E2001 => "unresolved reference",
            ErrorCode::E2002 => "reference has unexpected type",
            ErrorCode::E2003 => "literal has unexpected type",
            ErrorCode::E2004 => "reserved type name",
            ErrorCode::E2005 => "divert target not found",
            ErrorCode::E2006 => "cyclic reference",
            ErrorCode::E9001 => "internal lowering failure",
        }
    }

    pub fn is_parse_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_reference_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_CODES
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| format!("unknown error code: {s}"))
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

const ALL_CODES: &[ErrorCode] = &[
    ErrorCode::E1001,
    ErrorCode::E1002,
    ErrorCode::E1003,
    ErrorCode::E1004,
    ErrorCode::E1005,
    ErrorCode::E1006,
    ErrorCode::E1007,
    ErrorCode::E1008,
    ErrorCode::E1009,
    ErrorCode::E1010,
    ErrorCode::E1011,
    ErrorCode::E2001,
    ErrorCode::E2002,
    ErrorCode::E2003,
    ErrorCode::E2004,
    ErrorCode::E2005,
    ErrorCode::E2006,
    ErrorCode::E9001,
];
