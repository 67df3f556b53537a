//! Error types for the parser front-end

use serde::Serialize;
use thiserror::Error;

use crate::lexer::Span;

/// Classification of a parse failure.
///
/// Every kind except [`ErrorKind::Lexical`] is a syntax-level early error
/// raised by the grammar engine; `Lexical` errors come from the scanner and
/// are propagated through the parser unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    UnexpectedToken,
    InvalidDestructuringTarget,
    InvalidLeftHandSide,
    InvalidForHead,
    DuplicateBinding,
    StrictModeViolation,
    IllegalFunctionInStatementPosition,
    ReservedWordUsage,
    /// `return`, `break`, `continue` or a label used where no target exists.
    InvalidControlFlow,
    /// A module exports a local name that is never declared.
    UndefinedExport,
    Lexical,
}

impl ErrorKind {
    /// Error category shown in front of the message.
    pub fn category(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "LexicalError",
            _ => "SyntaxError",
        }
    }
}

/// Source location information for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Byte offset of the offending token.
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The first grammar violation found in a source text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}: {message} at {location}", .kind.category())]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            kind,
            message: message.into(),
            location: SourceLocation {
                offset: span.start,
                line: span.line,
                column: span.column,
            },
        }
    }

    pub fn lexical(message: impl Into<String>, offset: usize, line: u32, column: u32) -> Self {
        ParseError {
            kind: ErrorKind::Lexical,
            message: message.into(),
            location: SourceLocation {
                offset,
                line,
                column,
            },
        }
    }

    /// Reclassify the error if it currently has kind `from`.
    pub fn recast(mut self, from: ErrorKind, to: ErrorKind) -> Self {
        if self.kind == from {
            self.kind = to;
        }
        self
    }
}
