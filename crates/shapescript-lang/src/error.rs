use std::fmt;

use thiserror::Error;

/// Syntax error codes prefixed by phase: L = lexer, P = parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // invalid escape sequence
    L004, // malformed hex color

    // Parser
    P001, // unexpected token
    P002, // missing expected token
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::L004 => "L004",
            Self::P001 => "P001",
            Self::P002 => "P002",
        }
    }
}

/// A located lexer or parser failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}:{}: {}", self.code.as_str(), self.line, self.column, self.message)
    }
}

// ─── Unified error ───────────────────────────────────────────────────────────

/// What kind of binding a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Parameter,
    Shape,
    Layer,
    Function,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parameter => "Parameter",
            Self::Shape     => "Shape",
            Self::Layer     => "Layer",
            Self::Function  => "Function",
        })
    }
}

/// Every failure a run can produce. All of them propagate to the run
/// orchestrator, which turns them into a failed `RunOutcome`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Lex error {0}")]
    Lex(SyntaxError),

    #[error("Parse error {0}")]
    Parse(SyntaxError),

    #[error("{kind} '{name}' not found")]
    Name { kind: NameKind, name: String },

    #[error("Function '{function}' expects {expected} arguments, got {found}")]
    Arity { function: String, expected: usize, found: usize },

    #[error("{0}")]
    Arithmetic(String),

    #[error("{0}")]
    Value(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Polygon clipping library not available")]
    BackendUnavailable,
}

impl Error {
    pub fn name(kind: NameKind, name: impl Into<String>) -> Self {
        Self::Name { kind, name: name.into() }
    }

    pub fn division_by_zero() -> Self {
        Self::Arithmetic("Division by zero".into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Source location, present for lexer and parser errors only.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Lex(e) | Self::Parse(e) => Some((e.line, e.column)),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
