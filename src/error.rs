use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid UTF-8 input: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("missing environment variable `{key}`")]
    MissingVar { key: String },
    #[error("invalid value for `{key}`: `{value}` is not a valid {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// A malformed assignment, reported with the 1-based position it was found at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line: u32, column: u32, kind: ParseErrorKind) -> Self {
        Self { line, column, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidSyntax,
    MissingKey,
    InvalidKey,
    UnterminatedQuote,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSyntax => write!(f, "invalid syntax"),
            Self::MissingKey => write!(f, "missing key"),
            Self::InvalidKey => write!(f, "invalid key"),
            Self::UnterminatedQuote => write!(f, "unterminated quote"),
        }
    }
}

/// A write the process environment would reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("invalid environment key `{0}`")]
    InvalidKey(String),
    #[error("invalid value for environment key `{0}`: contains NUL")]
    InvalidValue(String),
}
