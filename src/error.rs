use crate::lexer::TokenKind;
use crate::types::ValueKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The stage of the pipeline an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Lexical,
    Syntactic,
    Runtime,
}

/// Every failure the pipeline can report. Positions are 1-based character
/// offsets into the formula text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("unknown comparison '{op}' at position {position}")]
    InvalidComparison { op: String, position: usize },

    #[error("invalid syntax at position {position} (expected {expected}, got {found})")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        position: usize,
    },

    #[error("variable '{name}' not found at position {position}")]
    UnknownVariable { name: String, position: usize },

    #[error("function '{name}' not found at position {position}")]
    UnknownFunction { name: String, position: usize },

    #[error("operator '{op}' expected {expected}, got {found} at position {position}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: ValueKind,
        position: usize,
    },

    #[error("division by zero at position {position}")]
    DivisionByZero { position: usize },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("expression nested deeper than {limit} levels at position {position}")]
    NestingTooDeep { limit: usize, position: usize },

    #[error("{message}")]
    Function { message: String },

    #[error("invalid JSON variables: {0}")]
    Json(String),
}

impl Error {
    /// Error raised by a registered function.
    pub fn new<M: Into<String>>(message: M) -> Self {
        Error::Function { message: message.into() }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Error::UnexpectedChar { .. } | Error::InvalidComparison { .. } => ErrorClass::Lexical,
            Error::UnexpectedToken { .. } => ErrorClass::Syntactic,
            // NestingTooDeep is a resource limit even when the parser raises it.
            Error::UnknownVariable { .. }
            | Error::UnknownFunction { .. }
            | Error::TypeMismatch { .. }
            | Error::DivisionByZero { .. }
            | Error::InvalidNumber { .. }
            | Error::NestingTooDeep { .. }
            | Error::Function { .. }
            | Error::Json(_) => ErrorClass::Runtime,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Error::UnexpectedChar { position, .. }
            | Error::InvalidComparison { position, .. }
            | Error::UnexpectedToken { position, .. }
            | Error::UnknownVariable { position, .. }
            | Error::UnknownFunction { position, .. }
            | Error::TypeMismatch { position, .. }
            | Error::DivisionByZero { position }
            | Error::InvalidNumber { position, .. }
            | Error::NestingTooDeep { position, .. } => Some(*position),
            Error::Function { .. } | Error::Json(_) => None,
        }
    }
}
