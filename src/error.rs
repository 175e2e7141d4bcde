//! Error types for the review engine and the application around it.
//!
//! The engine itself reports [`ReviewError`], a closed taxonomy that callers
//! can match on. The CLI layer works with [`AppError`] and converts engine
//! errors at the boundary.

pub use masterror::{AppError, AppResult};

use crate::{advisor::RuleType, ast::StatementKind, parser::Engine};

/// Coarse grouping of [`ReviewError`] variants for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input text does not conform to the dialect grammar
    Syntax,
    /// Requested rule cannot run for the engine
    Configuration,
    /// Programming or integration bug
    Internal,
    /// Statement kind is not allowed in the requested context
    Validation
}

/// Errors produced by parsing, checking, extraction and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    /// Text does not derive a tree in the engine's grammar.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        engine:  Engine,
        line:    usize,
        column:  usize,
        message: String
    },

    /// No advisor is registered for the (engine, rule) pair.
    #[error("rule \"{rule}\" is not supported for {engine}")]
    UnsupportedRule { engine: Engine, rule: RuleType },

    /// A second advisor was registered under an occupied key.
    #[error("advisor for rule \"{rule}\" is already registered for {engine}")]
    DuplicateAdvisor { engine: Engine, rule: RuleType },

    /// Rule payload is missing fields or malformed.
    #[error("invalid payload for rule \"{rule}\": {message}")]
    InvalidPayload { rule: RuleType, message: String },

    /// A component received a value of an unexpected shape.
    #[error("internal error: {0}")]
    Internal(String),

    /// Statement kind is disallowed in a read-only context.
    #[error("{kind} statement at line {line} is not allowed in a read-only context")]
    Disallowed { kind: StatementKind, line: usize }
}

impl ReviewError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax {
                ..
            } => ErrorCategory::Syntax,
            Self::UnsupportedRule {
                ..
            }
            | Self::InvalidPayload {
                ..
            } => ErrorCategory::Configuration,
            Self::DuplicateAdvisor {
                ..
            }
            | Self::Internal(_) => ErrorCategory::Internal,
            Self::Disallowed {
                ..
            } => ErrorCategory::Validation
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err.category() {
            ErrorCategory::Internal => AppError::internal(err.to_string()),
            ErrorCategory::Syntax | ErrorCategory::Configuration | ErrorCategory::Validation => {
                AppError::bad_request(err.to_string())
            }
        }
    }
}

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}
