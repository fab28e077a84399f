//! Typed error taxonomy for the pipeline core.
//!
//! Mirrors the shape of this codebase's error framework (a `thiserror`-backed
//! `Error` wrapping a classifying `ErrorCode`) but scoped to the categories
//! the pipeline actually raises across its own boundaries: I/O, parsing,
//! storage, configuration, and rule evaluation.

use thiserror::Error as ThisError;

/// Coarse classification of a failure, used for logging and by callers that
/// need to branch on cause without string inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Io,
    Parse,
    Database,
    Config,
    RuleEvaluation,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::Io => "IO",
            ErrorCode::Parse => "PARSE",
            ErrorCode::Database => "DATABASE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::RuleEvaluation => "RULE_EVALUATION",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, ThisError)]
#[error("[{code}] {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        code: ErrorCode,
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Io, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Database, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    pub fn rule_evaluation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RuleEvaluation, message)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::with_cause(ErrorCode::Io, e.to_string(), e)
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::with_cause(ErrorCode::Database, e.to_string(), e)
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::with_cause(ErrorCode::Config, e.to_string(), e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
