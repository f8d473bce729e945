//! Structured error types for loading and parsing configuration.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Structural parse errors
    OrphanParameter,
    EmptyParameterName,

    // Source errors
    SourceNotFound,
    SourceUnreadable,
}

/// A line of source text that cannot be placed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Assignment seen before any `[group]` header.
    #[error("line {line}: parameter assignment outside of any group: {text}")]
    OrphanParameter { line: usize, text: String },

    /// Assignment with nothing left of the `=` separator.
    #[error("line {line}: missing parameter name: {text}")]
    EmptyParameterName { line: usize, text: String },
}

impl ParseError {
    /// 1-based line number of the offending line.
    pub fn line(&self) -> usize {
        match self {
            ParseError::OrphanParameter { line, .. }
            | ParseError::EmptyParameterName { line, .. } => *line,
        }
    }
}

/// The configuration source could not provide its content.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("configuration source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read configuration source: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Classify an I/O failure on `path`.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound { path }
        } else {
            SourceError::Read { path, source: err }
        }
    }
}

/// Errors returned by a configuration load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::Parse(ParseError::OrphanParameter { .. }) => ErrorCode::OrphanParameter,
            ConfigError::Parse(ParseError::EmptyParameterName { .. }) => {
                ErrorCode::EmptyParameterName
            }
            ConfigError::Source(SourceError::NotFound { .. }) => ErrorCode::SourceNotFound,
            ConfigError::Source(SourceError::Read { .. }) => ErrorCode::SourceUnreadable,
        }
    }
}

/// Serializable error body for machine-readable output.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl From<&ConfigError> for ErrorReport {
    fn from(err: &ConfigError) -> Self {
        let line = match err {
            ConfigError::Parse(parse) => Some(parse.line()),
            ConfigError::Source(_) => None,
        };
        Self {
            code: err.code(),
            message: err.to_string(),
            line,
        }
    }
}

/// Result type for configuration loads.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
