//! Error taxonomy for the matching engine.
//!
//! Each variant corresponds to exactly one of the error kinds in the
//! engine's propagation policy: tokenization and parse errors are fatal to
//! the whole run, evaluation errors are non-fatal per pattern, file-handling
//! and record-size errors are non-fatal per file, and configuration errors
//! are fatal before any work starts.

use std::path::PathBuf;

use thiserror::Error;

/// The single error type threaded through the matching engine.
#[derive(Debug, Error)]
pub enum LogsiftError {
    /// Malformed query: unterminated quote, empty input.
    #[error("{message}\n  {expression}\n  {pointer}")]
    Tokenization {
        message: String,
        expression: String,
        pointer: String,
        position: usize,
    },

    /// Grammar violation: unbalanced parens, missing operand, trailing tokens.
    #[error("{message}\n  {expression}\n  {pointer}")]
    Parse {
        message: String,
        expression: String,
        pointer: String,
        position: usize,
    },

    /// Malformed regex pattern encountered during evaluation.
    #[error("invalid regex pattern '{pattern}': {source}")]
    Evaluation {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Invalid CLI/config-file values, nonexistent path, invalid worker count.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Open failure, read error, permission denied, decode failure, invalid gzip.
    #[error("{message}: {path}")]
    FileHandling { message: String, path: PathBuf },

    /// A single record exceeded the configured byte cap.
    #[error("record size {size_kb:.2}KB exceeds limit of {max_size_kb}KB")]
    RecordSizeExceeded { size_kb: f64, max_size_kb: u64 },

    /// Operator cancellation (SIGINT).
    #[error("interrupted")]
    Interrupted,

    /// Anything that doesn't map to one of the above during worker execution.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl LogsiftError {
    /// Builds a [`LogsiftError::Tokenization`] with a caret pointing at `position`.
    pub fn tokenization(message: impl Into<String>, expression: &str, position: usize) -> Self {
        let message = message.into();
        let pointer = " ".repeat(position) + "^";
        Self::Tokenization {
            message,
            expression: expression.to_string(),
            pointer,
            position,
        }
    }

    /// Builds a [`LogsiftError::Parse`] with a caret pointing at `position`.
    pub fn parse(message: impl Into<String>, expression: &str, position: usize) -> Self {
        let message = message.into();
        let pointer = " ".repeat(position) + "^";
        Self::Parse {
            message,
            expression: expression.to_string(),
            pointer,
            position,
        }
    }

    /// Maps this error to the process exit code it should produce.
    ///
    /// 0 is never returned here: a successful run never constructs an error
    /// in the first place.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => 130,
            Self::Tokenization { .. } | Self::Parse { .. } | Self::Configuration(_) => 2,
            Self::Evaluation { .. }
            | Self::FileHandling { .. }
            | Self::RecordSizeExceeded { .. }
            | Self::Unexpected(_) => 1,
        }
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, LogsiftError>;
