//! Error types for line-oriented stream readers.

use std::io;

use thiserror::Error;

/// Result type for streaming operations.
pub type StreamingResult<T> = Result<T, StreamingError>;

/// Errors a stream reader yields.
///
/// Everything except [`StreamingError::Io`] is local to one line: the reader
/// keeps going after yielding it, and callers count and skip it.
#[derive(Debug, Error)]
pub enum StreamingError {
    /// IO error while reading; the stream ends after this.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The line is not valid JSON.
    #[error("line {line_no}: JSON error: {source}")]
    Json {
        line_no: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The line is valid JSON but not an object.
    #[error("line {line_no}: expected a JSON object")]
    NotAnObject { line_no: usize },

    /// The line exceeds the configured maximum.
    #[error("line {line_no}: line too large: {actual_size} bytes (max: {max_size})")]
    LineTooLong {
        line_no: usize,
        max_size: usize,
        actual_size: usize,
    },
}

impl StreamingError {
    /// Line number of a line-level error, `None` for IO errors.
    pub fn line_no(&self) -> Option<usize> {
        match self {
            StreamingError::Io(_) => None,
            StreamingError::Json { line_no, .. }
            | StreamingError::NotAnObject { line_no }
            | StreamingError::LineTooLong { line_no, .. } => Some(*line_no),
        }
    }

    /// Returns `true` if the reader continues after this error.
    pub fn is_line_level(&self) -> bool {
        !matches!(self, StreamingError::Io(_))
    }
}

impl From<StreamingError> for crate::error::ChatsiftError {
    fn from(err: StreamingError) -> Self {
        match err {
            StreamingError::Io(e) => crate::error::ChatsiftError::Io(e),
            StreamingError::Json { source, .. } => crate::error::ChatsiftError::Json(source),
            other => crate::error::ChatsiftError::invalid_format("JSONL", other.to_string()),
        }
    }
}
