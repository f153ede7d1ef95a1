//! Unified error types for chatsift.
//!
//! This module provides a single [`ChatsiftError`] enum that covers every
//! error the library surfaces. Errors are reserved for configuration-level and
//! I/O failures: problems local to a single line or document (malformed JSON,
//! unparsable timestamps, duplicate ids) are counted and logged instead.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Developers** get source error chains for debugging

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatsift operations.
///
/// # Example
///
/// ```rust
/// use chatsift::error::Result;
/// use chatsift::CanonicalDocument;
///
/// fn my_function() -> Result<Vec<CanonicalDocument>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatsiftError>;

/// The error type for all chatsift operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatsiftError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - An input file or directory doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing reports)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A user-supplied search pattern failed to compile.
    ///
    /// This is a configuration-level error: it is raised before any
    /// ingestion begins.
    #[error("Invalid pattern for term '{label}': {source}")]
    InvalidPattern {
        /// The category label the pattern was declared under
        label: String,
        /// The underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// A category was declared under a label the reports reserve for
    /// their fixed rows (`Multiple`, `Other (no-term)`).
    #[error("Term label '{label}' is reserved")]
    ReservedLabel {
        /// The rejected label
        label: String,
    },

    /// The input doesn't match the expected structure.
    ///
    /// This occurs when:
    /// - A raw export has no recognizable group list
    /// - A terms file line cannot be interpreted
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// A group-name map file could not be used.
    #[error("Invalid group map{}: {message}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    InvalidGroupMap {
        /// The file that was being loaded, if any
        path: Option<PathBuf>,
        /// Description of what's wrong
        message: String,
    },

    /// A required input directory is missing.
    #[error("Input directory not found: {}", path.display())]
    MissingInput {
        /// The directory that was expected
        path: PathBuf,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatsiftError {
    /// Creates an invalid pattern error.
    pub fn invalid_pattern(label: impl Into<String>, source: regex::Error) -> Self {
        ChatsiftError::InvalidPattern {
            label: label.into(),
            source,
        }
    }

    /// Creates a reserved label error.
    pub fn reserved_label(label: impl Into<String>) -> Self {
        ChatsiftError::ReservedLabel {
            label: label.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatsiftError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates an invalid group map error.
    pub fn invalid_group_map(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        ChatsiftError::InvalidGroupMap {
            path,
            message: message.into(),
        }
    }

    /// Creates a missing input directory error.
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        ChatsiftError::MissingInput { path: path.into() }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatsiftError::Io(_))
    }

    /// Returns `true` if this is an invalid pattern error.
    pub fn is_invalid_pattern(&self) -> bool {
        matches!(self, ChatsiftError::InvalidPattern { .. })
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChatsiftError::InvalidFormat { .. })
    }

    /// Returns `true` if this error should stop a run before ingestion.
    ///
    /// Configuration-level errors are the only fatal class; everything
    /// else is contained at the line or document level.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ChatsiftError::InvalidPattern { .. }
                | ChatsiftError::ReservedLabel { .. }
                | ChatsiftError::InvalidGroupMap { .. }
                | ChatsiftError::MissingInput { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_regex() -> regex::Error {
        regex::Regex::new("(unclosed").unwrap_err()
    }

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ChatsiftError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
        assert!(err.is_io());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_invalid_pattern_display() {
        let err = ChatsiftError::invalid_pattern("billing", bad_regex());
        let display = err.to_string();
        assert!(display.contains("billing"));
        assert!(err.is_invalid_pattern());
        assert!(err.is_configuration());
    }

    #[test]
    fn test_reserved_label_display() {
        let err = ChatsiftError::reserved_label("Multiple");
        assert_eq!(err.to_string(), "Term label 'Multiple' is reserved");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_group_map_with_path() {
        let err = ChatsiftError::invalid_group_map(
            Some(PathBuf::from("/tmp/map.xml")),
            "unsupported extension",
        );
        let display = err.to_string();
        assert!(display.contains("/tmp/map.xml"));
        assert!(display.contains("unsupported extension"));
    }

    #[test]
    fn test_invalid_group_map_without_path() {
        let err = ChatsiftError::invalid_group_map(None, "empty");
        assert_eq!(err.to_string(), "Invalid group map: empty");
    }

    #[test]
    fn test_invalid_format_display() {
        let err = ChatsiftError::invalid_format("raw export", "no groups found");
        assert!(err.is_invalid_format());
        assert!(err.to_string().contains("raw export"));
    }

    #[test]
    fn test_missing_input_display() {
        let err = ChatsiftError::missing_input("jsonl");
        assert!(err.to_string().contains("jsonl"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let err = ChatsiftError::invalid_pattern("x", bad_regex());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ChatsiftError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_from_csv_error() {
        let csv_err = csv::Error::from(io::Error::other("test"));
        let err: ChatsiftError = csv_err.into();
        assert!(err.to_string().contains("CSV error"));
    }
}
