//! Core traits for stream readers.
//!
//! - [`RecordIterator`] - Iterator with progress tracking
//! - [`StreamingConfig`] - Configuration options

use super::StreamingResult;

/// One item read from a stream, tagged with its 1-based physical line number.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<T> {
    pub line_no: usize,
    pub value: T,
}

/// Iterator over lines of a stream with progress tracking.
///
/// Extends the standard [`Iterator`] trait with methods for monitoring
/// progress, useful for progress reporting and logging.
///
/// # Object Safety
///
/// This trait is object-safe, enabling dynamic dispatch via `Box<dyn RecordIterator<T>>`.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> chatsift::Result<()> {
/// use chatsift::streaming::{JsonlReader, RecordIterator, StreamingConfig};
///
/// let mut reader = JsonlReader::open("jsonl/chats_export.jsonl", StreamingConfig::default())?;
///
/// while let Some(result) = reader.next() {
///     if let Ok(line) = result {
///         println!("{}: {}", line.line_no, line.value);
///     }
///     if let Some(pct) = reader.progress() {
///         eprintln!("\r{:.1}%", pct);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub trait RecordIterator<T>: Iterator<Item = StreamingResult<Line<T>>> {
    /// Returns approximate progress as a percentage (0.0 to 100.0).
    ///
    /// Returns `None` if progress cannot be determined (e.g., unknown size).
    fn progress(&self) -> Option<f64> {
        let total = self.total_bytes()?;
        if total == 0 {
            return None;
        }
        Some((self.bytes_processed() as f64 / total as f64) * 100.0)
    }

    /// Returns the number of bytes processed so far.
    fn bytes_processed(&self) -> u64;

    /// Returns the total stream size in bytes, if known.
    fn total_bytes(&self) -> Option<u64> {
        None
    }
}

/// Configuration options for stream readers.
///
/// # Examples
///
/// ```
/// use chatsift::streaming::StreamingConfig;
///
/// let config = StreamingConfig::new()
///     .with_buffer_size(128 * 1024)
///     .with_max_line_size(1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StreamingConfig {
    /// Buffer size for file reading.
    ///
    /// Default: 64KB.
    pub buffer_size: usize,

    /// Maximum size of a single line in bytes.
    ///
    /// Default: 10MB. Longer lines are reported as line-level errors.
    pub max_line_size: usize,

    /// Report progress every N lines.
    ///
    /// Default: 10,000.
    pub progress_interval: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            max_line_size: 10 * 1024 * 1024,
            progress_interval: 10_000,
        }
    }
}

impl StreamingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    #[must_use]
    pub fn with_max_line_size(mut self, size: usize) -> Self {
        self.max_line_size = size;
        self
    }

    /// Sets the progress reporting interval. Zero disables interval reports.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_config_default() {
        let config = StreamingConfig::default();
        assert_eq!(config.buffer_size, 64 * 1024);
        assert_eq!(config.max_line_size, 10 * 1024 * 1024);
        assert_eq!(config.progress_interval, 10_000);
    }

    #[test]
    fn test_streaming_config_builder_chain() {
        let config = StreamingConfig::new()
            .with_buffer_size(256 * 1024)
            .with_max_line_size(1024)
            .with_progress_interval(0);

        assert_eq!(config.buffer_size, 256 * 1024);
        assert_eq!(config.max_line_size, 1024);
        assert_eq!(config.progress_interval, 0);
    }
}
