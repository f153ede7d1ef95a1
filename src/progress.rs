//! Progress reporting for search runs.
//!
//! A callback receives a [`Progress`] at the start of every stream, every
//! `progress_interval` lines, and when a stream ends.
//!
//! # Example
//!
//! ```rust
//! use chatsift::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("stream {}/{}: {:.1}%", progress.stream_index + 1, progress.total_streams, pct);
//!     }
//! });
//!
//! callback(Progress::new(0, 2).with_bytes(500, Some(1000)));
//! ```

use std::sync::Arc;

/// Progress of one run, positioned within one stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    /// Zero-based index of the current stream.
    pub stream_index: usize,

    /// Number of streams in the run.
    pub total_streams: usize,

    /// Bytes of the current stream processed so far.
    pub bytes_processed: u64,

    /// Size of the current stream, if known.
    pub total_bytes: Option<u64>,

    /// Lines of the current stream processed so far.
    pub lines_processed: usize,

    /// Whether the current stream has been fully read.
    pub stream_done: bool,
}

impl Progress {
    pub fn new(stream_index: usize, total_streams: usize) -> Self {
        Self {
            stream_index,
            total_streams,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bytes(mut self, processed: u64, total: Option<u64>) -> Self {
        self.bytes_processed = processed;
        self.total_bytes = total;
        self
    }

    #[must_use]
    pub fn with_lines(mut self, lines: usize) -> Self {
        self.lines_processed = lines;
        self
    }

    #[must_use]
    pub fn done(mut self) -> Self {
        self.stream_done = true;
        self
    }

    /// Progress through the current stream as a percentage (0.0 - 100.0).
    ///
    /// ```rust
    /// use chatsift::progress::Progress;
    ///
    /// assert_eq!(Progress::new(0, 1).with_bytes(500, Some(1000)).percentage(), Some(50.0));
    /// assert_eq!(Progress::new(0, 1).with_bytes(500, None).percentage(), None);
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.bytes_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Progress through the run, counting finished streams.
    pub fn streams_percentage(&self) -> Option<f64> {
        if self.total_streams == 0 {
            return None;
        }
        let done = self.stream_index + usize::from(self.stream_done);
        Some((done as f64 / self.total_streams as f64) * 100.0)
    }
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// A no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// A progress callback that prints finished streams to stderr.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress| {
        if progress.stream_done {
            eprintln!(
                "Progress: {}/{} streams ({} lines)",
                progress.stream_index + 1,
                progress.total_streams,
                progress.lines_processed
            );
        }
    })
}
