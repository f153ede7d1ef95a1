//! The search pass: discovered streams → records → aggregation.
//!
//! [`SearchRun`] owns nothing but configuration. Every call to
//! [`SearchRun::run`] creates a fresh [`AggregationState`], reads the JSONL
//! streams in file-name order, then (optionally) the human-readable streams,
//! and hands the state back for reporting.
//!
//! Failures local to a line or a stream are logged and counted; only a
//! missing input directory stops the run.
//!
//! # Example
//!
//! ```no_run
//! use chatsift::config::SearchConfig;
//! use chatsift::core::classify::TermPatterns;
//! use chatsift::core::search::SearchRun;
//!
//! let patterns = TermPatterns::from_terms_file("terms.txt")?;
//! let state = SearchRun::new(&patterns, SearchConfig::default()).run("jsonl")?;
//! println!("{} documents", state.stats().documents_counted);
//! # Ok::<(), chatsift::ChatsiftError>(())
//! ```

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::core::aggregate::{AggregationState, StreamKind};
use crate::core::classify::TermPatterns;
use crate::core::record::SearchRecord;
use crate::error::Result;
use crate::progress::{Progress, ProgressCallback, no_progress};
use crate::streaming::{
    HumanPromptReader, JsonlReader, RecordIterator, StreamingConfig, discover_streams,
    stream_name, stream_stem,
};

/// Extension of canonical JSONL streams.
pub const JSONL_EXT: &str = "jsonl";
/// Extension of human-readable streams.
pub const HUMAN_EXT: &str = "txt";

/// Where a stream sits in the run, for progress reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamPosition {
    pub index: usize,
    pub total: usize,
}

/// Configuration for one search pass.
pub struct SearchRun<'a> {
    patterns: &'a TermPatterns,
    config: SearchConfig,
    streaming: StreamingConfig,
    progress: ProgressCallback,
}

impl<'a> SearchRun<'a> {
    pub fn new(patterns: &'a TermPatterns, config: SearchConfig) -> Self {
        Self {
            patterns,
            config,
            streaming: StreamingConfig::default(),
            progress: no_progress(),
        }
    }

    #[must_use]
    pub fn with_streaming(mut self, streaming: StreamingConfig) -> Self {
        self.streaming = streaming;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn patterns(&self) -> &TermPatterns {
        self.patterns
    }

    /// A fresh state configured for this run.
    pub fn new_state(&self) -> AggregationState {
        AggregationState::new(self.config.mode).with_details(self.config.collect_details)
    }

    /// Runs the full pass over `jsonl_dir` (and the human directory, if configured).
    pub fn run(&self, jsonl_dir: impl AsRef<Path>) -> Result<AggregationState> {
        let jsonl = discover_streams(jsonl_dir.as_ref(), JSONL_EXT)?;
        let human = match &self.config.scan_human_dir {
            Some(dir) => discover_streams(dir, HUMAN_EXT)?,
            None => Vec::new(),
        };
        let total = jsonl.len() + human.len();
        info!(
            jsonl = jsonl.len(),
            human = human.len(),
            mode = ?self.config.mode,
            "starting search"
        );

        let mut state = self.new_state();

        for (index, path) in jsonl.iter().enumerate() {
            let name = stream_name(path);
            match JsonlReader::open(path, self.streaming) {
                Ok(reader) => {
                    self.ingest_jsonl(&mut state, &name, reader, StreamPosition { index, total });
                }
                Err(e) => warn!(stream = %name, error = %e, "cannot open stream, skipped"),
            }
        }

        for (offset, path) in human.iter().enumerate() {
            let name = stream_name(path);
            let position = StreamPosition {
                index: jsonl.len() + offset,
                total,
            };
            match HumanPromptReader::open(path, self.streaming) {
                Ok(reader) => {
                    self.ingest_human(&mut state, &name, &stream_stem(path), reader, position);
                }
                Err(e) => warn!(stream = %name, error = %e, "cannot open stream, skipped"),
            }
        }

        let stats = state.stats();
        info!(
            streams = stats.streams,
            counted = stats.documents_counted,
            duplicates = stats.duplicates_skipped,
            malformed = stats.malformed_lines,
            "search finished"
        );
        Ok(state)
    }

    /// Ingests one JSONL stream into `state`.
    pub fn ingest_jsonl<I>(
        &self,
        state: &mut AggregationState,
        name: &str,
        mut items: I,
        position: StreamPosition,
    ) where
        I: RecordIterator<Value>,
    {
        state.begin_stream(name, StreamKind::Jsonl);
        self.report(&items, position, 0, false);

        let mut lines = 0usize;
        while let Some(item) = items.next() {
            match item {
                Ok(line) => {
                    state.note_line();
                    let record = SearchRecord::from_value(&line.value, name, line.line_no);
                    state.offer(&record, self.patterns);
                }
                Err(e) if e.is_line_level() => {
                    state.note_line();
                    state.note_malformed();
                    debug!(stream = name, error = %e, "malformed line skipped");
                }
                Err(e) => {
                    warn!(stream = name, error = %e, "read failed, stream truncated");
                    break;
                }
            }
            lines += 1;
            if self.streaming.progress_interval > 0 && lines % self.streaming.progress_interval == 0 {
                self.report(&items, position, lines, false);
            }
        }
        self.report(&items, position, lines, true);
    }

    /// Ingests one human-readable stream into `state`, grouped under `group`.
    pub fn ingest_human<I>(
        &self,
        state: &mut AggregationState,
        name: &str,
        group: &str,
        mut items: I,
        position: StreamPosition,
    ) where
        I: RecordIterator<String>,
    {
        state.begin_stream(name, StreamKind::Human);
        self.report(&items, position, 0, false);

        let mut prompts = 0usize;
        while let Some(item) = items.next() {
            match item {
                Ok(line) => {
                    let record = SearchRecord::from_human_prompt(&line.value, group, name, line.line_no);
                    state.ingest_human(&record, self.patterns);
                    prompts += 1;
                }
                Err(e) if e.is_line_level() => {
                    debug!(stream = name, error = %e, "human line skipped");
                }
                Err(e) => {
                    warn!(stream = name, error = %e, "read failed, stream truncated");
                    break;
                }
            }
        }
        self.report(&items, position, prompts, true);
    }

    fn report<T>(
        &self,
        items: &impl RecordIterator<T>,
        position: StreamPosition,
        lines: usize,
        done: bool,
    ) {
        let mut progress = Progress::new(position.index, position.total)
            .with_bytes(items.bytes_processed(), items.total_bytes())
            .with_lines(lines);
        if done {
            progress = progress.done();
        }
        (self.progress)(progress);
    }
}
