//! Reader for human-readable exports.
//!
//! Only `Prompt:` lines are of interest; everything else in the file is
//! presentation. Matching is case-insensitive and tolerates whitespace
//! around the label and the colon.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

use super::{Line, RecordIterator, StreamingConfig, StreamingError, StreamingResult};

static PROMPT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*prompt\s*:\s*(.+)$").expect("valid prompt line regex"));

/// Extracts the prompt text from a `Prompt: ...` line.
///
/// ```
/// use chatsift::streaming::extract_prompt_line;
///
/// assert_eq!(extract_prompt_line("  Prompt : hello "), Some("hello"));
/// assert_eq!(extract_prompt_line("PROMPT:x"), Some("x"));
/// assert_eq!(extract_prompt_line("Response: hi"), None);
/// assert_eq!(extract_prompt_line("Prompt:   "), None);
/// ```
pub fn extract_prompt_line(line: &str) -> Option<&str> {
    let caps = PROMPT_LINE.captures(line.trim_end())?;
    let text = caps.get(1)?.as_str().trim();
    (!text.is_empty()).then_some(text)
}

/// Yields the prompt of every `Prompt:` line in a stream.
pub struct HumanPromptReader<R: BufRead> {
    reader: R,
    config: StreamingConfig,
    total_bytes: Option<u64>,
    bytes_read: u64,
    line_no: usize,
    buffer: Vec<u8>,
    finished: bool,
}

impl HumanPromptReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, config: StreamingConfig) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        let mut reader =
            Self::from_reader(BufReader::with_capacity(config.buffer_size, file), config);
        reader.total_bytes = Some(size);
        Ok(reader)
    }
}

impl<R: BufRead> HumanPromptReader<R> {
    pub fn from_reader(reader: R, config: StreamingConfig) -> Self {
        Self {
            reader,
            config,
            total_bytes: None,
            bytes_read: 0,
            line_no: 0,
            buffer: Vec::with_capacity(1024),
            finished: false,
        }
    }
}

impl<R: BufRead> RecordIterator<String> for HumanPromptReader<R> {
    fn bytes_processed(&self) -> u64 {
        self.bytes_read
    }

    fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }
}

impl<R: BufRead> Iterator for HumanPromptReader<R> {
    type Item = StreamingResult<Line<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(n) => {
                    self.bytes_read += n as u64;
                    self.line_no += 1;
                    if n > self.config.max_line_size {
                        return Some(Err(StreamingError::LineTooLong {
                            line_no: self.line_no,
                            max_size: self.config.max_line_size,
                            actual_size: n,
                        }));
                    }
                    let text = String::from_utf8_lossy(&self.buffer);
                    if let Some(prompt) = extract_prompt_line(&text) {
                        return Some(Ok(Line {
                            line_no: self.line_no,
                            value: prompt.to_string(),
                        }));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
