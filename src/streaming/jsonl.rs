//! JSONL stream reader.
//!
//! Yields one JSON object per non-blank line. Invalid UTF-8 is decoded
//! lossily; unparsable lines come out as line-level errors and the reader
//! carries on with the next line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::Result;

use super::{Line, RecordIterator, StreamingConfig, StreamingError, StreamingResult};

/// Reads JSON objects line by line.
pub struct JsonlReader<R: BufRead> {
    reader: R,
    total_bytes: Option<u64>,
    bytes_read: u64,
    line_no: usize,
    config: StreamingConfig,
    buffer: Vec<u8>,
    finished: bool,
}

impl JsonlReader<BufReader<File>> {
    /// Opens a file for streaming.
    pub fn open(path: impl AsRef<Path>, config: StreamingConfig) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        let reader = BufReader::with_capacity(config.buffer_size, file);
        Ok(Self::from_reader(reader, config).with_total_bytes(size))
    }
}

impl<R: BufRead> JsonlReader<R> {
    /// Wraps any buffered reader. Total size is unknown.
    pub fn from_reader(reader: R, config: StreamingConfig) -> Self {
        Self {
            reader,
            total_bytes: None,
            bytes_read: 0,
            line_no: 0,
            config,
            buffer: Vec::with_capacity(4096),
            finished: false,
        }
    }

    #[must_use]
    fn with_total_bytes(mut self, total: u64) -> Self {
        self.total_bytes = Some(total);
        self
    }

    /// Last physical line number read.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn parse_line(&self, line: &str) -> StreamingResult<Value> {
        let value: Value =
            serde_json::from_str(line).map_err(|source| StreamingError::Json {
                line_no: self.line_no,
                source,
            })?;
        if value.is_object() {
            Ok(value)
        } else {
            Err(StreamingError::NotAnObject {
                line_no: self.line_no,
            })
        }
    }
}

impl<R: BufRead> RecordIterator<Value> for JsonlReader<R> {
    fn bytes_processed(&self) -> u64 {
        self.bytes_read
    }

    fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
    type Item = StreamingResult<Line<Value>>;

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
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let line_no = self.line_no;
                    return Some(
                        self.parse_line(trimmed)
                            .map(|value| Line { line_no, value }),
                    );
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn read_all(input: &[u8]) -> Vec<StreamingResult<Line<Value>>> {
        JsonlReader::from_reader(Cursor::new(input.to_vec()), StreamingConfig::default()).collect()
    }

    #[test]
    fn test_reads_objects_with_line_numbers() {
        let items = read_all(b"{\"a\":1}\n\n{\"b\":2}\n");
        assert_eq!(items.len(), 2);
        let second = items[1].as_ref().unwrap();
        assert_eq!(second.line_no, 3);
        assert_eq!(second.value["b"], 2);
    }

    #[test]
    fn test_malformed_lines_do_not_stop_stream() {
        let items = read_all(b"{bad\n[1,2]\n{\"ok\":true}");
        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], Err(StreamingError::Json { line_no: 1, .. })));
        assert!(matches!(items[1], Err(StreamingError::NotAnObject { line_no: 2 })));
        assert!(items[2].is_ok());
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let items = read_all(b"{\"p\":\"caf\xff\"}\n");
        let line = items[0].as_ref().unwrap();
        assert!(line.value["p"].as_str().unwrap().starts_with("caf"));
    }

    #[test]
    fn test_line_too_long() {
        let config = StreamingConfig::new().with_max_line_size(8);
        let reader = JsonlReader::from_reader(Cursor::new(b"{\"a\":\"long value\"}\n{}\n".to_vec()), config);
        let items: Vec<_> = reader.collect();
        assert!(matches!(items[0], Err(StreamingError::LineTooLong { line_no: 1, .. })));
        assert!(items[1].is_ok());
    }

    #[test]
    fn test_open_reports_progress() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"a\":1}}").unwrap();
        writeln!(file, "{{\"a\":2}}").unwrap();

        let mut reader = JsonlReader::open(file.path(), StreamingConfig::default()).unwrap();
        assert_eq!(reader.progress(), Some(0.0));
        while reader.next().is_some() {}
        assert_eq!(reader.progress(), Some(100.0));
        assert_eq!(reader.line_no(), 2);
    }
}
