//! JSON Lines (JSONL) writer for canonical documents.
//!
//! One document per line, non-ASCII kept as-is. This is the format the
//! search pass reads back.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::document::CanonicalDocument;
use crate::error::Result;

/// Incremental JSONL writer. Counts what it writes.
pub struct JsonlWriter<W: Write> {
    writer: BufWriter<W>,
    written: usize,
}

impl JsonlWriter<File> {
    /// Creates (or truncates) `path`, creating its parent directory.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            written: 0,
        }
    }

    /// Writes one document as a single line.
    pub fn write(&mut self, doc: &CanonicalDocument) -> Result<()> {
        serde_json::to_writer(&mut self.writer, doc)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the number of documents written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

/// Writes documents to a JSONL file.
pub fn write_jsonl<'a>(
    docs: impl IntoIterator<Item = &'a CanonicalDocument>,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let mut writer = JsonlWriter::create(path)?;
    for doc in docs {
        writer.write(doc)?;
    }
    writer.finish()
}

/// Renders documents to a JSONL string.
pub fn to_jsonl<'a>(docs: impl IntoIterator<Item = &'a CanonicalDocument>) -> Result<String> {
    let mut out = String::new();
    for doc in docs {
        out.push_str(&serde_json::to_string(doc)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Translation;

    fn docs() -> Vec<CanonicalDocument> {
        vec![
            CanonicalDocument::new("g:1", "Support", "2024-01-15T10:30:00+00:00").with_prompt("héllo"),
            CanonicalDocument::new("g:2", "Support", "2024-01-15T10:31:00+00:00")
                .with_prompt("hola")
                .with_translation(Translation::new("es", "en-US", "hello")),
        ]
    }

    #[test]
    fn test_to_jsonl_one_object_per_line() {
        let out = to_jsonl(&docs()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("héllo"));
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["chat_id"], "g:2");
        assert_eq!(second["translation"]["fromLang"], "es");
    }

    #[test]
    fn test_write_jsonl_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsonl").join("out.jsonl");
        let n = write_jsonl(&docs(), &path).unwrap();
        assert_eq!(n, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), to_jsonl(&docs()).unwrap());
    }
}
