//! Line-oriented stream readers for the search side.
//!
//! Input files are read sequentially, line by line, with constant memory.
//! Parse failures are yielded per line and never end a stream.
//!
//! - [`JsonlReader`] reads canonical (or legacy) JSONL documents
//! - [`HumanPromptReader`] reads `Prompt:` lines of human-readable exports
//! - [`discover_streams`] lists input files in processing order
//!
//! # Example
//!
//! ```rust,no_run
//! use chatsift::streaming::{JsonlReader, StreamingConfig, discover_streams};
//!
//! for path in discover_streams("jsonl", "jsonl").unwrap() {
//!     for item in JsonlReader::open(&path, StreamingConfig::default()).unwrap() {
//!         match item {
//!             Ok(line) => println!("{}:{} {}", path.display(), line.line_no, line.value),
//!             Err(e) => eprintln!("skipped: {e}"),
//!         }
//!     }
//! }
//! ```

mod error;
mod human;
mod jsonl;
mod traits;

pub use error::{StreamingError, StreamingResult};
pub use human::{HumanPromptReader, extract_prompt_line};
pub use jsonl::JsonlReader;
pub use traits::{Line, RecordIterator, StreamingConfig};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ChatsiftError, Result};

/// Lists regular files in `dir` with extension `ext`, sorted by file name.
///
/// The extension comparison is case-insensitive. A missing directory is a
/// configuration-level error.
pub fn discover_streams(dir: impl AsRef<Path>, ext: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ChatsiftError::missing_input(dir));
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), ext, count = paths.len(), "discovered streams");
    Ok(paths)
}

/// The display name of a stream: its file name.
pub fn stream_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The file stem of a stream, used as group for human-readable streams.
pub fn stream_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jsonl", "a.JSONL", "c.txt", "d.jsonl"] {
            fs::write(dir.path().join(name), "{}\n").unwrap();
        }
        fs::create_dir(dir.path().join("sub.jsonl")).unwrap();

        let found = discover_streams(dir.path(), "jsonl").unwrap();
        let names: Vec<String> = found.iter().map(|p| stream_name(p)).collect();
        assert_eq!(names, ["a.JSONL", "b.jsonl", "d.jsonl"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover_streams("/definitely/not/here", "jsonl").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_stream_stem() {
        assert_eq!(stream_stem(Path::new("out/export_Support.txt")), "export_Support");
        assert_eq!(stream_name(Path::new("out/a.jsonl")), "a.jsonl");
    }
}
