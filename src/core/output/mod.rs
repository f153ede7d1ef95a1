//! Output writers.
//!
//! - [`csv_writer`] - summary, per-stream, translation and detail CSVs
//! - [`write_jsonl`] / [`to_jsonl`] - canonical documents, one JSON object per line
//! - [`write_human`] / [`to_human`] - human-readable export with `Prompt:` lines
//!
//! | Output | Consumer |
//! |--------|----------|
//! | JSONL | the search pass, RAG ingestion |
//! | Human text | people; `--scan-human` |
//! | CSV | spreadsheets |

pub mod csv_writer;
mod jsonl_writer;
mod text_writer;

pub use csv_writer::{
    write_details_csv, write_details_per_group, write_stream_csv, write_summary_csv,
    write_translation_csv,
};
pub use jsonl_writer::{JsonlWriter, to_jsonl, write_jsonl};
pub use text_writer::{to_human, write_human};

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Longest safe file-name fragment, in characters.
pub const MAX_SAFE_NAME: usize = 60;

/// Fallback for names with nothing safe left.
pub const UNKNOWN_FILE_NAME: &str = "unknown";

/// Collapses all whitespace (newlines included) to single spaces and trims.
///
/// ```
/// use chatsift::core::output::sanitize_cell;
///
/// assert_eq!(sanitize_cell(" a\r\nb \t c "), "a b c");
/// ```
pub fn sanitize_cell(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns a group name into a file-name fragment.
///
/// Runs of characters other than letters, digits, `_`, `-` and `.` become a
/// single `_`; the result is cut to [`MAX_SAFE_NAME`] characters.
///
/// ```
/// use chatsift::core::output::safe_file_name;
///
/// assert_eq!(safe_file_name("Sales / EU  (v2)"), "Sales_EU_v2_");
/// assert_eq!(safe_file_name(""), "unknown");
/// ```
pub fn safe_file_name(name: &str) -> String {
    static UNSAFE_RUN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\-.]+").expect("valid file name regex"));
    let out: String = UNSAFE_RUN
        .replace_all(name, "_")
        .chars()
        .take(MAX_SAFE_NAME)
        .collect();
    if out.is_empty() {
        UNKNOWN_FILE_NAME.to_string()
    } else {
        out
    }
}

/// Hands out collision-free file-name fragments: `name`, `name_1`, `name_2`, ...
#[derive(Debug, Default)]
pub struct FileNamer {
    used: HashMap<String, usize>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next free fragment for `group`.
    pub fn unique(&mut self, group: &str) -> String {
        let safe = safe_file_name(group);
        let counter = self.used.entry(safe.clone()).or_insert(0);
        let name = if *counter == 0 {
            safe
        } else {
            format!("{safe}_{counter}")
        };
        *counter += 1;
        name
    }
}
