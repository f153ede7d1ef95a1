//! # chatsift
//!
//! Normalize chat-widget exports into canonical documents and tally them by
//! search term, widget and language.
//!
//! ## Overview
//!
//! chatsift has two halves that meet at a JSONL file:
//!
//! - **Export**: a raw dump (groups of chat records with loosely named
//!   fields) becomes one [`CanonicalDocument`] per record, written as JSONL
//!   and as a human-readable text file, globally and per group.
//! - **Search**: a directory of JSONL streams is read line by line, every
//!   record is classified against a set of terms, and the results are
//!   aggregated per term, per group and per translation language.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatsift::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // Export
//!     let builder = DocumentBuilder::new(GroupNameMap::load_or_default(None));
//!     let config = ExportConfig::new().with_output_dir("out").with_all_groups(true);
//!     run_export(&JsonFileSource::new("raw.json"), &builder, &config)?;
//!
//!     // Search
//!     let patterns = TermPatterns::from_literals(["refund", "invoice"])?;
//!     let state = SearchRun::new(&patterns, SearchConfig::new()).run("out/jsonl")?;
//!     print!("{}", SummaryTable::build(&state, &patterns));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`document`] - [`CanonicalDocument`], [`Translation`](document::Translation)
//! - [`parsing`] - field probing rules and timestamp normalization
//! - [`groups`] - group id → display name resolution
//! - [`translate`] - translation provider interface
//! - [`source`] - raw record sources
//! - [`core`] - builder, export pipeline, classification, aggregation, reports, writers
//! - [`streaming`] - line readers for JSONL and human-readable streams
//! - [`progress`] - per-stream progress callbacks
//! - [`config`] - export, search and translation configuration
//! - [`error`] - [`ChatsiftError`], [`Result`]
//! - `cli` - clap argument types (feature `cli`)
//! - [`prelude`] - convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod document;
pub mod error;
pub mod groups;
pub mod parsing;
pub mod progress;
pub mod source;
pub mod streaming;
pub mod translate;

pub use document::CanonicalDocument;
pub use error::{ChatsiftError, Result};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatsift::prelude::*;
/// ```
pub mod prelude {
    pub use crate::CanonicalDocument;
    pub use crate::error::{ChatsiftError, Result};

    pub use crate::config::{ExportConfig, SearchConfig, TranslationConfig};

    pub use crate::groups::{GroupNameMap, GroupNameResolver};
    pub use crate::source::{JsonFileSource, RawGroup, RawRecordSource};
    pub use crate::translate::{FnTranslator, Translated, Translator};

    pub use crate::core::{
        AggregationMode, AggregationState, Classification, DocumentBuilder, SearchRecord,
        SearchRun, StreamTable, SummaryTable, TermPatterns, TranslationTable, run_export,
    };

    pub use crate::core::output::{to_human, to_jsonl, write_human, write_jsonl};
    pub use crate::parsing::{format_utc, normalize_timestamp, parse_timestamp};
}
