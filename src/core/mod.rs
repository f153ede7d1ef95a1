//! Core processing logic for chatsift.
//!
//! Export side:
//! - [`builder`] - raw records → [`CanonicalDocument`](crate::CanonicalDocument), translation finalization
//! - [`export`] - the export pipeline
//! - [`output`] - JSONL, human-readable and CSV writers
//!
//! Search side:
//! - [`record`] - [`SearchRecord`], a tolerant view over one JSONL line
//! - [`identity`] - stable record ids and deduplication
//! - [`classify`] - [`TermPatterns`] and the one-label-per-record rule
//! - [`aggregate`] - [`AggregationState`] in deduplicated or per-stream mode
//! - [`search`] - stream discovery and ingestion driver
//! - [`report`] - read-only tables over a finished aggregation
//!
//! # Quick Start
//!
//! ```rust
//! use chatsift::core::{AggregationMode, AggregationState, SearchRecord, TermPatterns};
//! use serde_json::json;
//!
//! let patterns = TermPatterns::from_literals(["refund"])?;
//! let mut state = AggregationState::new(AggregationMode::Deduplicated);
//!
//! let line = json!({"chat_id": "w:1", "group_key": "Support", "prompt": "Refund please"});
//! state.offer(&SearchRecord::from_value(&line, "a.jsonl", 1), &patterns);
//!
//! assert_eq!(state.global().get("refund"), 1);
//! # Ok::<(), chatsift::ChatsiftError>(())
//! ```

pub mod aggregate;
pub mod builder;
pub mod classify;
pub mod export;
pub mod identity;
pub mod output;
pub mod record;
pub mod report;
pub mod search;

pub use aggregate::{AggregationMode, AggregationState, CategoryCounts, DetailRow, RunStats};
pub use builder::{DocumentBuilder, TranslationStatus};
pub use classify::{Classification, MULTIPLE_LABEL, OTHER_LABEL, TermPatterns};
pub use export::{ExportSummary, run_export};
pub use identity::{SeenIds, unique_id};
pub use record::SearchRecord;
pub use report::{StreamTable, SummaryTable, TranslationTable};
pub use search::SearchRun;
