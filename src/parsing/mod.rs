//! Shared parsing utilities.
//!
//! Both the export side (raw API records) and the search side (ingested JSONL
//! documents) read loosely-shaped JSON through the same rule tables and
//! normalize timestamps through the same function.

pub mod fields;
pub mod timestamp;

pub use fields::{FieldRule, KeyPath, is_present, lookup, scalar_to_string};
pub use timestamp::{RawTimestamp, format_utc, normalize_timestamp, parse_timestamp};
