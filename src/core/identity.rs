//! Record identity and cross-stream deduplication.
//!
//! Every ingested record gets a stable id: an explicit id field when the
//! record has one, otherwise a composite of its group, stream and line. In
//! deduplicated mode a [`SeenIds`] set gates each record: first occurrence in
//! processing order wins, later ones are dropped silently.

use std::collections::HashSet;

use serde_json::Value;

use crate::parsing::fields::{RECORD_GROUP_ID, RECORD_ID};

/// Derives the unique id of an ingested record.
///
/// Uses the first present of `chat_id`, `id`, `session_id`, `sessionId`,
/// falling back to `"{group_id}::{stream}::line{line_no}"`.
pub fn unique_id(record: &Value, stream: &str, line_no: usize) -> String {
    RECORD_ID.first_string(record).unwrap_or_else(|| {
        let group = RECORD_GROUP_ID.first_string(record).unwrap_or_default();
        composite_id(&group, stream, line_no)
    })
}

/// Builds the fallback id for a record without an explicit one.
pub fn composite_id(group_id: &str, stream: &str, line_no: usize) -> String {
    format!("{group_id}::{stream}::line{line_no}")
}

/// The set of ids already counted in a run. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id`, returning `true` if it had not been seen before.
    pub fn is_new(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
