//! A defensive view over one ingested record.
//!
//! JSONL files fed to the search side may come from this crate's own export
//! or from older tools with different field names. [`SearchRecord`] reads
//! the record once, through the rule tables in
//! [`parsing::fields`](crate::parsing::fields), and exposes the handful of
//! fields aggregation needs.

use serde_json::Value;

use crate::core::classify::Searchable;
use crate::core::identity::{composite_id, unique_id};
use crate::document::{CanonicalDocument, UNKNOWN_GROUP};
use crate::parsing::fields::{
    RECORD_CHAT_ID, RECORD_CREATED, RECORD_GROUP, RECORD_PROMPT, RECORD_RESPONSE, RECORD_SESSION,
    RECORD_TRANSLATED, RECORD_TRANSLATED_FROM, RECORD_TRANSLATED_TO, lookup, raw_text_parts,
};

/// Language reported when a translated record carries no source language.
pub const UNKNOWN_LANG: &str = "unknown";

/// Translation provenance of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationInfo {
    /// Source language, [`UNKNOWN_LANG`] when unresolved.
    pub from_lang: String,
    /// Target language, possibly empty.
    pub to_lang: String,
}

/// One ingested record, reduced to the fields aggregation uses.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    /// Deduplication identity (explicit or composite).
    pub id: String,
    /// Explicit chat id for reporting, empty when the record has none.
    pub chat_id: String,
    pub group_key: String,
    /// Trimmed prompt, possibly empty.
    pub prompt: String,
    pub response: String,
    pub session_id: Option<String>,
    pub created_at: String,
    pub translation: Option<TranslationInfo>,
    /// The embedded raw chat object, if any.
    pub raw: Value,
}

impl SearchRecord {
    /// Probes a parsed JSONL line.
    pub fn from_value(record: &Value, stream: &str, line_no: usize) -> Self {
        let chat_id = RECORD_CHAT_ID.first_string(record).unwrap_or_default();
        let translation = RECORD_TRANSLATED.first_string(record).map(|_| TranslationInfo {
            from_lang: RECORD_TRANSLATED_FROM
                .first_string(record)
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| UNKNOWN_LANG.to_string()),
            to_lang: RECORD_TRANSLATED_TO.first_string(record).unwrap_or_default(),
        });
        let raw = record
            .get("raw_chat")
            .or_else(|| record.get("chat"))
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or(Value::Null);

        Self {
            id: unique_id(record, stream, line_no),
            chat_id,
            group_key: RECORD_GROUP
                .first_string(record)
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
            prompt: RECORD_PROMPT
                .paths
                .iter()
                .filter_map(|path| lookup(record, path))
                .filter_map(Value::as_str)
                .map(str::trim)
                .find(|s| !s.is_empty())
                .unwrap_or_default()
                .to_string(),
            response: RECORD_RESPONSE
                .first_string(record)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            session_id: RECORD_SESSION.first_string(record),
            created_at: RECORD_CREATED.first_string(record).unwrap_or_default(),
            translation,
            raw,
        }
    }

    /// A record for one `Prompt:` line of a human-readable export.
    pub fn from_human_prompt(prompt: &str, group: &str, stream: &str, line_no: usize) -> Self {
        Self {
            id: composite_id("", stream, line_no),
            chat_id: String::new(),
            group_key: if group.is_empty() {
                UNKNOWN_GROUP.to_string()
            } else {
                group.to_string()
            },
            prompt: prompt.trim().to_string(),
            response: String::new(),
            session_id: None,
            created_at: String::new(),
            translation: None,
            raw: Value::Null,
        }
    }

    /// Views an in-memory canonical document as a search record.
    pub fn from_document(doc: &CanonicalDocument) -> Self {
        Self {
            id: doc.id.clone(),
            chat_id: doc.id.clone(),
            group_key: doc.group_key.clone(),
            prompt: doc.prompt.trim().to_string(),
            response: doc.response.trim().to_string(),
            session_id: doc.session_id.clone(),
            created_at: doc.created_at.clone(),
            translation: doc.translation.as_ref().map(|t| TranslationInfo {
                from_lang: if t.from_lang.trim().is_empty() {
                    UNKNOWN_LANG.to_string()
                } else {
                    t.from_lang.clone()
                },
                to_lang: t.to_lang.clone(),
            }),
            raw: doc.raw.clone(),
        }
    }

    pub fn has_prompt(&self) -> bool {
        !self.prompt.is_empty()
    }

    pub fn is_translated(&self) -> bool {
        self.translation.is_some()
    }
}

impl Searchable for SearchRecord {
    fn prompt_text(&self) -> &str {
        &self.prompt
    }

    fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.prompt.as_str(), self.response.as_str()];
        // Prompt and response may themselves have come from the raw chat.
        parts.extend(
            raw_text_parts(&self.raw).filter(|p| *p != self.prompt && *p != self.response),
        );
        if let Some(session) = &self.session_id {
            parts.push(session);
        }
        parts.push(&self.group_key);
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}
