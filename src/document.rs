//! The canonical document: one normalized chat exchange.
//!
//! Every raw record, whatever shape the upstream API gave it, is turned into a
//! [`CanonicalDocument`] by the [`DocumentBuilder`](crate::core::DocumentBuilder).
//! Downstream stages (JSONL persistence, classification, aggregation) only
//! ever see this shape.
//!
//! # Examples
//!
//! ```
//! use chatsift::CanonicalDocument;
//!
//! let doc = CanonicalDocument::new("embedA:42", "Support", "2024-01-15T10:30:00+00:00")
//!     .with_prompt("How do I reset my password?")
//!     .with_session_id("sess-1");
//!
//! assert_eq!(doc.id(), "embedA:42");
//! assert_eq!(doc.created_at(), doc.prompt_date());
//! assert!(!doc.is_translated());
//! ```
//!
//! ## Serialization
//!
//! The JSONL form keeps the field names the search side looks up
//! (`chat_id`, `source.embed_name`, `raw_chat`), so exported files can be fed
//! straight back into `chatsift search`.
//!
//! ```
//! use chatsift::CanonicalDocument;
//!
//! let doc = CanonicalDocument::new("g:1", "Docs", "2024-01-15T10:30:00+00:00");
//! let json = serde_json::to_string(&doc)?;
//! assert!(json.contains("\"chat_id\":\"g:1\""));
//! assert!(!json.contains("translation"));
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::classify::Searchable;
use crate::parsing::fields::raw_text_parts;

/// Group key used when no group identifier or name can be resolved.
pub const UNKNOWN_GROUP: &str = "<unknown>";

/// Metadata key holding the raw group identifier.
pub const META_GROUP_ID: &str = "embed_uuid";
/// Metadata key holding the resolved group display name.
pub const META_GROUP_NAME: &str = "embed_name";
/// Metadata key holding the page URL of the first retrieval source.
pub const META_PAGE_URL: &str = "page_url";

/// A completed translation of a document's prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Detected source language as reported by the provider.
    pub from_lang: String,
    /// Requested target language.
    pub to_lang: String,
    /// The translated prompt text.
    pub translated_prompt: String,
}

impl Translation {
    pub fn new(
        from_lang: impl Into<String>,
        to_lang: impl Into<String>,
        translated_prompt: impl Into<String>,
    ) -> Self {
        Self {
            from_lang: from_lang.into(),
            to_lang: to_lang.into(),
            translated_prompt: translated_prompt.into(),
        }
    }
}

/// A normalized chat exchange.
///
/// # Invariants
///
/// - `id` is derived once at construction and never reassigned.
/// - `created_at` is always a canonical UTC timestamp string.
/// - `group_key` is never empty ([`UNKNOWN_GROUP`] stands in).
/// - `translation` is `Some` only when a translation ran and changed the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    /// Stable identity, `"{group_id}:{raw_id}"` for built documents.
    #[serde(rename = "chat_id")]
    pub id: String,

    /// User-facing input text, possibly empty.
    #[serde(default)]
    pub prompt: String,

    /// Assistant output text, possibly empty.
    #[serde(default)]
    pub response: String,

    /// Canonical UTC creation time.
    pub created_at: String,

    /// Equal to `created_at` when built; downstream writers may diverge it.
    pub prompt_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Logical source (widget) the document came from.
    pub group_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Translation>,

    /// Source language detected during translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Audit metadata (raw group id, resolved name, page URL). Not searched.
    #[serde(rename = "source", default)]
    pub source_metadata: Map<String, Value>,

    /// The raw record the document was built from.
    #[serde(rename = "raw_chat", default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl CanonicalDocument {
    /// Creates a document with empty text fields.
    ///
    /// An empty `group_key` is replaced with [`UNKNOWN_GROUP`].
    pub fn new(
        id: impl Into<String>,
        group_key: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        let created_at = created_at.into();
        let mut group_key = group_key.into();
        if group_key.trim().is_empty() {
            group_key = UNKNOWN_GROUP.to_string();
        }
        Self {
            id: id.into(),
            prompt: String::new(),
            response: String::new(),
            prompt_date: created_at.clone(),
            created_at,
            session_id: None,
            group_key,
            translation: None,
            language: None,
            source_metadata: Map::new(),
            raw: Value::Null,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Translation) -> Self {
        self.translation = Some(translation);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Adds one audit metadata entry. `Null` values are not stored.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.source_metadata.insert(key.into(), value);
        }
        self
    }

    #[must_use]
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn prompt_date(&self) -> &str {
        &self.prompt_date
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    /// Raw group identifier, if recorded in the metadata.
    pub fn group_id(&self) -> Option<&str> {
        self.source_metadata.get(META_GROUP_ID).and_then(Value::as_str)
    }

    /// Page URL of the first retrieval source, if any.
    pub fn page_url(&self) -> Option<&str> {
        self.source_metadata.get(META_PAGE_URL).and_then(Value::as_str)
    }

    // =========================================================================
    // Utility methods
    // =========================================================================

    /// Returns `true` when a translation was recorded.
    pub fn is_translated(&self) -> bool {
        self.translation.is_some()
    }

    /// Returns `true` if the prompt is empty or whitespace-only.
    pub fn has_empty_prompt(&self) -> bool {
        self.prompt.trim().is_empty()
    }
}

impl Searchable for CanonicalDocument {
    fn prompt_text(&self) -> &str {
        self.prompt.trim()
    }

    /// Prompt, response, raw text fields, session id and group key, space-joined.
    fn searchable_text(&self) -> String {
        let (prompt, response) = (self.prompt.trim(), self.response.trim());
        let mut parts: Vec<&str> = vec![prompt, response];
        parts.extend(raw_text_parts(&self.raw).filter(|p| *p != prompt && *p != response));
        if let Some(session) = &self.session_id {
            parts.push(session);
        }
        parts.push(&self.group_key);
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}
