//! Canonical document construction.
//!
//! [`DocumentBuilder`] maps a `(group metadata, raw record, index)` triple to
//! a [`CanonicalDocument`]. Field extraction is driven by the rule tables in
//! [`parsing::fields`](crate::parsing::fields); the group-name map and the
//! translation provider are explicit collaborators owned by the builder.
//!
//! # Example
//!
//! ```
//! use chatsift::core::DocumentBuilder;
//! use chatsift::groups::GroupNameMap;
//! use serde_json::json;
//!
//! let builder = DocumentBuilder::new(GroupNameMap::new().with_entry("EMBEDA", "Support"));
//! let doc = builder.build(
//!     &json!({"uuid": "embedA"}),
//!     &json!({"id": 42, "message": "hello", "timestamp": 1700000000000_i64}),
//!     0,
//! );
//!
//! assert_eq!(doc.id(), "embedA:42");
//! assert_eq!(doc.group_key(), "Support");
//! assert_eq!(doc.created_at(), "2023-11-14T22:13:20+00:00");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::TranslationConfig;
use crate::document::{
    CanonicalDocument, META_GROUP_ID, META_GROUP_NAME, META_PAGE_URL, Translation,
};
use crate::groups::{GroupNameMap, GroupNameResolver};
use crate::parsing::fields::{
    CREATED, GROUP_ID, GROUP_NAME, NESTED_SESSION, PAGE_URL, PROMPT, RAW_ID, RESPONSE, SESSION,
    SOURCES,
};
use crate::parsing::timestamp::normalize_timestamp;
use crate::translate::{Translator, Unavailable, short_lang};

/// Outcome of [`DocumentBuilder::finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationStatus {
    /// The prompt was translated and the translation recorded.
    Translated,
    /// Translation is disabled or the provider is unavailable.
    Skipped,
    /// Nothing to do: empty prompt, already translated, same language, or unchanged text.
    Unchanged,
}

/// A group's raw identifier and resolved display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    /// Raw identifier, empty when the metadata carries none.
    pub id: String,
    /// Display name used as the document's group key.
    pub name: String,
}

/// Builds canonical documents from raw records.
pub struct DocumentBuilder {
    names: Box<dyn GroupNameResolver>,
    translator: Box<dyn Translator>,
    translation: TranslationConfig,
    unavailable_logged: AtomicBool,
}

impl DocumentBuilder {
    /// Creates a builder with the given name resolver and no translation.
    pub fn new(names: impl GroupNameResolver + 'static) -> Self {
        Self {
            names: Box::new(names),
            translator: Box::new(Unavailable),
            translation: TranslationConfig::default(),
            unavailable_logged: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    #[must_use]
    pub fn with_translation(mut self, config: TranslationConfig) -> Self {
        self.translation = config;
        self
    }

    pub fn translation_config(&self) -> &TranslationConfig {
        &self.translation
    }

    /// Resolves the raw id and display name of a group.
    ///
    /// Order: name map (by lower-cased id), embedded name fields, raw id.
    pub fn resolve_group(&self, metadata: &Value) -> ResolvedGroup {
        let id = GROUP_ID.first_string(metadata).unwrap_or_default();
        let name = Some(id.as_str())
            .filter(|id| !id.is_empty())
            .and_then(|id| self.names.lookup(id))
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .or_else(|| GROUP_NAME.first_string(metadata))
            .unwrap_or_else(|| id.clone());
        ResolvedGroup { id, name }
    }

    /// Whether the name map has an entry for `group_id`.
    pub fn is_mapped(&self, group_id: &str) -> bool {
        self.names.lookup(group_id).is_some()
    }

    /// Builds one canonical document. Never fails.
    pub fn build(&self, group: &Value, raw: &Value, index: usize) -> CanonicalDocument {
        let resolved = self.resolve_group(group);
        self.build_resolved(&resolved, raw, index)
    }

    /// Same as [`build`](Self::build) with the group already resolved.
    pub fn build_resolved(
        &self,
        group: &ResolvedGroup,
        raw: &Value,
        index: usize,
    ) -> CanonicalDocument {
        let raw_id = RAW_ID
            .first_string(raw)
            .unwrap_or_else(|| format!("{}-{index}", group.id));
        let id = format!("{}:{raw_id}", group.id);
        let created = normalize_timestamp(CREATED.first_value(raw));

        let mut doc = CanonicalDocument::new(id, group.name.as_str(), created)
            .with_prompt(PROMPT.first_string(raw).unwrap_or_default())
            .with_response(RESPONSE.first_string(raw).unwrap_or_default())
            .with_metadata(META_GROUP_ID, group.id.as_str())
            .with_metadata(META_GROUP_NAME, group.name.as_str())
            .with_metadata(META_PAGE_URL, extract_page_url(raw));
        if let Some(session) = extract_session_id(raw) {
            doc = doc.with_session_id(session);
        }
        doc.with_raw(raw.clone())
    }

    /// Runs the translation step on a built document.
    ///
    /// A translation is recorded only when the provider reports a source
    /// language whose short code differs from the target's, and the returned
    /// text is non-empty and differs from the prompt.
    pub fn finalize(&self, doc: &mut CanonicalDocument) -> TranslationStatus {
        if doc.is_translated() {
            return TranslationStatus::Unchanged;
        }
        if !self.translation.enabled {
            return TranslationStatus::Skipped;
        }
        if doc.has_empty_prompt() {
            debug!(id = %doc.id, "no prompt text to translate");
            return TranslationStatus::Unchanged;
        }
        if !self.translator.is_available() {
            if !self.unavailable_logged.swap(true, Ordering::Relaxed) {
                info!("translator unavailable; skipping prompt translations for this run");
            }
            return TranslationStatus::Skipped;
        }

        let target = &self.translation.target_lang;
        let target_short = short_lang(target);
        let out = self.translator.translate(&doc.prompt, &target_short);

        match out.source_lang {
            Some(src)
                if short_lang(&src) != target_short
                    && !out.text.is_empty()
                    && out.text != doc.prompt =>
            {
                info!(
                    id = %doc.id,
                    from = %src,
                    to = %target,
                    before = doc.prompt.len(),
                    after = out.text.len(),
                    "translated prompt"
                );
                doc.language = Some(src.clone());
                doc.translation = Some(Translation::new(src, target.as_str(), out.text));
                TranslationStatus::Translated
            }
            src => {
                debug!(id = %doc.id, src = ?src, target = %target_short, "no translation needed");
                TranslationStatus::Unchanged
            }
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(GroupNameMap::default())
    }
}

impl fmt::Debug for DocumentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentBuilder")
            .field("translation", &self.translation)
            .field("translator_available", &self.translator.is_available())
            .finish_non_exhaustive()
    }
}

/// Top-level session keys first, then one level into nested objects.
fn extract_session_id(raw: &Value) -> Option<String> {
    SESSION.first_string(raw).or_else(|| {
        raw.as_object()?
            .values()
            .filter(|v| v.is_object())
            .find_map(|v| NESTED_SESSION.first_string(v))
    })
}

fn extract_page_url(raw: &Value) -> Option<String> {
    let first = SOURCES.first_value(raw)?.as_array()?.first()?;
    PAGE_URL.first_string(first)
}
