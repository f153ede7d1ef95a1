//! Translation provider interface.
//!
//! chatsift does not ship a translation backend. Callers plug one in through
//! the [`Translator`] trait; whether the backend is internally async, retries,
//! or times out is its own business. The core only ever makes one blocking
//! call per document and tolerates a provider that is absent altogether
//! ([`Unavailable`]).
//!
//! # Example
//!
//! ```
//! use chatsift::translate::{FnTranslator, Translated, Translator};
//!
//! let fake = FnTranslator::new(|text: &str, _target: &str| {
//!     Translated::new(text.to_uppercase(), Some("es".to_string()))
//! });
//! let out = fake.translate("hola", "en-US");
//! assert_eq!(out.text, "HOLA");
//! assert_eq!(out.source_lang.as_deref(), Some("es"));
//! ```

use std::fmt;

/// Result of one translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    /// The translated text (the input text when nothing happened).
    pub text: String,
    /// Detected source language, `None` when unknown.
    pub source_lang: Option<String>,
}

impl Translated {
    pub fn new(text: impl Into<String>, source_lang: Option<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.filter(|l| !l.trim().is_empty()),
        }
    }

    /// The pass-through result: input text, no detected language.
    pub fn unchanged(text: &str) -> Self {
        Self::new(text, None)
    }
}

/// A translation provider.
pub trait Translator: Send + Sync {
    /// Translates `text` into `target_lang`, reporting the detected source language.
    fn translate(&self, text: &str, target_lang: &str) -> Translated;

    /// Returns `false` when the provider cannot translate at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// The absent provider. Always passes text through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl Translator for Unavailable {
    fn translate(&self, text: &str, _target_lang: &str) -> Translated {
        Translated::unchanged(text)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// A provider backed by a closure.
pub struct FnTranslator<F> {
    func: F,
}

impl<F> FnTranslator<F>
where
    F: Fn(&str, &str) -> Translated + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Translator for FnTranslator<F>
where
    F: Fn(&str, &str) -> Translated + Send + Sync,
{
    fn translate(&self, text: &str, target_lang: &str) -> Translated {
        (self.func)(text, target_lang)
    }
}

impl<F> fmt::Debug for FnTranslator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTranslator").finish_non_exhaustive()
    }
}

/// Primary language subtag, lower-cased: `en-US` → `en`. Empty input maps to `en`.
pub fn short_lang(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        return "en".to_string();
    }
    tag.split(['-', '_'])
        .next()
        .unwrap_or(tag)
        .to_lowercase()
}
