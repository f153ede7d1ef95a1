//! Term classification.
//!
//! A [`TermPatterns`] is an ordered set of named patterns. Classifying a text
//! yields exactly one of [`Classification::NoMatch`],
//! [`Classification::Single`] or [`Classification::Multiple`]. Classification
//! is a pure function of `(patterns, text)`.
//!
//! Literal terms are escaped and matched case-insensitively on word
//! boundaries; explicit regex terms are used verbatim.
//!
//! # Example
//!
//! ```
//! use chatsift::core::classify::{Classification, TermPatterns};
//!
//! let patterns = TermPatterns::new()
//!     .with_regex("billing", r"(?i)\bbilling\b")?
//!     .with_literal("support")?;
//!
//! assert_eq!(
//!     patterns.classify("I have a billing question"),
//!     Classification::Single("billing".into())
//! );
//! assert_eq!(patterns.classify("billing and Support both").label(), "Multiple");
//! assert_eq!(patterns.classify("nothing here"), Classification::NoMatch);
//! # Ok::<(), chatsift::ChatsiftError>(())
//! ```
//!
//! # Terms file
//!
//! [`TermPatterns::parse_terms`] reads one term per line:
//!
//! ```text
//! # comment
//! refund                 literal term, label "refund"
//! billing=(?i)invoice    explicit regex, label "billing"
//! r:\bSKU-\d+\b          explicit regex, label "regex:<n>"
//! ```

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::{ChatsiftError, Result};

/// Label for documents that matched no category (or had no prompt).
pub const OTHER_LABEL: &str = "Other (no-term)";

/// Label for documents that matched two or more categories.
pub const MULTIPLE_LABEL: &str = "Multiple";

/// Something that can be classified.
pub trait Searchable {
    /// The prompt, trimmed. An empty prompt is never matched against patterns.
    fn prompt_text(&self) -> &str;

    /// All searchable text in a fixed field order, space-joined.
    fn searchable_text(&self) -> String;
}

/// The outcome of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    NoMatch,
    Single(String),
    /// Matched categories in declaration order.
    Multiple(Vec<String>),
}

impl Classification {
    /// The aggregate counter label: the category, [`MULTIPLE_LABEL`] or [`OTHER_LABEL`].
    pub fn label(&self) -> &str {
        match self {
            Classification::NoMatch => OTHER_LABEL,
            Classification::Single(name) => name,
            Classification::Multiple(_) => MULTIPLE_LABEL,
        }
    }

    /// The individual matched categories.
    pub fn matched(&self) -> &[String] {
        match self {
            Classification::NoMatch => &[],
            Classification::Single(name) => std::slice::from_ref(name),
            Classification::Multiple(names) => names,
        }
    }

    /// Matched categories joined with commas, for detail rows.
    pub fn matched_joined(&self) -> String {
        self.matched().join(",")
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Classification::NoMatch)
    }
}

/// An ordered mapping of category label to compiled pattern.
#[derive(Debug, Clone, Default)]
pub struct TermPatterns {
    terms: Vec<(String, Regex)>,
}

impl TermPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a literal term, labelled by itself.
    pub fn with_literal(mut self, term: &str) -> Result<Self> {
        self.add_literal(term)?;
        Ok(self)
    }

    /// Adds an explicit regex category.
    pub fn with_regex(mut self, label: &str, pattern: &str) -> Result<Self> {
        self.add_regex(label, pattern)?;
        Ok(self)
    }

    /// Adds a literal term: escaped, case-insensitive, word-bounded.
    ///
    /// Blank terms are ignored.
    pub fn add_literal(&mut self, term: &str) -> Result<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }
        let pattern = format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(term));
        self.insert(term, &pattern)
    }

    /// Adds a regex category, used verbatim.
    pub fn add_regex(&mut self, label: &str, pattern: &str) -> Result<()> {
        self.insert(label, pattern)
    }

    /// Re-declaring a label replaces its pattern in place. The report
    /// labels [`MULTIPLE_LABEL`] and [`OTHER_LABEL`] are rejected.
    fn insert(&mut self, label: &str, pattern: &str) -> Result<()> {
        if label == MULTIPLE_LABEL || label == OTHER_LABEL {
            return Err(ChatsiftError::reserved_label(label));
        }
        let regex = Regex::new(pattern).map_err(|e| ChatsiftError::invalid_pattern(label, e))?;
        match self.terms.iter_mut().find(|(l, _)| l == label) {
            Some(slot) => slot.1 = regex,
            None => self.terms.push((label.to_string(), regex)),
        }
        Ok(())
    }

    /// Builds patterns from literal terms.
    pub fn from_literals<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Self::new();
        for term in terms {
            patterns.add_literal(term.as_ref())?;
        }
        Ok(patterns)
    }

    /// Builds patterns from `(label, regex)` pairs.
    pub fn from_regexes<I, L, P>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, P)>,
        L: AsRef<str>,
        P: AsRef<str>,
    {
        let mut patterns = Self::new();
        for (label, pattern) in pairs {
            patterns.add_regex(label.as_ref(), pattern.as_ref())?;
        }
        Ok(patterns)
    }

    /// Parses terms-file syntax.
    pub fn parse_terms(text: &str) -> Result<Self> {
        let mut patterns = Self::new();
        let mut regex_idx = 0usize;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((label, pattern)) = line.split_once('=') {
                let label = match label.trim() {
                    "" => format!("regex:{regex_idx}"),
                    l => l.to_string(),
                };
                patterns.add_regex(&label, pattern.trim())?;
                regex_idx += 1;
            } else if let Some(pattern) = line.strip_prefix("r:") {
                patterns.add_regex(&format!("regex:{regex_idx}"), pattern.trim())?;
                regex_idx += 1;
            } else {
                patterns.add_literal(line)?;
            }
        }
        Ok(patterns)
    }

    /// Reads and parses a terms file.
    pub fn from_terms_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let patterns = Self::parse_terms(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), terms = patterns.len(), "loaded terms file");
        Ok(patterns)
    }

    /// Category labels in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|(label, _)| label.as_str())
    }

    /// Report row order: categories, then [`MULTIPLE_LABEL`], then [`OTHER_LABEL`].
    pub fn report_labels(&self) -> Vec<String> {
        self.labels()
            .chain([MULTIPLE_LABEL, OTHER_LABEL])
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Classifies raw text.
    pub fn classify(&self, text: &str) -> Classification {
        if text.is_empty() {
            return Classification::NoMatch;
        }
        let mut matched: Vec<String> = self
            .terms
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(label, _)| label.clone())
            .collect();
        match matched.len() {
            0 => Classification::NoMatch,
            1 => Classification::Single(matched.remove(0)),
            _ => Classification::Multiple(matched),
        }
    }

    /// Classifies a document. An empty prompt is `NoMatch` without touching the patterns.
    pub fn classify_document(&self, doc: &impl Searchable) -> Classification {
        if doc.prompt_text().is_empty() {
            return Classification::NoMatch;
        }
        self.classify(&doc.searchable_text())
    }
}
