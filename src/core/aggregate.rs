//! The aggregation engine.
//!
//! [`AggregationState`] accumulates, in one pass, per-category counts at three
//! granularities (per stream, per group, global) plus translation provenance
//! and per-group prompt totals. It is created fresh for each run and handed to
//! the report layer afterwards.
//!
//! Two modes, chosen by the caller:
//!
//! - [`AggregationMode::Deduplicated`]: every record passes the identity gate;
//!   the first occurrence of an id wins and later ones are skipped entirely.
//! - [`AggregationMode::PerStream`]: no gate; each stream is counted on its
//!   own and the group/global counters are plain sums across streams.
//!
//! # Invariant
//!
//! For every label, `global[label] == Σ per_group[g][label]`. Both sides are
//! updated by the same call, so the invariant holds after every ingest,
//! including a run that stops half-way.
//!
//! # Example
//!
//! ```
//! use chatsift::core::aggregate::{AggregationMode, AggregationState, StreamKind};
//! use chatsift::core::classify::TermPatterns;
//! use chatsift::core::record::SearchRecord;
//! use serde_json::json;
//!
//! let patterns = TermPatterns::from_literals(["billing"])?;
//! let mut state = AggregationState::new(AggregationMode::Deduplicated);
//!
//! let rec = SearchRecord::from_value(&json!({"chat_id": "embedA:42", "prompt": "billing"}), "a.jsonl", 1);
//! state.begin_stream("a.jsonl", StreamKind::Jsonl);
//! assert!(state.offer(&rec, &patterns));
//! state.begin_stream("b.jsonl", StreamKind::Jsonl);
//! assert!(!state.offer(&rec, &patterns));
//!
//! assert_eq!(state.global().get("billing"), 1);
//! assert!(state.is_consistent());
//! # Ok::<(), chatsift::ChatsiftError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::classify::{Classification, OTHER_LABEL, TermPatterns};
use crate::core::identity::SeenIds;
use crate::core::record::SearchRecord;

/// How records from different streams interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// One shared identity gate across all streams.
    #[default]
    Deduplicated,
    /// Every stream counted independently, no deduplication.
    PerStream,
}

/// What kind of stream a summary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// JSONL documents; feed every counter.
    Jsonl,
    /// `Prompt:` lines of a human-readable export; feed per-stream counts,
    /// group prompt totals and details only.
    Human,
}

/// Label → count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: BTreeMap<String, usize>,
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for `label`, zero when never incremented.
    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    /// Adds every count of `other` into `self`.
    pub fn merge(&mut self, other: &CategoryCounts) {
        for (label, n) in &other.counts {
            *self.counts.entry(label.clone()).or_insert(0) += n;
        }
    }

    /// Sum over all labels.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, n)| (l.as_str(), *n))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Translated-record counts by group and source language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStats {
    per_group: BTreeMap<String, BTreeMap<String, usize>>,
    global: BTreeMap<String, usize>,
}

impl TranslationStats {
    pub fn record(&mut self, group: &str, lang: &str) {
        *self
            .per_group
            .entry(group.to_string())
            .or_default()
            .entry(lang.to_string())
            .or_insert(0) += 1;
        *self.global.entry(lang.to_string()).or_insert(0) += 1;
    }

    /// Translated records in `group`.
    pub fn group_total(&self, group: &str) -> usize {
        self.per_group
            .get(group)
            .map(|by_lang| by_lang.values().sum())
            .unwrap_or(0)
    }

    /// Counts by language for one group.
    pub fn group_by_lang(&self, group: &str) -> Option<&BTreeMap<String, usize>> {
        self.per_group.get(group)
    }

    /// Global counts by language.
    pub fn global(&self) -> &BTreeMap<String, usize> {
        &self.global
    }

    pub fn global_total(&self) -> usize {
        self.global.values().sum()
    }

    /// Groups with at least one translated record, in byte order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.per_group.keys().map(String::as_str)
    }

    /// Every language seen, sorted.
    pub fn languages(&self) -> BTreeSet<&str> {
        self.per_group
            .values()
            .flat_map(|m| m.keys())
            .chain(self.global.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }
}

/// Counts for one input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    /// Stream (file) name.
    pub name: String,
    pub kind: StreamKind,
    /// Label counts of records counted from this stream.
    pub counts: CategoryCounts,
    /// Records with a non-empty prompt, per group.
    pub group_prompts: BTreeMap<String, usize>,
    /// Records counted from this stream.
    pub records: usize,
}

impl StreamSummary {
    fn new(name: &str, kind: StreamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            counts: CategoryCounts::new(),
            group_prompts: BTreeMap::new(),
            records: 0,
        }
    }
}

/// One classified record, for audit output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub widget: String,
    pub chat_id: String,
    pub session_id: String,
    pub created_at: String,
    /// Aggregate label (category, `Multiple` or `Other (no-term)`).
    pub term: String,
    /// Individually matched categories, comma-joined.
    pub matched_terms: String,
    pub translated_from: String,
    pub translated_to: String,
    /// The searchable text.
    pub full_message: String,
}

impl DetailRow {
    fn new(record: &SearchRecord, classification: &Classification, full_message: String) -> Self {
        let (from, to) = record
            .translation
            .as_ref()
            .map(|t| (t.from_lang.clone(), t.to_lang.clone()))
            .unwrap_or_default();
        Self {
            widget: record.group_key.clone(),
            chat_id: record.chat_id.clone(),
            session_id: record.session_id.clone().unwrap_or_default(),
            created_at: record.created_at.clone(),
            term: effective_label(record, classification).to_string(),
            matched_terms: classification.matched_joined(),
            translated_from: from,
            translated_to: to,
            full_message,
        }
    }
}

/// Operator-facing counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Streams opened (JSONL and human).
    pub streams: usize,
    /// Non-blank lines read across JSONL streams.
    pub lines_read: usize,
    /// Lines skipped as unparsable.
    pub malformed_lines: usize,
    /// Records skipped by the identity gate.
    pub duplicates_skipped: usize,
    /// JSONL records counted.
    pub documents_counted: usize,
    /// Human `Prompt:` lines counted.
    pub human_prompts: usize,
}

/// Process-scoped aggregation state for one run.
#[derive(Debug, Clone)]
pub struct AggregationState {
    mode: AggregationMode,
    collect_details: bool,
    seen: SeenIds,
    per_group: BTreeMap<String, CategoryCounts>,
    global: CategoryCounts,
    group_prompts: BTreeMap<String, usize>,
    translations: TranslationStats,
    streams: Vec<StreamSummary>,
    details: Vec<DetailRow>,
    stats: RunStats,
}

impl AggregationState {
    pub fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            collect_details: false,
            seen: SeenIds::new(),
            per_group: BTreeMap::new(),
            global: CategoryCounts::new(),
            group_prompts: BTreeMap::new(),
            translations: TranslationStats::default(),
            streams: Vec::new(),
            details: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// Keeps a [`DetailRow`] per counted record.
    #[must_use]
    pub fn with_details(mut self, collect: bool) -> Self {
        self.collect_details = collect;
        self
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Opens a new stream; subsequent records are attributed to it.
    pub fn begin_stream(&mut self, name: &str, kind: StreamKind) {
        self.streams.push(StreamSummary::new(name, kind));
        self.stats.streams += 1;
    }

    /// Notes one non-blank JSONL line read.
    pub fn note_line(&mut self) {
        self.stats.lines_read += 1;
    }

    /// Notes one unparsable line. It is not counted anywhere else.
    pub fn note_malformed(&mut self) {
        self.stats.malformed_lines += 1;
    }

    /// The identity gate. Always `true` in per-stream mode.
    ///
    /// In deduplicated mode, returns `true` and remembers `id` on first
    /// sight; later calls with the same id return `false` and count a duplicate.
    pub fn is_new(&mut self, id: &str) -> bool {
        if self.mode == AggregationMode::PerStream {
            return true;
        }
        if self.seen.is_new(id) {
            true
        } else {
            self.stats.duplicates_skipped += 1;
            trace!(id, "duplicate skipped");
            false
        }
    }

    /// Gates, classifies and ingests one JSONL record. Returns whether it was counted.
    pub fn offer(&mut self, record: &SearchRecord, patterns: &TermPatterns) -> bool {
        if !self.is_new(&record.id) {
            return false;
        }
        let classification = patterns.classify_document(record);
        self.ingest(record, &classification);
        true
    }

    /// Counts one record that already passed the identity gate.
    pub fn ingest(&mut self, record: &SearchRecord, classification: &Classification) {
        let label = effective_label(record, classification);
        let group = record.group_key.as_str();

        self.per_group
            .entry(group.to_string())
            .or_default()
            .increment(label);
        self.global.increment(label);

        if record.has_prompt() {
            *self.group_prompts.entry(group.to_string()).or_insert(0) += 1;
        }
        if let Some(t) = &record.translation {
            self.translations.record(group, &t.from_lang);
        }

        let stream = self.current_stream();
        stream.counts.increment(label);
        stream.records += 1;
        if record.has_prompt() {
            *stream.group_prompts.entry(group.to_string()).or_insert(0) += 1;
        }

        self.stats.documents_counted += 1;
        self.push_detail(record, classification);
    }

    /// Counts one human `Prompt:` record. Never gated and never part of category totals.
    pub fn ingest_human(&mut self, record: &SearchRecord, patterns: &TermPatterns) {
        let classification = patterns.classify_document(record);
        let label = effective_label(record, &classification);
        let group = record.group_key.clone();

        *self.group_prompts.entry(group.clone()).or_insert(0) += 1;
        let stream = self.current_stream();
        stream.counts.increment(label);
        stream.records += 1;
        *stream.group_prompts.entry(group).or_insert(0) += 1;

        self.stats.human_prompts += 1;
        if self.collect_details {
            self.details
                .push(DetailRow::new(record, &classification, record.prompt.clone()));
        }
    }

    fn push_detail(&mut self, record: &SearchRecord, classification: &Classification) {
        if self.collect_details {
            use crate::core::classify::Searchable;
            let text = record.searchable_text();
            self.details.push(DetailRow::new(record, classification, text));
        }
    }

    /// Records ingested before any `begin_stream` go to an anonymous stream.
    fn current_stream(&mut self) -> &mut StreamSummary {
        if self.streams.is_empty() {
            self.begin_stream("", StreamKind::Jsonl);
        }
        let last = self.streams.len() - 1;
        &mut self.streams[last]
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn global(&self) -> &CategoryCounts {
        &self.global
    }

    pub fn per_group(&self) -> &BTreeMap<String, CategoryCounts> {
        &self.per_group
    }

    /// Counts for one group, if it has any.
    pub fn group(&self, group: &str) -> Option<&CategoryCounts> {
        self.per_group.get(group)
    }

    /// Records with a non-empty prompt per group (human prompts included).
    pub fn group_prompts(&self) -> &BTreeMap<String, usize> {
        &self.group_prompts
    }

    pub fn translations(&self) -> &TranslationStats {
        &self.translations
    }

    pub fn streams(&self) -> &[StreamSummary] {
        &self.streams
    }

    pub fn details(&self) -> &[DetailRow] {
        &self.details
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Distinct ids seen by the identity gate.
    pub fn unique_ids(&self) -> usize {
        self.seen.len()
    }

    /// `true` when every global count equals the sum of its per-group counts.
    pub fn is_consistent(&self) -> bool {
        let mut summed = CategoryCounts::new();
        for counts in self.per_group.values() {
            summed.merge(counts);
        }
        summed == self.global
    }
}

/// Records without a prompt are always counted as "no category".
fn effective_label<'a>(record: &SearchRecord, classification: &'a Classification) -> &'a str {
    if record.has_prompt() {
        classification.label()
    } else {
        OTHER_LABEL
    }
}
