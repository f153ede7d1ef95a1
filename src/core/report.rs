//! Read-only report tables over a finished aggregation.
//!
//! Nothing here mutates [`AggregationState`]; the tables are plain data that
//! the CSV writers and the CLI render. Row order is fixed:
//!
//! - labels: declared categories, then `Multiple`, then `Other (no-term)`
//! - groups: case-insensitive by name (byte order breaks ties)
//! - languages: sorted

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::core::aggregate::{AggregationState, CategoryCounts, StreamKind, StreamSummary};
use crate::core::classify::TermPatterns;

/// Group name ordering used by every report.
pub fn compare_groups(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn sorted_groups<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut groups: Vec<String> = names.cloned().collect();
    groups.sort_by(|a, b| compare_groups(a, b));
    groups
}

// =========================================================================
// Category totals
// =========================================================================

/// One label's global and per-group counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub total: usize,
    /// Counts in [`SummaryTable::groups`] order.
    pub per_group: Vec<usize>,
}

/// The per-category totals table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTable {
    pub groups: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn build(state: &AggregationState, patterns: &TermPatterns) -> Self {
        let groups = sorted_groups(state.per_group().keys());
        let empty = CategoryCounts::new();
        let rows = patterns
            .report_labels()
            .into_iter()
            .map(|label| SummaryRow {
                total: state.global().get(&label),
                per_group: groups
                    .iter()
                    .map(|g| state.group(g).unwrap_or(&empty).get(&label))
                    .collect(),
                label,
            })
            .collect();
        Self { groups, rows }
    }

    /// Row for `label`, if reported.
    pub fn row(&self, label: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Sum of all label totals: the number of counted documents.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.total).sum()
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:25} {:>18}", "Term", "Messages containing")?;
        writeln!(f, "{}", "-".repeat(46))?;
        for row in &self.rows {
            writeln!(f, "{:25} {:>18}", row.label, row.total)?;
        }
        Ok(())
    }
}

// =========================================================================
// Per-stream
// =========================================================================

/// Label counts for one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamTable {
    pub name: String,
    pub human: bool,
    /// `(label, count)` in report order.
    pub rows: Vec<(String, usize)>,
    /// `(group, prompts)` in group order.
    pub group_prompts: Vec<(String, usize)>,
}

impl StreamTable {
    pub fn build(stream: &StreamSummary, patterns: &TermPatterns) -> Self {
        let rows = patterns
            .report_labels()
            .into_iter()
            .map(|label| {
                let n = stream.counts.get(&label);
                (label, n)
            })
            .collect();
        let group_prompts = sorted_groups(stream.group_prompts.keys())
            .into_iter()
            .map(|g| {
                let n = stream.group_prompts[&g];
                (g, n)
            })
            .collect();
        Self {
            name: stream.name.clone(),
            human: stream.kind == StreamKind::Human,
            rows,
            group_prompts,
        }
    }

    /// Every stream of a run, in processing order.
    pub fn build_all(state: &AggregationState, patterns: &TermPatterns) -> Vec<Self> {
        state
            .streams()
            .iter()
            .map(|s| Self::build(s, patterns))
            .collect()
    }

    /// Records counted from this stream.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|(_, n)| n).sum()
    }
}

/// Per-group prompt totals, in group order.
pub fn group_prompt_totals(state: &AggregationState) -> Vec<(String, usize)> {
    sorted_groups(state.group_prompts().keys())
        .into_iter()
        .map(|g| {
            let n = state.group_prompts()[&g];
            (g, n)
        })
        .collect()
}

// =========================================================================
// Translation
// =========================================================================

/// One row of the translation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRow {
    pub widget: String,
    pub total: usize,
    /// Counts in [`TranslationTable::languages`] order.
    pub by_lang: Vec<usize>,
}

/// Translated-record counts by group and source language, plus a roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationTable {
    pub languages: Vec<String>,
    pub rows: Vec<TranslationRow>,
    /// Global roll-up across all groups.
    pub all_widgets: TranslationRow,
}

/// Widget name of the roll-up row.
pub const ALL_WIDGETS: &str = "All widgets";

impl TranslationTable {
    pub fn build(state: &AggregationState) -> Self {
        let stats = state.translations();
        let languages: Vec<String> = stats.languages().into_iter().map(str::to_string).collect();

        let mut groups: Vec<&str> = stats.groups().collect();
        groups.sort_by(|a, b| compare_groups(a, b));

        let rows = groups
            .into_iter()
            .map(|g| {
                let by_lang = stats.group_by_lang(g);
                TranslationRow {
                    widget: g.to_string(),
                    total: stats.group_total(g),
                    by_lang: languages
                        .iter()
                        .map(|l| by_lang.and_then(|m| m.get(l)).copied().unwrap_or(0))
                        .collect(),
                }
            })
            .collect();

        let all_widgets = TranslationRow {
            widget: ALL_WIDGETS.to_string(),
            total: stats.global_total(),
            by_lang: languages
                .iter()
                .map(|l| stats.global().get(l).copied().unwrap_or(0))
                .collect(),
        };

        Self {
            languages,
            rows,
            all_widgets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
