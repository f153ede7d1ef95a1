//! The export pipeline.
//!
//! Raw groups from a [`RawRecordSource`] are built into canonical documents,
//! finalized (translation), and written as:
//!
//! - `<out>/jsonl/<jsonl_name>.jsonl` and `<out>/output/<human_name>.txt`
//!   with every document
//! - one JSONL and one text file per group, named after the group
//!
//! A failed write is counted in [`ExportSummary::failed_writes`] and logged;
//! it never stops the export.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::core::builder::{DocumentBuilder, TranslationStatus};
use crate::core::output::{FileNamer, JsonlWriter, write_human};
use crate::document::CanonicalDocument;
use crate::error::Result;
use crate::source::RawRecordSource;

/// Files written for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFiles {
    pub group: String,
    pub documents: usize,
    pub jsonl: PathBuf,
    pub human: PathBuf,
}

/// What an export run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Groups supplied by the source.
    pub groups_seen: usize,
    /// Groups that produced documents.
    pub groups_exported: usize,
    /// Groups without an identifier.
    pub groups_without_id: usize,
    /// Groups left out because they are not in the name map.
    pub groups_unmapped: usize,
    pub documents: usize,
    pub translated: usize,
    pub translation_skipped: usize,
    pub unchanged: usize,
    /// Document writes that failed (per file).
    pub failed_writes: usize,
    pub global_jsonl: PathBuf,
    pub global_human: PathBuf,
    pub per_group: Vec<GroupFiles>,
}

impl ExportSummary {
    fn count(&mut self, status: TranslationStatus) {
        match status {
            TranslationStatus::Translated => self.translated += 1,
            TranslationStatus::Skipped => self.translation_skipped += 1,
            TranslationStatus::Unchanged => self.unchanged += 1,
        }
    }
}

/// Builds and finalizes every document of `source`, grouped by group key.
///
/// Groups without an id are skipped. Unless `config.all_groups` is set, only
/// groups present in the builder's name map are kept.
pub fn build_documents(
    source: &dyn RawRecordSource,
    builder: &DocumentBuilder,
    config: &ExportConfig,
    summary: &mut ExportSummary,
) -> Result<Vec<(String, Vec<CanonicalDocument>)>> {
    let groups = source.groups()?;
    summary.groups_seen = groups.len();
    info!(source = %source.describe(), groups = groups.len(), "building documents");

    let mut by_group: Vec<(String, Vec<CanonicalDocument>)> = Vec::new();
    for group in &groups {
        let resolved = builder.resolve_group(&group.metadata);
        if resolved.id.is_empty() {
            warn!("skipping group without an identifier");
            summary.groups_without_id += 1;
            continue;
        }
        if !config.all_groups && !builder.is_mapped(&resolved.id) {
            debug!(group = %resolved.id, "not in group map, skipped");
            summary.groups_unmapped += 1;
            continue;
        }

        let mut docs = Vec::with_capacity(group.records.len());
        for (index, raw) in group.records.iter().enumerate() {
            let mut doc = builder.build_resolved(&resolved, raw, index);
            summary.count(builder.finalize(&mut doc));
            docs.push(doc);
        }
        debug!(group = %resolved.name, documents = docs.len(), "built group");
        summary.documents += docs.len();

        match by_group.iter_mut().find(|(name, _)| *name == resolved.name) {
            Some((_, existing)) => existing.extend(docs),
            None => by_group.push((resolved.name, docs)),
        }
    }
    summary.groups_exported = by_group.iter().filter(|(_, d)| !d.is_empty()).count();
    Ok(by_group)
}

/// Runs the full export.
pub fn run_export(
    source: &dyn RawRecordSource,
    builder: &DocumentBuilder,
    config: &ExportConfig,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary {
        global_jsonl: config.global_jsonl_path(),
        global_human: config.global_human_path(),
        ..ExportSummary::default()
    };
    let by_group = build_documents(source, builder, config, &mut summary)?;

    let all: Vec<&CanonicalDocument> = by_group.iter().flat_map(|(_, docs)| docs).collect();
    summary.failed_writes += write_jsonl_counted(&all, &summary.global_jsonl);
    summary.failed_writes += write_human_counted(&all, &summary.global_human);

    if config.per_group {
        let jsonl_dir = config.jsonl_dir();
        let human_dir = config.human_dir();
        let mut namer = FileNamer::new();
        for (group, docs) in &by_group {
            if docs.is_empty() {
                continue;
            }
            let safe = namer.unique(group);
            let files = GroupFiles {
                group: group.clone(),
                documents: docs.len(),
                jsonl: jsonl_dir.join(format!("{}_{safe}.jsonl", config.jsonl_name)),
                human: human_dir.join(format!("{}_{safe}.txt", config.human_name)),
            };
            let refs: Vec<&CanonicalDocument> = docs.iter().collect();
            summary.failed_writes += write_jsonl_counted(&refs, &files.jsonl);
            summary.failed_writes += write_human_counted(&refs, &files.human);
            summary.per_group.push(files);
        }
    }

    info!(
        documents = summary.documents,
        translated = summary.translated,
        skipped = summary.translation_skipped,
        unchanged = summary.unchanged,
        failed_writes = summary.failed_writes,
        "export finished"
    );
    Ok(summary)
}

/// Writes `docs` to `path`; returns how many documents failed to land.
fn write_jsonl_counted(docs: &[&CanonicalDocument], path: &Path) -> usize {
    let mut writer = match JsonlWriter::create(path) {
        Ok(w) => w,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot create JSONL file");
            return docs.len();
        }
    };
    let mut failed = 0;
    for doc in docs {
        if let Err(e) = writer.write(doc) {
            warn!(id = %doc.id, path = %path.display(), error = %e, "document write failed");
            failed += 1;
        }
    }
    if let Err(e) = writer.finish() {
        warn!(path = %path.display(), error = %e, "flush failed");
        return docs.len();
    }
    failed
}

fn write_human_counted(docs: &[&CanonicalDocument], path: &Path) -> usize {
    match write_human(docs.iter().copied(), path) {
        Ok(()) => 0,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot write human-readable file");
            docs.len()
        }
    }
}
