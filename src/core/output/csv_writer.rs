//! CSV report writers.
//!
//! Each writer comes in two flavours: one over any [`io::Write`] and a
//! `*_csv` convenience that creates the file (and its parent directory).

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::aggregate::DetailRow;
use crate::core::report::{StreamTable, SummaryTable, TranslationRow, TranslationTable};
use crate::error::Result;

use super::{FileNamer, sanitize_cell};

/// Columns of a detail CSV.
pub const DETAIL_HEADER: [&str; 9] = [
    "widget",
    "chat_id",
    "session_id",
    "created_at",
    "term",
    "matched_terms",
    "translated_from",
    "translated_to",
    "full_message",
];

/// Label of the roll-up header row in the translation CSV.
pub const AGGREGATE_LABEL: &str = "Aggregate";

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

// =========================================================================
// Summary
// =========================================================================

/// `term,total_messages_containing,<groups...>`, one row per label.
pub fn write_summary<W: Write>(table: &SummaryTable, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec!["term".to_string(), "total_messages_containing".to_string()];
    header.extend(table.groups.iter().cloned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.label.clone(), row.total.to_string()];
        record.extend(row.per_group.iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary_csv(table: &SummaryTable, path: impl AsRef<Path>) -> Result<()> {
    write_summary(table, create(path.as_ref())?)
}

// =========================================================================
// Per-stream
// =========================================================================

/// `term,messages_containing` for one stream.
pub fn write_stream<W: Write>(table: &StreamTable, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["term", "messages_containing"])?;
    for (label, n) in &table.rows {
        writer.write_record([label.as_str(), n.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `<dir>/<stream stem>_summary.csv` and returns its path.
pub fn write_stream_csv(table: &StreamTable, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let stem = Path::new(&table.name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let path = dir.as_ref().join(format!("{stem}_summary.csv"));
    write_stream(table, create(&path)?)?;
    Ok(path)
}

// =========================================================================
// Translation
// =========================================================================

/// `widget,translated_total,<langs...>`, a blank line, an `Aggregate`
/// header row, then the `All widgets` roll-up.
pub fn write_translation<W: Write>(table: &TranslationTable, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec!["widget".to_string(), "translated_total".to_string()];
    header.extend(table.languages.iter().cloned());
    writer.write_record(&header)?;

    let record = |row: &TranslationRow| {
        let mut record = vec![row.widget.clone(), row.total.to_string()];
        record.extend(row.by_lang.iter().map(ToString::to_string));
        record
    };
    for row in &table.rows {
        writer.write_record(record(row))?;
    }

    let mut out = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    out.write_all(b"\n")?;
    let mut writer = csv::Writer::from_writer(out);
    let mut aggregate = vec![AGGREGATE_LABEL.to_string()];
    aggregate.resize(header.len(), String::new());
    writer.write_record(&aggregate)?;
    writer.write_record(record(&table.all_widgets))?;
    writer.flush()?;
    Ok(())
}

pub fn write_translation_csv(table: &TranslationTable, path: impl AsRef<Path>) -> Result<()> {
    write_translation(table, create(path.as_ref())?)
}

// =========================================================================
// Details
// =========================================================================

/// One row per classified record; `full_message` collapsed to one line.
pub fn write_details<'a, W, I>(rows: I, out: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a DetailRow>,
{
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(DETAIL_HEADER)?;
    for row in rows {
        writer.write_record([
            row.widget.as_str(),
            row.chat_id.as_str(),
            row.session_id.as_str(),
            row.created_at.as_str(),
            row.term.as_str(),
            row.matched_terms.as_str(),
            row.translated_from.as_str(),
            row.translated_to.as_str(),
            sanitize_cell(&row.full_message).as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_details_csv(rows: &[DetailRow], path: impl AsRef<Path>) -> Result<()> {
    write_details(rows, create(path.as_ref())?)
}

/// Writes one `details_<safe group>.csv` per group into `dir`.
///
/// Groups appear in first-seen order; colliding safe names get `_1`, `_2`, ...
pub fn write_details_per_group(rows: &[DetailRow], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut groups: Vec<(&str, Vec<&DetailRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(g, _)| *g == row.widget) {
            Some((_, items)) => items.push(row),
            None => groups.push((row.widget.as_str(), vec![row])),
        }
    }

    let mut namer = FileNamer::new();
    let mut paths = Vec::with_capacity(groups.len());
    for (group, items) in groups {
        let path = dir.join(format!("details_{}.csv", namer.unique(group)));
        write_details(items, create(&path)?)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Renders a CSV into a string, for callers that want it in memory.
pub fn to_csv_string(write: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> Result<String> {
    let mut buf = Vec::new();
    write(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}
