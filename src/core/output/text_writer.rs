//! Human-readable export writer.
//!
//! Documents are grouped by group key (groups in name order, documents by
//! creation time). Each document gets a `Prompt:` line, which is what
//! `search --scan-human` reads back.

use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::core::record::UNKNOWN_LANG;
use crate::core::report::compare_groups;
use crate::document::CanonicalDocument;
use crate::error::Result;
use crate::parsing::format_utc;

const RULE_WIDTH: usize = 80;

/// Renders documents in the human-readable layout, stamped with `generated_at`.
pub fn to_human<'a>(
    docs: impl IntoIterator<Item = &'a CanonicalDocument>,
    generated_at: &str,
) -> String {
    let docs: Vec<&CanonicalDocument> = docs.into_iter().collect();
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let mut out = String::new();
    out.push_str(&format!("Export generated: {generated_at}\n"));
    out.push_str(&format!("Total items: {}\n\n", docs.len()));

    let mut groups: Vec<(&str, Vec<&CanonicalDocument>)> = Vec::new();
    for doc in docs {
        match groups.iter_mut().find(|(g, _)| *g == doc.group_key) {
            Some((_, items)) => items.push(doc),
            None => groups.push((doc.group_key.as_str(), vec![doc])),
        }
    }
    groups.sort_by(|a, b| compare_groups(a.0, b.0));

    for (group, mut items) in groups {
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        out.push_str(&format!("{heavy}\nEmbed / Widget: {group}  (items: {})\n{heavy}\n\n", items.len()));

        for doc in items {
            out.push_str(&format!("Chat ID: {}\n", doc.id));
            if let Some(session) = &doc.session_id {
                out.push_str(&format!("Session ID: {session}\n"));
            }
            if !doc.prompt_date.is_empty() {
                out.push_str(&format!("Prompt date: {}\n", doc.prompt_date));
            }
            out.push_str(&format!("Created: {}\n", doc.created_at));
            out.push_str(&format!("Prompt: {}\n", doc.prompt));

            if let Some(t) = &doc.translation {
                let from = Some(t.from_lang.as_str())
                    .filter(|l| !l.is_empty())
                    .or(doc.language.as_deref())
                    .unwrap_or(UNKNOWN_LANG);
                out.push_str(&format!(
                    "Prompt (translated from {from} to {}): {}\n",
                    t.to_lang, t.translated_prompt
                ));
            }

            let response = doc.response.trim();
            if !response.is_empty() {
                out.push_str("Answer:\n");
                out.push_str(response);
                out.push('\n');
            }

            if !doc.source_metadata.is_empty() {
                out.push_str("\nSource metadata:\n");
                match serde_json::to_string_pretty(&doc.source_metadata) {
                    Ok(json) => out.push_str(&json),
                    Err(_) => out.push_str(&format!("{:?}", doc.source_metadata)),
                }
                out.push('\n');
            }
            out.push_str(&light);
            out.push_str("\n\n");
        }
    }
    out
}

/// Writes the human-readable export to `path`, stamped with the current time.
pub fn write_human<'a>(
    docs: impl IntoIterator<Item = &'a CanonicalDocument>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_human(docs, &format_utc(Utc::now())))?;
    Ok(())
}
