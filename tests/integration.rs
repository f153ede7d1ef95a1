//! Integration tests: raw dump → export → search → reports.

use chatsift::core::aggregate::AggregationMode;
use chatsift::core::classify::{MULTIPLE_LABEL, OTHER_LABEL};
use chatsift::core::output::csv_writer::{to_csv_string, write_summary, write_translation};
use chatsift::core::report::group_prompt_totals;
use chatsift::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Fixtures
// ============================================================================

const RAW_DUMP: &str = r#"{"embeds": [
  {"uuid": "E-ONE", "name": "Help Desk", "chats": [
    {"id": 1, "prompt": "Where is my invoice?", "response": "Check billing.", "createdAt": "2024-01-15T10:30:00Z", "sessionId": "s-1"},
    {"id": 2, "prompt": "I want a refund for my invoice", "createdAt": 1705314660000},
    {"id": 3, "prompt": "", "response": "hello?", "createdAt": "2024-01-15 10:32:00"}
  ]},
  {"uuid": "E-TWO", "name": "Pricing Page", "chats": [
    {"id": 1, "prompt": "Tell me about plans", "createdAt": 1705314720},
    {"uuid": "x-9", "prompt": "refund policy?", "createdAt": "2024-01-15T10:34:00+02:00"}
  ]},
  {"name": "orphan", "chats": [{"id": 5, "prompt": "refund"}]}
]}"#;

fn write_dump(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("raw.json");
    fs::write(&path, RAW_DUMP).unwrap();
    path
}

fn terms() -> TermPatterns {
    TermPatterns::from_literals(["invoice", "refund"]).unwrap()
}

/// Runs an export into `out` and returns its summary.
fn export_into(out: &TempDir) -> chatsift::core::ExportSummary {
    let raw = write_dump(out.path());
    let builder = DocumentBuilder::new(GroupNameMap::new());
    let config = ExportConfig::new()
        .with_output_dir(out.path())
        .with_all_groups(true);
    run_export(&JsonFileSource::new(raw), &builder, &config).unwrap()
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_writes_global_and_per_group() {
    let out = tempdir().unwrap();
    let summary = export_into(&out);

    assert_eq!(summary.groups_seen, 3);
    assert_eq!(summary.groups_without_id, 1);
    assert_eq!(summary.documents, 5);
    assert_eq!(summary.per_group.len(), 2);

    let jsonl = fs::read_to_string(&summary.global_jsonl).unwrap();
    let docs: Vec<CanonicalDocument> = jsonl
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(docs.len(), 5);
    assert!(docs.iter().all(|d| d.created_at.ends_with("+00:00")));
    assert_eq!(docs[0].id, "E-ONE:1");
    assert_eq!(docs[0].created_at, "2024-01-15T10:30:00+00:00");
    assert_eq!(docs[0].session_id.as_deref(), Some("s-1"));
    assert_eq!(docs[1].created_at, "2024-01-15T10:31:00+00:00");
    assert_eq!(docs[3].created_at, "2024-01-15T10:32:00+00:00");
    assert_eq!(docs[4].created_at, "2024-01-15T08:34:00+00:00");
    assert!(docs.iter().all(|d| d.created_at == d.prompt_date));

    let human = fs::read_to_string(&summary.global_human).unwrap();
    assert!(human.contains("Embed / Widget: Help Desk  (items: 3)"));
    assert!(human.contains("Prompt: refund policy?"));
}

#[test]
fn test_export_with_group_map_filters_and_renames() {
    let out = tempdir().unwrap();
    let raw = write_dump(out.path());
    let map_path = out.path().join("map.csv");
    fs::write(&map_path, "uuid,name\ne-two,Pricing Widget\n").unwrap();

    let builder = DocumentBuilder::new(GroupNameMap::from_path(&map_path).unwrap());
    let config = ExportConfig::new().with_output_dir(out.path());
    let summary = run_export(&JsonFileSource::new(raw), &builder, &config).unwrap();

    assert_eq!(summary.groups_unmapped, 1);
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.per_group[0].group, "Pricing Widget");
    assert!(
        summary.per_group[0]
            .jsonl
            .ends_with("jsonl/chats_export_Pricing_Widget.jsonl")
    );
}

// ============================================================================
// Search over exported files
// ============================================================================

#[test]
fn test_search_global_file_only() {
    let out = tempdir().unwrap();
    let raw = write_dump(out.path());
    let builder = DocumentBuilder::new(GroupNameMap::new());
    let config = ExportConfig::new()
        .with_output_dir(out.path())
        .with_all_groups(true)
        .with_per_group(false);
    run_export(&JsonFileSource::new(raw), &builder, &config).unwrap();

    let patterns = terms();
    let state = SearchRun::new(&patterns, SearchConfig::new())
        .run(config.jsonl_dir())
        .unwrap();

    let stats = state.stats();
    assert_eq!(stats.documents_counted, 5);
    assert_eq!(stats.duplicates_skipped, 0);
    assert_eq!(state.global().get("invoice"), 1);
    assert_eq!(state.global().get("refund"), 1);
    assert_eq!(state.global().get(MULTIPLE_LABEL), 1);
    assert_eq!(state.global().get(OTHER_LABEL), 2);
    assert!(state.is_consistent());
}

#[test]
fn test_dedup_across_global_and_group_files() {
    let out = tempdir().unwrap();
    let summary = export_into(&out);
    let patterns = terms();
    let jsonl_dir = summary.global_jsonl.parent().unwrap();

    let dedup = SearchRun::new(&patterns, SearchConfig::new())
        .run(jsonl_dir)
        .unwrap();
    assert_eq!(dedup.stats().streams, 3);
    assert_eq!(dedup.stats().documents_counted, 5);
    assert_eq!(dedup.stats().duplicates_skipped, 5);
    assert_eq!(dedup.unique_ids(), 5);

    let per_file = SearchRun::new(
        &patterns,
        SearchConfig::new().with_mode(AggregationMode::PerStream),
    )
    .run(jsonl_dir)
    .unwrap();
    assert_eq!(per_file.stats().documents_counted, 10);
    assert_eq!(per_file.stats().duplicates_skipped, 0);
    assert_eq!(per_file.global().get(OTHER_LABEL), 4);
    assert!(per_file.is_consistent());
}

#[test]
fn test_summary_table_and_csv() {
    let out = tempdir().unwrap();
    let summary = export_into(&out);
    let patterns = terms();
    let state = SearchRun::new(&patterns, SearchConfig::new())
        .run(summary.global_jsonl.parent().unwrap())
        .unwrap();

    let table = SummaryTable::build(&state, &patterns);
    assert_eq!(table.groups, ["Help Desk", "Pricing Page"]);
    let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["invoice", "refund", MULTIPLE_LABEL, OTHER_LABEL]);
    assert_eq!(table.total(), 5);
    assert_eq!(table.row("refund").unwrap().per_group, [0, 1]);

    let csv = to_csv_string(|buf| write_summary(&table, buf)).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("term,total_messages_containing,Help Desk,Pricing Page")
    );
    assert_eq!(lines.next(), Some("invoice,1,1,0"));

    let prompts = group_prompt_totals(&state);
    assert_eq!(
        prompts,
        [("Help Desk".to_string(), 2), ("Pricing Page".to_string(), 2)]
    );
}

#[test]
fn test_translation_flows_through_search() {
    let out = tempdir().unwrap();
    let raw = write_dump(out.path());
    let builder = DocumentBuilder::new(GroupNameMap::new())
        .with_translation(TranslationConfig::new().with_enabled(true))
        .with_translator(FnTranslator::new(|text: &str, _: &str| {
            if text.contains("refund") {
                Translated::new(format!("[en] {text}"), Some("de".into()))
            } else {
                Translated::new(text, Some("en".into()))
            }
        }));
    let config = ExportConfig::new()
        .with_output_dir(out.path())
        .with_all_groups(true)
        .with_per_group(false);
    let summary = run_export(&JsonFileSource::new(raw), &builder, &config).unwrap();
    assert_eq!(summary.translated, 2);

    let human = fs::read_to_string(&summary.global_human).unwrap();
    assert!(human.contains("Prompt (translated from de to en-US): [en] refund policy?"));

    let patterns = terms();
    let state = SearchRun::new(&patterns, SearchConfig::new())
        .run(config.jsonl_dir())
        .unwrap();
    let table = TranslationTable::build(&state);
    assert_eq!(table.languages, ["de"]);
    assert_eq!(table.all_widgets.total, 2);
    assert_eq!(table.rows.len(), 2);

    let csv = to_csv_string(|buf| write_translation(&table, buf)).unwrap();
    assert!(csv.contains("All widgets,2,2"));
}

// ============================================================================
// Human-readable scanning
// ============================================================================

#[test]
fn test_scan_human_adds_prompts_not_totals() {
    let out = tempdir().unwrap();
    let summary = export_into(&out);
    let patterns = terms();
    let config = SearchConfig::new().with_scan_human_dir(summary.global_human.parent().unwrap());
    let state = SearchRun::new(&patterns, config)
        .run(summary.global_jsonl.parent().unwrap())
        .unwrap();

    let stats = state.stats();
    assert_eq!(stats.documents_counted, 5);
    assert_eq!(stats.streams, 6);
    // 4 non-empty prompts, each printed twice (global + per-group file).
    assert_eq!(stats.human_prompts, 8);
    assert_eq!(state.global().total(), 5);

    let human_streams: Vec<_> = StreamTable::build_all(&state, &patterns)
        .into_iter()
        .filter(|t| t.human)
        .collect();
    assert_eq!(human_streams.len(), 3);
    assert_eq!(human_streams.iter().map(StreamTable::total).sum::<usize>(), 8);
}

#[test]
fn test_missing_jsonl_dir_is_an_error() {
    let dir = tempdir().unwrap();
    let patterns = terms();
    let err = SearchRun::new(&patterns, SearchConfig::new())
        .run(dir.path().join("absent"))
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_malformed_lines_are_counted() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("a.jsonl"),
        "{\"id\": \"1\", \"prompt\": \"refund\"}\nnot json\n\n[1,2]\n{\"id\": \"2\", \"prompt\": \"ok\"}\n",
    )
    .unwrap();
    let patterns = terms();
    let state = SearchRun::new(&patterns, SearchConfig::new())
        .run(dir.path())
        .unwrap();
    let stats = state.stats();
    assert_eq!(stats.lines_read, 4);
    assert_eq!(stats.malformed_lines, 2);
    assert_eq!(stats.documents_counted, 2);
}
