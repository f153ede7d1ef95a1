//! End-to-end CLI tests for chatsift.
//!
//! These tests run the actual binary with various arguments and check its
//! output and the files it writes.
//!
//! # Test Categories
//!
//! - **Export**: raw dump → JSONL and human-readable files
//! - **Search**: term tables, per-file mode, report CSVs, human scanning
//! - **Error handling**: configuration errors exit with status 1
//! - **Help and version**
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

const RAW_DUMP: &str = r#"{"embeds": [
  {"uuid": "aaa-111", "name": "Support Bot", "chats": [
    {"id": 1, "prompt": "I need a refund", "response": "OK", "createdAt": "2024-01-15T10:30:00Z"},
    {"id": 2, "prompt": "Where is my invoice?", "createdAt": 1705314660}
  ]},
  {"uuid": "bbb-222", "name": "Sales Bot", "chats": [
    {"id": 1, "prompt": "refund for this invoice", "createdAt": 1705314720000},
    {"id": 2, "prompt": "hello", "createdAt": "2024-01-15 10:33:00"}
  ]}
]}"#;

/// Creates a temporary directory holding `raw.json` and `terms.txt`.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("raw.json"), RAW_DUMP).unwrap();
    fs::write(dir.path().join("terms.txt"), "# terms\nrefund\n\ninvoice\n").unwrap();
    dir
}

fn chatsift_cmd() -> Command {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_chatsift"));
    cmd.env_remove("CHATSIFT_GROUP_MAP")
        .env_remove("CHATSIFT_TERMS_FILE")
        .env_remove("RUST_LOG");
    Command::from_std(cmd)
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

/// Runs `export` into the fixture directory and returns its JSONL directory.
fn export(fixtures: &TempDir) -> PathBuf {
    chatsift_cmd()
        .args([
            "export",
            "--input",
            path_str(&fixtures.path().join("raw.json")),
            "--out-dir",
            path_str(fixtures.path()),
        ])
        .assert()
        .success();
    fixtures.path().join("jsonl")
}

// ============================================================================
// Export
// ============================================================================

mod export_command {
    use super::*;

    #[test]
    fn test_export_basic() {
        let fixtures = setup_fixtures();
        chatsift_cmd()
            .args([
                "export",
                "-i",
                path_str(&fixtures.path().join("raw.json")),
                "-o",
                path_str(fixtures.path()),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Done! 4 documents written"))
            .stdout(predicate::str::contains("Summary"))
            .stdout(predicate::str::contains("documents/sec"));

        let jsonl = fs::read_to_string(fixtures.path().join("jsonl/chats_export.jsonl")).unwrap();
        assert_eq!(jsonl.lines().count(), 4);
        assert!(jsonl.contains("\"chat_id\":\"aaa-111:1\""));
        assert!(fixtures.path().join("jsonl/chats_export_Support_Bot.jsonl").exists());
        assert!(fixtures.path().join("output/chats_export_human_Sales_Bot.txt").exists());

        let human =
            fs::read_to_string(fixtures.path().join("output/chats_export_human.txt")).unwrap();
        assert!(human.contains("Prompt: I need a refund"));
    }

    #[test]
    fn test_export_no_per_group() {
        let fixtures = setup_fixtures();
        chatsift_cmd()
            .args([
                "export",
                "-i",
                path_str(&fixtures.path().join("raw.json")),
                "-o",
                path_str(fixtures.path()),
                "--no-per-group",
            ])
            .assert()
            .success();

        let files = fs::read_dir(fixtures.path().join("jsonl")).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_export_group_map_from_env() {
        let fixtures = setup_fixtures();
        let map = fixtures.path().join("map.json");
        fs::write(&map, r#"{"BBB-222": "Sales Widget"}"#).unwrap();

        chatsift_cmd()
            .env("CHATSIFT_GROUP_MAP", path_str(&map))
            .args([
                "export",
                "-i",
                path_str(&fixtures.path().join("raw.json")),
                "-o",
                path_str(fixtures.path()),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Unmapped:   1"));

        let jsonl = fs::read_to_string(fixtures.path().join("jsonl/chats_export.jsonl")).unwrap();
        assert_eq!(jsonl.lines().count(), 2);
        assert!(jsonl.contains("Sales Widget"));
    }

    #[test]
    fn test_translate_without_provider_skips() {
        let fixtures = setup_fixtures();
        chatsift_cmd()
            .args([
                "export",
                "-i",
                path_str(&fixtures.path().join("raw.json")),
                "-o",
                path_str(fixtures.path()),
                "--translate",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Translated: 0"));
    }
}

// ============================================================================
// Search
// ============================================================================

mod search_command {
    use super::*;

    #[test]
    fn test_search_prints_table() {
        let fixtures = setup_fixtures();
        let jsonl = export(&fixtures);

        chatsift_cmd()
            .args([
                "search",
                "--jsonl-dir",
                path_str(&jsonl),
                "--terms-file",
                path_str(&fixtures.path().join("terms.txt")),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Messages containing"))
            .stdout(predicate::str::contains("Multiple"))
            .stdout(predicate::str::contains("Counted:     4"))
            .stdout(predicate::str::contains("Duplicates:  4"));
    }

    #[test]
    fn test_search_terms_from_env_and_flags() {
        let fixtures = setup_fixtures();
        let jsonl = export(&fixtures);
        let csv = fixtures.path().join("summary.csv");

        chatsift_cmd()
            .env("CHATSIFT_TERMS_FILE", path_str(&fixtures.path().join("terms.txt")))
            .args([
                "search",
                "--jsonl-dir",
                path_str(&jsonl),
                "--term",
                "hello",
                "--csv",
                path_str(&csv),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Summary CSV"));

        let content = fs::read_to_string(&csv).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("term,total_messages_containing,Sales Bot,Support Bot")
        );
        assert_eq!(lines.next(), Some("refund,1,0,1"));
        assert_eq!(lines.next(), Some("invoice,1,0,1"));
        assert_eq!(lines.next(), Some("hello,1,1,0"));
        assert_eq!(lines.next(), Some("Multiple,1,1,0"));
        assert_eq!(lines.next(), Some("Other (no-term),0,0,0"));
    }

    #[test]
    fn test_search_per_file_reports() {
        let fixtures = setup_fixtures();
        let jsonl = export(&fixtures);
        let per_file = fixtures.path().join("per_file");
        let details_dir = fixtures.path().join("details");

        chatsift_cmd()
            .args([
                "search",
                "--jsonl-dir",
                path_str(&jsonl),
                "-t",
                "refund",
                "--per-file",
                "--per-widget",
                "--file-csv-dir",
                path_str(&per_file),
                "--details-dir",
                path_str(&details_dir),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("chats_export_Sales_Bot.jsonl"))
            .stdout(predicate::str::contains("Per widget"))
            .stdout(predicate::str::contains("Counted:     8"));

        assert!(per_file.join("chats_export_summary.csv").exists());
        assert!(per_file.join("chats_export_Support_Bot_summary.csv").exists());
        assert!(details_dir.join("details_Support_Bot.csv").exists());
        assert!(details_dir.join("details_Sales_Bot.csv").exists());
    }

    #[test]
    fn test_search_scan_human() {
        let fixtures = setup_fixtures();
        let jsonl = export(&fixtures);

        chatsift_cmd()
            .args([
                "search",
                "--jsonl-dir",
                path_str(&jsonl),
                "-t",
                "refund",
                "--scan-human",
                path_str(&fixtures.path().join("output")),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Human lines: 8"));
    }

    #[test]
    fn test_search_without_terms_warns() {
        let fixtures = setup_fixtures();
        let jsonl = export(&fixtures);

        chatsift_cmd()
            .args(["search", "--jsonl-dir", path_str(&jsonl)])
            .assert()
            .success()
            .stdout(predicate::str::contains("No terms configured"))
            .stdout(predicate::str::contains("Other (no-term)"));
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

mod error_handling {
    use super::*;

    #[test]
    fn test_export_nonexistent_input() {
        let fixtures = setup_fixtures();
        chatsift_cmd()
            .args([
                "export",
                "-i",
                "nonexistent_file.json",
                "-o",
                path_str(fixtures.path()),
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error"));
    }

    #[test]
    fn test_search_missing_dir() {
        let fixtures = setup_fixtures();
        chatsift_cmd()
            .args([
                "search",
                "--jsonl-dir",
                path_str(&fixtures.path().join("absent")),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error"));
    }

    #[test]
    fn test_invalid_pattern() {
        let fixtures = setup_fixtures();
        let jsonl = export(&fixtures);
        let terms = fixtures.path().join("bad_terms.txt");
        fs::write(&terms, "broken=(unclosed\n").unwrap();

        chatsift_cmd()
            .args([
                "search",
                "--jsonl-dir",
                path_str(&jsonl),
                "--terms-file",
                path_str(&terms),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("broken"));
    }

    #[test]
    fn test_missing_subcommand() {
        chatsift_cmd().assert().failure();
    }

    #[test]
    fn test_export_requires_input() {
        chatsift_cmd().args(["export"]).assert().failure();
    }
}

// ============================================================================
// Help and Version
// ============================================================================

mod help_and_version {
    use super::*;

    #[test]
    fn test_help_flag() {
        chatsift_cmd()
            .args(["--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("chatsift"))
            .stdout(predicate::str::contains("export"))
            .stdout(predicate::str::contains("search"));
    }

    #[test]
    fn test_search_help_lists_flags() {
        chatsift_cmd()
            .args(["search", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--scan-human"))
            .stdout(predicate::str::contains("--translation-csv"));
    }

    #[test]
    fn test_version_flag() {
        chatsift_cmd()
            .args(["--version"])
            .assert()
            .success()
            .stdout(predicate::str::contains("chatsift"))
            .stdout(predicate::str::contains("0."));
    }
}
