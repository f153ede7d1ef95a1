//! Configuration types for export and search runs.
//!
//! Plain builder-style structs with no CLI framework dependency; the binary
//! maps its flags onto these.
//!
//! - [`TranslationConfig`] - prompt translation during export
//! - [`ExportConfig`] - output layout and group filtering for `export`
//! - [`SearchConfig`] - aggregation mode and optional extras for `search`
//!
//! Line-reader tuning lives in [`StreamingConfig`](crate::streaming::StreamingConfig).
//!
//! # Example
//!
//! ```rust
//! use chatsift::config::{ExportConfig, TranslationConfig};
//!
//! let config = ExportConfig::new()
//!     .with_output_dir("out")
//!     .with_all_groups(true)
//!     .with_translation(TranslationConfig::new().with_enabled(true));
//!
//! assert!(config.translation.enabled);
//! assert_eq!(config.translation.target_lang, "en-US");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::aggregate::AggregationMode;

/// Default translation target.
pub const DEFAULT_TARGET_LANG: &str = "en-US";

/// Prompt translation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Run the translation provider during export (default: false)
    pub enabled: bool,

    /// Target language tag (default: `en-US`)
    pub target_lang: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_lang: DEFAULT_TARGET_LANG.to_string(),
        }
    }
}

impl TranslationConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables translation.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the target language. Blank tags keep the default.
    #[must_use]
    pub fn with_target_lang(mut self, lang: impl Into<String>) -> Self {
        let lang = lang.into();
        if !lang.trim().is_empty() {
            self.target_lang = lang.trim().to_string();
        }
        self
    }
}

/// Settings for the export pipeline.
///
/// Files land under `output_dir/jsonl/` and `output_dir/output/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root directory for all outputs (default: current directory)
    pub output_dir: PathBuf,

    /// Stem of the global JSONL file (default: `chats_export`)
    pub jsonl_name: String,

    /// Stem of the global human-readable file (default: `chats_export_human`)
    pub human_name: String,

    /// Export every group, not only those in the group map (default: false)
    pub all_groups: bool,

    /// Also write one JSONL/text pair per group (default: true)
    pub per_group: bool,

    /// Prompt translation settings
    pub translation: TranslationConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            jsonl_name: "chats_export".to_string(),
            human_name: "chats_export_human".to_string(),
            all_groups: false,
            per_group: true,
            translation: TranslationConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_jsonl_name(mut self, name: impl Into<String>) -> Self {
        self.jsonl_name = name.into();
        self
    }

    #[must_use]
    pub fn with_human_name(mut self, name: impl Into<String>) -> Self {
        self.human_name = name.into();
        self
    }

    #[must_use]
    pub fn with_all_groups(mut self, all: bool) -> Self {
        self.all_groups = all;
        self
    }

    #[must_use]
    pub fn with_per_group(mut self, per_group: bool) -> Self {
        self.per_group = per_group;
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: TranslationConfig) -> Self {
        self.translation = translation;
        self
    }

    /// Directory holding JSONL outputs.
    pub fn jsonl_dir(&self) -> PathBuf {
        self.output_dir.join("jsonl")
    }

    /// Directory holding human-readable outputs.
    pub fn human_dir(&self) -> PathBuf {
        self.output_dir.join("output")
    }

    /// Path of the global JSONL file.
    pub fn global_jsonl_path(&self) -> PathBuf {
        self.jsonl_dir().join(format!("{}.jsonl", self.jsonl_name))
    }

    /// Path of the global human-readable file.
    pub fn global_human_path(&self) -> PathBuf {
        self.human_dir().join(format!("{}.txt", self.human_name))
    }
}

/// Settings for a search/aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Deduplicated aggregate or independent per-stream counting
    pub mode: AggregationMode,

    /// Keep one detail row per classified document (default: false)
    pub collect_details: bool,

    /// Directory of human-readable exports to scan for `Prompt:` lines
    pub scan_human_dir: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: AggregationMode::Deduplicated,
            collect_details: false,
            scan_human_dir: None,
        }
    }
}

impl SearchConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_details(mut self, collect: bool) -> Self {
        self.collect_details = collect;
        self
    }

    #[must_use]
    pub fn with_scan_human_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.scan_human_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}
