//! Command-line interface definition using clap.
//!
//! - [`Args`] - top-level arguments
//! - [`Command`] - `export` and `search` subcommands
//!
//! The argument structs convert into library configuration
//! ([`ExportConfig`], [`SearchConfig`]) so the binary stays a thin driver.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::{ExportConfig, SearchConfig, TranslationConfig};
use crate::core::aggregate::AggregationMode;

/// Normalize chat-widget exports into canonical documents and tally
/// them by search term, widget and language.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatsift")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatsift export --input raw.json --group-map embeds.csv
    chatsift export --input raw.json --all-groups --translate --target-lang en-US
    chatsift search --terms-file terms.txt --csv summary.csv --details details.csv
    chatsift search --per-file --file-csv-dir per_file
    chatsift search --scan-human output --translation-csv translations.csv")]
pub struct Args {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build canonical JSONL and human-readable exports from a raw dump
    Export(ExportArgs),
    /// Classify exported documents by search term and write reports
    Search(SearchArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExportArgs {
    /// Raw export (JSON array of groups, or {"embeds": [...]})
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output root (jsonl/ and output/ are created under it)
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Group id → display name map (.json, .csv or .tsv)
    #[arg(long, value_name = "FILE", env = "CHATSIFT_GROUP_MAP")]
    pub group_map: Option<PathBuf>,

    /// Export groups missing from the group map too
    #[arg(long)]
    pub all_groups: bool,

    /// Skip per-group files
    #[arg(long)]
    pub no_per_group: bool,

    /// Base name of the JSONL export
    #[arg(long, value_name = "NAME", default_value = "chats_export")]
    pub jsonl_name: String,

    /// Base name of the human-readable export
    #[arg(long, value_name = "NAME", default_value = "chats_export_human")]
    pub human_name: String,

    /// Translate prompts (needs a translation provider)
    #[arg(long)]
    pub translate: bool,

    /// Translation target language
    #[arg(long, value_name = "LANG", default_value = crate::config::DEFAULT_TARGET_LANG)]
    pub target_lang: String,
}

impl ExportArgs {
    /// Library configuration for these arguments.
    ///
    /// Without a group map every group is exported, since the filter would
    /// otherwise drop them all.
    pub fn to_config(&self) -> ExportConfig {
        ExportConfig::new()
            .with_output_dir(&self.out_dir)
            .with_jsonl_name(&self.jsonl_name)
            .with_human_name(&self.human_name)
            .with_all_groups(self.all_groups || self.group_map.is_none())
            .with_per_group(!self.no_per_group)
            .with_translation(
                TranslationConfig::new()
                    .with_enabled(self.translate)
                    .with_target_lang(&self.target_lang),
            )
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SearchArgs {
    /// Directory of JSONL exports
    #[arg(long, value_name = "DIR", default_value = "jsonl")]
    pub jsonl_dir: PathBuf,

    /// Terms file (literal | label=regex | r:regex per line)
    #[arg(long, value_name = "FILE", env = "CHATSIFT_TERMS_FILE")]
    pub terms_file: Option<PathBuf>,

    /// Extra literal term (repeatable)
    #[arg(short, long = "term", value_name = "TERM")]
    pub terms: Vec<String>,

    /// Count each file on its own, without cross-file deduplication
    #[arg(long)]
    pub per_file: bool,

    /// Print the per-widget breakdown
    #[arg(long)]
    pub per_widget: bool,

    /// Summary CSV (term totals per widget)
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Detail CSV, one row per classified message
    #[arg(long, value_name = "FILE")]
    pub details: Option<PathBuf>,

    /// Directory for per-widget detail CSVs
    #[arg(long, value_name = "DIR")]
    pub details_dir: Option<PathBuf>,

    /// Translation summary CSV
    #[arg(long, value_name = "FILE")]
    pub translation_csv: Option<PathBuf>,

    /// Directory for per-file summary CSVs
    #[arg(long, value_name = "DIR")]
    pub file_csv_dir: Option<PathBuf>,

    /// Also scan `Prompt:` lines of human-readable exports in this directory
    #[arg(long, value_name = "DIR")]
    pub scan_human: Option<PathBuf>,
}

impl SearchArgs {
    pub fn mode(&self) -> AggregationMode {
        if self.per_file {
            AggregationMode::PerStream
        } else {
            AggregationMode::Deduplicated
        }
    }

    pub fn to_config(&self) -> SearchConfig {
        let mut config = SearchConfig::new()
            .with_mode(self.mode())
            .with_details(self.details.is_some() || self.details_dir.is_some());
        if let Some(dir) = &self.scan_human {
            config = config.with_scan_human_dir(dir);
        }
        config
    }
}
