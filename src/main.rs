//! # chatsift CLI
//!
//! Command-line interface for the chatsift library.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatsift::ChatsiftError;
use chatsift::cli::{Args, Command, ExportArgs, SearchArgs};
use chatsift::core::aggregate::{AggregationMode, AggregationState};
use chatsift::core::classify::TermPatterns;
use chatsift::core::export::run_export;
use chatsift::core::output::{
    write_details_csv, write_details_per_group, write_stream_csv, write_summary_csv,
    write_translation_csv,
};
use chatsift::core::report::{StreamTable, SummaryTable, TranslationTable, group_prompt_totals};
use chatsift::core::search::SearchRun;
use chatsift::core::DocumentBuilder;
use chatsift::groups::GroupNameMap;
use chatsift::progress::stderr_progress;
use chatsift::source::JsonFileSource;

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ChatsiftError> {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    println!("📦 chatsift v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match &args.command {
        Command::Export(export) => run_export_command(export),
        Command::Search(search) => run_search_command(search, args.verbose),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// =========================================================================
// export
// =========================================================================

fn run_export_command(args: &ExportArgs) -> Result<(), ChatsiftError> {
    let start = Instant::now();
    let config = args.to_config();

    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", config.output_dir.display());
    match &args.group_map {
        Some(path) => println!("🗺️  Map:     {}", path.display()),
        None => println!("🗺️  Map:     (none, exporting all groups)"),
    }
    if config.translation.enabled {
        println!("🌐 Translate to {}", config.translation.target_lang);
    }
    println!();

    let names = GroupNameMap::load_or_default(args.group_map.as_deref());
    let builder = DocumentBuilder::new(names).with_translation(config.translation.clone());
    let source = JsonFileSource::new(&args.input);

    println!("⏳ Building documents...");
    let summary = run_export(&source, &builder, &config)?;
    let elapsed = start.elapsed();

    println!();
    println!("✅ Done! {} documents written", summary.documents);
    println!("   {}", summary.global_jsonl.display());
    println!("   {}", summary.global_human.display());

    println!();
    println!("📊 Summary:");
    println!("   Groups:     {} seen, {} exported", summary.groups_seen, summary.groups_exported);
    if summary.groups_unmapped > 0 {
        println!("   Unmapped:   {} (use --all-groups to include)", summary.groups_unmapped);
    }
    if summary.groups_without_id > 0 {
        println!("   No id:      {}", summary.groups_without_id);
    }
    println!("   Documents:  {}", summary.documents);
    if config.translation.enabled {
        println!(
            "   Translated: {} ({} unchanged, {} skipped)",
            summary.translated, summary.unchanged, summary.translation_skipped
        );
    }
    if !summary.per_group.is_empty() {
        println!("   Per group:  {} file pairs", summary.per_group.len());
    }
    if summary.failed_writes > 0 {
        println!("⚠️  {} document writes failed (see log)", summary.failed_writes);
    }

    println!();
    println!("⚡ Performance:");
    println!("   Total time:  {:.2}s", elapsed.as_secs_f64());
    println!(
        "   Throughput:  {:.0} documents/sec",
        summary.documents as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

// =========================================================================
// search
// =========================================================================

fn load_patterns(args: &SearchArgs) -> Result<TermPatterns, ChatsiftError> {
    let mut patterns = match &args.terms_file {
        Some(path) => TermPatterns::from_terms_file(path)?,
        None => TermPatterns::new(),
    };
    for term in &args.terms {
        patterns.add_literal(term)?;
    }
    Ok(patterns)
}

fn run_search_command(args: &SearchArgs, verbose: bool) -> Result<(), ChatsiftError> {
    let start = Instant::now();
    let patterns = load_patterns(args)?;
    let config = args.to_config();

    println!("📂 JSONL:   {}", args.jsonl_dir.display());
    if let Some(dir) = &args.scan_human {
        println!("📄 Human:   {}", dir.display());
    }
    println!("🔎 Terms:   {}", patterns.len());
    match config.mode {
        AggregationMode::Deduplicated => println!("🧮 Mode:    deduplicated"),
        AggregationMode::PerStream => println!("🧮 Mode:    per file"),
    }
    if patterns.is_empty() {
        println!("⚠️  No terms configured; every message counts as no-term");
    }
    println!();

    let mut run = SearchRun::new(&patterns, config);
    if verbose {
        run = run.with_progress(stderr_progress());
    }
    println!("⏳ Scanning...");
    let state = run.run(&args.jsonl_dir)?;

    let summary = SummaryTable::build(&state, &patterns);
    println!();
    print!("{summary}");

    if args.per_file {
        print_streams(&state, &patterns);
    }
    if args.per_widget {
        print_widgets(&state, &summary);
    }

    write_reports(args, &state, &summary, &patterns);

    let stats = state.stats();
    let elapsed = start.elapsed();
    println!();
    println!("📊 Summary:");
    println!("   Streams:     {}", stats.streams);
    println!("   Lines:       {}", stats.lines_read);
    println!("   Counted:     {}", stats.documents_counted);
    if stats.human_prompts > 0 {
        println!("   Human lines: {}", stats.human_prompts);
    }
    if stats.duplicates_skipped > 0 {
        println!("   Duplicates:  {}", stats.duplicates_skipped);
    }
    if stats.malformed_lines > 0 {
        println!("   Malformed:   {}", stats.malformed_lines);
    }

    println!();
    println!("⚡ Performance:");
    println!("   Total time:  {:.2}s", elapsed.as_secs_f64());
    println!(
        "   Throughput:  {:.0} lines/sec",
        stats.lines_read as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

fn print_streams(state: &AggregationState, patterns: &TermPatterns) {
    for table in StreamTable::build_all(state, patterns) {
        println!();
        let kind = if table.human { " (human)" } else { "" };
        println!("📄 {}{} - {} records", table.name, kind, table.total());
        for (label, n) in table.rows.iter().filter(|(_, n)| *n > 0) {
            println!("   {label:25} {n:>8}");
        }
        for (group, n) in &table.group_prompts {
            println!("   · {group}: {n} prompts");
        }
    }
}

fn print_widgets(state: &AggregationState, summary: &SummaryTable) {
    println!();
    println!("🧩 Per widget:");
    for (index, group) in summary.groups.iter().enumerate() {
        println!("   {group}");
        for row in summary.rows.iter().filter(|r| r.per_group[index] > 0) {
            println!("      {:25} {:>8}", row.label, row.per_group[index]);
        }
    }
    let prompts = group_prompt_totals(state);
    if !prompts.is_empty() {
        println!();
        println!("   Prompts per widget:");
        for (group, n) in prompts {
            println!("      {group:25} {n:>8}");
        }
    }
}

/// Report files are best-effort: a failed write is reported, not fatal.
fn write_reports(
    args: &SearchArgs,
    state: &AggregationState,
    summary: &SummaryTable,
    patterns: &TermPatterns,
) {
    let mut wrote_any = false;
    let mut report = |what: &str, path: &Path, result: Result<(), ChatsiftError>| {
        if !wrote_any {
            println!();
            wrote_any = true;
        }
        match result {
            Ok(()) => println!("💾 {what}: {}", path.display()),
            Err(e) => eprintln!("⚠️  {what} not written ({}): {e}", path.display()),
        }
    };

    if let Some(path) = &args.csv {
        report("Summary CSV", path, write_summary_csv(summary, path));
    }
    if let Some(path) = &args.details {
        report("Details CSV", path, write_details_csv(state.details(), path));
    }
    if let Some(dir) = &args.details_dir {
        let result = write_details_per_group(state.details(), dir).map(|files| {
            tracing::debug!(files = files.len(), "wrote per-widget details");
        });
        report("Per-widget details", dir, result);
    }
    if let Some(path) = &args.translation_csv {
        let table = TranslationTable::build(state);
        if table.is_empty() {
            println!("ℹ️  No translated records; translation CSV has only headers");
        }
        report("Translation CSV", path, write_translation_csv(&table, path));
    }
    if let Some(dir) = &args.file_csv_dir {
        let result = StreamTable::build_all(state, patterns)
            .iter()
            .try_for_each(|table| write_stream_csv(table, dir).map(|_| ()));
        report("Per-file CSVs", dir, result);
    }
}
