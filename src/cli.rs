//! Command-line interface.
//!
//! A thin shell over the library: parse arguments, load the taxonomy,
//! run the pipeline, render the result. All decisions live in the
//! pipeline modules.

use crate::output::OutputFormatter;
use crate::pipeline::{self, RunOptions, RunResult};
use crate::taxonomy::TaxonomyStore;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "orderly")]
#[command(about = "Classify files from messy folders into an organized hierarchy", long_about = None)]
pub struct Cli {
    /// Source directories to scan (nonexistent entries are skipped)
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Destination root for the organized hierarchy
    #[arg(short, long)]
    pub dest: PathBuf,

    /// Apply the plan; without this flag the run is a dry-run
    #[arg(long)]
    pub apply: bool,

    /// Rely on keyword rules only, skipping the heuristic classifier
    #[arg(long)]
    pub no_heuristic: bool,

    /// Comma-separated context keywords (e.g. "university,thesis")
    #[arg(long)]
    pub context: Option<String>,

    /// Explicit taxonomy file (TOML); defaults to the config cascade
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the full CLI flow for parsed arguments.
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let store = TaxonomyStore::open(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let config = store.current();

    let options = RunOptions {
        simulate: !cli.apply,
        use_heuristic: !cli.no_heuristic,
        context_keywords: parse_context(cli.context.as_deref()),
    };

    if options.simulate {
        OutputFormatter::dry_run_notice(
            "Simulating only; re-run with --apply to move files for real.",
        );
    }
    OutputFormatter::info(&format!(
        "Organizing {} source(s) into {}",
        cli.sources.len(),
        cli.dest.display()
    ));

    let spinner = OutputFormatter::create_spinner("Scanning and classifying...");
    let result = pipeline::run(&cli.sources, &cli.dest, &config, &options);
    spinner.finish_and_clear();

    let result = result.map_err(|e| e.to_string())?;
    render(&result, &cli.dest, options.simulate);
    Ok(())
}

fn parse_context(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn render(result: &RunResult, dest_root: &Path, simulated: bool) {
    OutputFormatter::success(&format!(
        "Processed {} file(s) in {:.2}s",
        result.processed,
        result.elapsed.as_secs_f64()
    ));

    if simulated {
        OutputFormatter::plain(
            "No files were modified. Planned actions were logged above.",
        );
    } else {
        OutputFormatter::summary_table(&group_counts(result, dest_root), result.moved.len());
        if !result.created_dirs.is_empty() {
            OutputFormatter::header("CREATED DIRECTORIES");
            for dir in &result.created_dirs {
                println!(" - {}", dir.display());
            }
        }
        OutputFormatter::empty_dir_listing(&result.empty_dirs);
    }

    OutputFormatter::header("ADVISORY REPORT");
    OutputFormatter::plain(&result.advisory);
}

/// Count moved files by their first path segment under the destination
/// root (the extension group, or `.trash` for duplicates).
fn group_counts(result: &RunResult, dest_root: &Path) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for (_, destination) in &result.moved {
        let group = destination
            .strip_prefix(dest_root)
            .ok()
            .and_then(|rel| rel.components().next())
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .unwrap_or_else(|| "other".to_string());
        *counts.entry(group).or_insert(0) += 1;
    }
    counts
}
