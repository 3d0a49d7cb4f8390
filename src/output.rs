//! User-facing CLI output.
//!
//! Centralizes colored status lines, the streaming spinner and the
//! post-run summary so formatting stays consistent across commands.
//! Diagnostic logging goes through the `log` facade instead; this module
//! is only for what the user is meant to read.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub struct OutputFormatter;

impl OutputFormatter {
    /// Green checkmark line.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red cross line, sent to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Yellow warning line.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Cyan informational line.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Banner shown before a simulated run.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Spinner shown while the pipeline streams through files.
    pub fn create_spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Per-group table of moved files plus a total row.
    ///
    /// `group_counts` maps the first path segment under the destination
    /// root to how many files landed there.
    pub fn summary_table(group_counts: &BTreeMap<String, usize>, total_moved: usize) {
        Self::header("SUMMARY");

        let max_group_len = group_counts
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Group".bold(),
            "Files".bold(),
            width = max_group_len
        );
        println!("{}", "-".repeat(max_group_len + 10));

        for (group, count) in group_counts {
            let file_word = if *count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                group,
                count.to_string().green(),
                file_word,
                width = max_group_len
            );
        }

        println!("{}", "-".repeat(max_group_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_moved.to_string().green().bold(),
            if total_moved == 1 { "file" } else { "files" },
            width = max_group_len
        );
    }

    /// Offer the post-run list of now-empty source directories.
    pub fn empty_dir_listing(empty_dirs: &[PathBuf]) {
        if empty_dirs.is_empty() {
            return;
        }
        Self::header("EMPTY SOURCE DIRECTORIES");
        Self::plain("These directories are now empty and can be removed by hand:");
        for dir in empty_dirs {
            println!(" - {}", dir.display());
        }
    }
}
