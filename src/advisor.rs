//! Advisory statistics over a run.
//!
//! Observes every scanned record and produces a free-text report: space
//! that could be reclaimed (stale installers, temp files) and folder names
//! suggested by high-frequency filename keywords. Purely informational;
//! nothing here influences planning or execution.

use crate::scanner::FileRecord;
use chrono::{DateTime, Duration, Local};
use std::collections::HashMap;
use std::path::PathBuf;

const INSTALLER_EXTENSIONS: &[&str] = &["exe", "msi", "dmg", "pkg", "iso"];
const TEMP_EXTENSIONS: &[&str] = &["tmp", "log", "bak", "chk", "dmp"];
const STALE_AFTER_DAYS: i64 = 60;
const SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Default)]
pub struct Advisor {
    file_count: usize,
    total_size: u64,
    keyword_counts: HashMap<String, usize>,
    stale_installers: Vec<(PathBuf, u64)>,
    temp_files: Vec<(PathBuf, u64)>,
}

impl Advisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the running statistics.
    pub fn observe(&mut self, record: &FileRecord) {
        self.file_count += 1;
        self.total_size += record.size;

        let clean: String = record
            .file_name
            .to_lowercase()
            .chars()
            .map(|c| match c {
                '.' | '_' | '-' => ' ',
                other => other,
            })
            .collect();
        for word in clean.split_whitespace() {
            if word.len() > 3 && word.chars().all(|c| c.is_alphabetic()) {
                *self.keyword_counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }

        if INSTALLER_EXTENSIONS.contains(&record.extension.as_str()) && is_stale(record) {
            self.stale_installers.push((record.path.clone(), record.size));
        }
        if TEMP_EXTENSIONS.contains(&record.extension.as_str()) {
            self.temp_files.push((record.path.clone(), record.size));
        }
    }

    /// Folder names suggested by keywords frequent enough to look like a
    /// real cluster: at least max(3, 5% of files), top ten keywords only.
    pub fn folder_suggestions(&self) -> Vec<String> {
        let threshold = std::cmp::max(3, self.file_count / 20);

        let mut ranked: Vec<(&String, &usize)> = self.keyword_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        ranked
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .filter(|(_, count)| **count >= threshold)
            .map(|(word, count)| {
                let title = title_case(word);
                format!(
                    "Detected cluster: '{}' ({} files). Suggestion: create folder '{}'",
                    title, count, title
                )
            })
            .collect()
    }

    /// Render the full advisory report.
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        let mut reclaimable: u64 = 0;

        let installer_bytes: u64 = self.stale_installers.iter().map(|(_, size)| size).sum();
        if installer_bytes > 0 {
            lines.push(format!(
                "[Space] Found {} old installers ({:.2} MB) suitable for deletion.",
                self.stale_installers.len(),
                megabytes(installer_bytes)
            ));
            reclaimable += installer_bytes;
        }

        let temp_bytes: u64 = self.temp_files.iter().map(|(_, size)| size).sum();
        if temp_bytes > 0 {
            lines.push(format!(
                "[Space] Found {} temporary files ({:.2} MB) suitable for deletion.",
                self.temp_files.len(),
                megabytes(temp_bytes)
            ));
            reclaimable += temp_bytes;
        }

        if reclaimable == 0 {
            lines.push("[Space] No significant space saving opportunities found.".to_string());
        } else {
            lines.push(format!(
                "[Summary] Total potential space savings: {:.2} MB",
                megabytes(reclaimable)
            ));
        }

        lines.extend(self.folder_suggestions());
        lines.join("\n")
    }
}

fn is_stale(record: &FileRecord) -> bool {
    let Ok(metadata) = std::fs::metadata(&record.path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    let modified: DateTime<Local> = modified.into();
    Local::now() - modified > Duration::days(STALE_AFTER_DAYS)
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
