//! Turns a verdict into a single planned filesystem action.

use crate::inference::Verdict;
use crate::scanner::FileRecord;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// What should happen to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Move,
    Trash,
    Skip,
}

/// One decided action. For trash plans the destination is a placeholder;
/// the real target is resolved under the timestamped trash root at
/// execution time.
#[derive(Debug, Clone)]
pub struct ActionPlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: ActionKind,
    pub reason: String,
}

/// Builds plans for a fixed destination root.
pub struct ActionPlanner {
    dest_root: PathBuf,
    copy_prefix: Regex,
    counter_suffix: Regex,
    separator_runs: Regex,
}

impl ActionPlanner {
    pub fn new(dest_root: &Path) -> Self {
        Self {
            dest_root: dest_root.to_path_buf(),
            copy_prefix: Regex::new(r"(?i)^copy of\s+").expect("invalid copy-prefix pattern"),
            counter_suffix: Regex::new(r"\s*\(\d+\)$").expect("invalid counter-suffix pattern"),
            separator_runs: Regex::new(r"[\s.]+").expect("invalid separator pattern"),
        }
    }

    /// Decide the action for one classified file.
    ///
    /// Duplicates are trashed regardless of their verdict. Everything else
    /// is moved to `dest_root/group/path/normalized_name`, unless it is
    /// already there, in which case the plan is a skip.
    pub fn plan(&self, record: &FileRecord, verdict: &Verdict, is_duplicate: bool) -> ActionPlan {
        if is_duplicate {
            return ActionPlan {
                source: record.path.clone(),
                destination: record.path.clone(),
                kind: ActionKind::Trash,
                reason: "Duplicate file detected".to_string(),
            };
        }

        let normalized = self.normalize_file_name(&record.file_name);
        let destination = self
            .dest_root
            .join(&verdict.group)
            .join(&verdict.path)
            .join(&normalized);

        if same_location(&record.path, &destination) {
            return ActionPlan {
                source: record.path.clone(),
                destination,
                kind: ActionKind::Skip,
                reason: "File already in correct location".to_string(),
            };
        }

        ActionPlan {
            source: record.path.clone(),
            destination,
            kind: ActionKind::Move,
            reason: format!("Organized into {}/{}", verdict.group, verdict.path),
        }
    }

    /// Clean up names mangled by downloads and OS-made copies: a leading
    /// "Copy of " and a trailing " (N)" counter are stripped, and runs of
    /// whitespace or dots inside the stem collapse to single underscores.
    /// The extension is preserved and the result is idempotent.
    pub fn normalize_file_name(&self, name: &str) -> String {
        let path = Path::new(name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        let extension = path.extension().map(|e| e.to_string_lossy().to_string());

        let stem = self.copy_prefix.replace(&stem, "");
        let stem = self.counter_suffix.replace(&stem, "");
        let stem = self.separator_runs.replace_all(&stem, "_");

        match extension {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem.into_owned(),
        }
    }
}

/// Whether two paths point at the same filesystem location. Falls back to
/// lexical comparison when either side cannot be resolved (for instance a
/// destination that does not exist yet).
fn same_location(source: &Path, destination: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(a), Ok(b)) => a == b,
        _ => source == destination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(path: &Path, file_name: &str) -> FileRecord {
        FileRecord {
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            extension: Path::new(file_name)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default(),
            parent_dir: String::new(),
            size: 0,
        }
    }

    fn verdict(group: &str, path: &str) -> Verdict {
        Verdict::new(group, path, 0.9, Vec::new())
    }

    #[test]
    fn test_normalize_strips_copy_prefix_and_counter() {
        let planner = ActionPlanner::new(Path::new("/dest"));
        assert_eq!(
            planner.normalize_file_name("Copy of Invoice (2).pdf"),
            "Invoice.pdf"
        );
        assert_eq!(planner.normalize_file_name("copy of notes.txt"), "notes.txt");
    }

    #[test]
    fn test_normalize_collapses_spaces_and_dots() {
        let planner = ActionPlanner::new(Path::new("/dest"));
        assert_eq!(
            planner.normalize_file_name("my  report. v3.pdf"),
            "my_report_v3.pdf"
        );
    }

    #[test]
    fn test_normalize_keeps_extension_and_plain_names() {
        let planner = ActionPlanner::new(Path::new("/dest"));
        assert_eq!(planner.normalize_file_name("archive.tar.gz"), "archive_tar.gz");
        assert_eq!(planner.normalize_file_name("README"), "README");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let planner = ActionPlanner::new(Path::new("/dest"));
        for name in [
            "Copy of Invoice (2).pdf",
            "my  report. v3.pdf",
            "plain_name.txt",
            "Copy of Copy of x.pdf",
        ] {
            let once = planner.normalize_file_name(name);
            let twice = planner.normalize_file_name(&once);
            assert_eq!(once, twice, "normalizing '{}' twice diverged", name);
        }
    }

    #[test]
    fn test_duplicate_is_always_trashed() {
        let planner = ActionPlanner::new(Path::new("/dest"));
        let record = record(Path::new("/src/b.txt"), "b.txt");
        let plan = planner.plan(&record, &verdict("Documents", "Work/Finance"), true);

        assert_eq!(plan.kind, ActionKind::Trash);
        assert_eq!(plan.reason, "Duplicate file detected");
    }

    #[test]
    fn test_move_plan_builds_destination_from_verdict() {
        let planner = ActionPlanner::new(Path::new("/dest"));
        let record = record(Path::new("/src/Copy of Invoice (2).pdf"), "Copy of Invoice (2).pdf");
        let plan = planner.plan(&record, &verdict("Documents", "Work/Finance"), false);

        assert_eq!(plan.kind, ActionKind::Move);
        assert_eq!(
            plan.destination,
            Path::new("/dest/Documents/Work/Finance/Invoice.pdf")
        );
        assert_eq!(plan.reason, "Organized into Documents/Work/Finance");
    }

    #[test]
    fn test_file_already_in_place_is_skipped() {
        let temp = TempDir::new().expect("temp dir");
        let target_dir = temp.path().join("Documents").join("Unsorted");
        fs::create_dir_all(&target_dir).expect("mkdir");
        let in_place = target_dir.join("settled.pdf");
        fs::write(&in_place, b"x").expect("write");

        let planner = ActionPlanner::new(temp.path());
        let record = record(&in_place, "settled.pdf");
        let plan = planner.plan(&record, &verdict("Documents", "Unsorted"), false);

        assert_eq!(plan.kind, ActionKind::Skip);
        assert_eq!(plan.reason, "File already in correct location");
    }
}
