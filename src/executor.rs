//! Applies (or simulates) planned actions on the filesystem.
//!
//! The executor is the only component that mutates anything. In simulate
//! mode it logs intended actions and touches nothing. In apply mode it
//! creates destination directories on demand, never overwrites an existing
//! file (same-name collisions get a `_1`, `_2`, ... suffix), and treats
//! every per-file failure as log-and-continue.

use crate::planner::{ActionKind, ActionPlan};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Executes plans against a destination root.
pub struct Executor {
    dest_root: PathBuf,
    simulate: bool,
    trash_dir: PathBuf,
    created_dirs: BTreeSet<PathBuf>,
    moved: Vec<(PathBuf, PathBuf)>,
}

impl Executor {
    /// `simulate = true` disables all filesystem mutation.
    ///
    /// Trashed duplicates of this run share one timestamped directory
    /// under `dest_root/.trash/`.
    pub fn new(dest_root: &Path, simulate: bool) -> Self {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        Self {
            dest_root: dest_root.to_path_buf(),
            simulate,
            trash_dir: dest_root.join(".trash").join(stamp),
            created_dirs: BTreeSet::new(),
            moved: Vec::new(),
        }
    }

    /// Apply one plan. Never fails: problems are logged and the run
    /// continues with the next file.
    pub fn execute(&mut self, plan: &ActionPlan) {
        let target = match plan.kind {
            ActionKind::Skip => {
                log::info!("[SKIP] {} ({})", plan.source.display(), plan.reason);
                return;
            }
            ActionKind::Trash => {
                let name = plan.source.file_name().unwrap_or_else(|| OsStr::new("file"));
                self.trash_dir.join(name)
            }
            ActionKind::Move => plan.destination.clone(),
        };

        let prefix = if self.simulate { "[DRY-RUN]" } else { "[EXECUTE]" };
        log::info!(
            "{} {:?}: '{}' -> '{}' ({})",
            prefix,
            plan.kind,
            plan.source.display(),
            target.display(),
            plan.reason
        );

        if self.simulate {
            return;
        }
        self.perform_move(&plan.source, &target);
    }

    fn perform_move(&mut self, source: &Path, target: &Path) {
        let Some(parent) = target.parent() else {
            log::error!("target {} has no parent directory", target.display());
            return;
        };

        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::error!("failed to create {}: {}", parent.display(), e);
                return;
            }
            self.created_dirs.insert(parent.to_path_buf());
        }

        let final_target = resolve_collision(target);
        if let Err(e) = move_file(source, &final_target) {
            log::error!("failed to move {}: {}", source.display(), e);
            return;
        }
        self.moved.push((source.to_path_buf(), final_target));
    }

    /// (source, destination) pairs actually moved this run.
    pub fn moved(&self) -> &[(PathBuf, PathBuf)] {
        &self.moved
    }

    /// Destination directories newly created this run, sorted.
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.created_dirs.iter().cloned().collect()
    }

    /// Write the run's moves as a JSON history document under the
    /// destination root, enabling inspection and manual reversal.
    pub fn save_history(&self) -> io::Result<PathBuf> {
        let history = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "destination_root": self.dest_root.to_string_lossy().to_string(),
            "moves": self.moved.iter().map(|(from, to)| {
                serde_json::json!({
                    "from": from.to_string_lossy().to_string(),
                    "to": to.to_string_lossy().to_string(),
                })
            }).collect::<Vec<_>>(),
        });

        let body = serde_json::to_string_pretty(&history)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let path = self.dest_root.join(".orderly_history.json");
        fs::write(&path, body)?;
        Ok(path)
    }
}

/// First free name at the target location: the path itself, else
/// `stem_1.ext`, `stem_2.ext`, ... checked strictly in sequence.
fn resolve_collision(target: &Path) -> PathBuf {
    if !target.exists() {
        return target.to_path_buf();
    }

    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = target.extension().map(|e| e.to_string_lossy().to_string());
    let parent = target.parent().unwrap_or_else(|| Path::new(""));

    let mut counter = 1;
    loop {
        let name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Rename, falling back to copy-and-delete for cross-device targets.
fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    fs::copy(source, target)?;
    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn move_plan(source: &Path, destination: &Path) -> ActionPlan {
        ActionPlan {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            kind: ActionKind::Move,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_move_creates_directories_and_records_them() {
        let temp = TempDir::new().expect("temp dir");
        let source = temp.path().join("a.txt");
        fs::write(&source, b"x").expect("write");
        let dest_root = temp.path().join("organized");
        let destination = dest_root.join("Documents").join("Work").join("a.txt");

        let mut executor = Executor::new(&dest_root, false);
        executor.execute(&move_plan(&source, &destination));

        assert!(destination.exists());
        assert!(!source.exists());
        assert_eq!(executor.moved().len(), 1);
        assert_eq!(
            executor.created_dirs(),
            vec![dest_root.join("Documents").join("Work")]
        );
    }

    #[test]
    fn test_directory_recorded_once_for_many_files() {
        let temp = TempDir::new().expect("temp dir");
        let dest_root = temp.path().join("organized");
        let target_dir = dest_root.join("Documents");

        let mut executor = Executor::new(&dest_root, false);
        for name in ["a.txt", "b.txt"] {
            let source = temp.path().join(name);
            fs::write(&source, name).expect("write");
            executor.execute(&move_plan(&source, &target_dir.join(name)));
        }

        assert_eq!(executor.created_dirs(), vec![target_dir]);
    }

    #[test]
    fn test_collision_picks_smallest_free_suffix() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("d");
        fs::create_dir(&dir).expect("mkdir");
        fs::write(dir.join("file.txt"), b"0").expect("write");
        fs::write(dir.join("file_1.txt"), b"1").expect("write");

        let resolved = resolve_collision(&dir.join("file.txt"));
        assert_eq!(resolved, dir.join("file_2.txt"));
    }

    #[test]
    fn test_repeated_moves_never_overwrite() {
        let temp = TempDir::new().expect("temp dir");
        let dest_root = temp.path().join("organized");
        let destination = dest_root.join("Documents").join("note.txt");

        let mut executor = Executor::new(&dest_root, false);
        for i in 0..3 {
            let source = temp.path().join("note.txt");
            fs::write(&source, format!("gen {}", i)).expect("write");
            executor.execute(&move_plan(&source, &destination));
        }

        assert!(dest_root.join("Documents").join("note.txt").exists());
        assert!(dest_root.join("Documents").join("note_1.txt").exists());
        assert!(dest_root.join("Documents").join("note_2.txt").exists());
        let first = fs::read_to_string(dest_root.join("Documents").join("note.txt")).expect("read");
        assert_eq!(first, "gen 0");
    }

    #[test]
    fn test_trash_goes_under_timestamped_root() {
        let temp = TempDir::new().expect("temp dir");
        let dest_root = temp.path().join("organized");
        let source = temp.path().join("dupe.txt");
        fs::write(&source, b"x").expect("write");

        let mut executor = Executor::new(&dest_root, false);
        executor.execute(&ActionPlan {
            source: source.clone(),
            destination: source.clone(),
            kind: ActionKind::Trash,
            reason: "Duplicate file detected".to_string(),
        });

        assert!(!source.exists());
        let moved = executor.moved();
        assert_eq!(moved.len(), 1);
        let target = &moved[0].1;
        assert!(target.starts_with(dest_root.join(".trash")));
        assert_eq!(target.file_name().unwrap(), "dupe.txt");
    }

    #[test]
    fn test_simulate_mode_mutates_nothing() {
        let temp = TempDir::new().expect("temp dir");
        let dest_root = temp.path().join("organized");
        let source = temp.path().join("a.txt");
        fs::write(&source, b"x").expect("write");

        let mut executor = Executor::new(&dest_root, true);
        executor.execute(&move_plan(&source, &dest_root.join("Documents").join("a.txt")));

        assert!(source.exists());
        assert!(!dest_root.exists());
        assert!(executor.moved().is_empty());
        assert!(executor.created_dirs().is_empty());
    }

    #[test]
    fn test_failed_move_is_swallowed() {
        let temp = TempDir::new().expect("temp dir");
        let dest_root = temp.path().join("organized");
        let missing = temp.path().join("ghost.txt");

        let mut executor = Executor::new(&dest_root, false);
        executor.execute(&move_plan(&missing, &dest_root.join("Documents").join("ghost.txt")));

        assert!(executor.moved().is_empty());
    }

    #[test]
    fn test_history_lists_moves() {
        let temp = TempDir::new().expect("temp dir");
        let dest_root = temp.path().join("organized");
        fs::create_dir_all(&dest_root).expect("mkdir");
        let source = temp.path().join("a.txt");
        fs::write(&source, b"x").expect("write");

        let mut executor = Executor::new(&dest_root, false);
        executor.execute(&move_plan(&source, &dest_root.join("Documents").join("a.txt")));

        let history_path = executor.save_history().expect("save history");
        let body = fs::read_to_string(&history_path).expect("read history");
        let json: serde_json::Value = serde_json::from_str(&body).expect("parse history");
        assert_eq!(json["moves"].as_array().expect("moves").len(), 1);
        assert!(json["moves"][0]["to"].as_str().expect("to").contains("Documents"));
    }
}
