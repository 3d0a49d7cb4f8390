//! Source tree scanning.
//!
//! Walks one or more root directories depth-first and yields a
//! [`FileRecord`] per eligible regular file. Ignored and hidden
//! directories are pruned before descent, so their subtrees cost no I/O.
//! Individual unreadable entries are logged and skipped; the scan itself
//! never fails.

use crate::taxonomy::TaxonomyConfig;
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Descriptor of a discovered file.
///
/// The content hash is deliberately not part of the record: it is derived
/// on demand by the deduplicator, so files that are skipped or classified
/// by name alone are never read.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute (or root-relative) path of the file.
    pub path: PathBuf,
    /// File name including extension.
    pub file_name: String,
    /// Lower-case extension without the dot; empty when the file has none.
    pub extension: String,
    /// Name of the directory containing the file.
    pub parent_dir: String,
    /// Size in bytes at scan time.
    pub size: u64,
}

/// Walks source roots and yields eligible files.
pub struct Scanner {
    roots: Vec<PathBuf>,
    ignored_dirs: HashSet<String>,
    ignored_files: HashSet<String>,
    ignored_patterns: Vec<Pattern>,
}

impl Scanner {
    /// Build a scanner for `roots`, compiling the taxonomy's ignore rules
    /// once up front.
    pub fn new(roots: &[PathBuf], config: &TaxonomyConfig) -> Self {
        let ignored_patterns = config
            .ignored_patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(_) => {
                    log::warn!("skipping unparsable ignore pattern '{}'", p);
                    None
                }
            })
            .collect();

        Self {
            roots: roots.to_vec(),
            ignored_dirs: config.ignored_dirs.iter().cloned().collect(),
            ignored_files: config.ignored_files.iter().cloned().collect(),
            ignored_patterns,
        }
    }

    /// Lazily yield a record per regular file under the roots.
    ///
    /// Nonexistent roots are skipped without error. Entries are visited in
    /// file-name order so that repeated runs over the same tree see the
    /// same sequence.
    pub fn scan(&self) -> impl Iterator<Item = FileRecord> + '_ {
        self.roots
            .iter()
            .filter(|root| root.exists())
            .flat_map(move |root| {
                WalkDir::new(root)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(move |entry| entry.depth() == 0 || !self.prunes(entry))
                    .filter_map(move |entry| self.to_record(entry))
            })
    }

    /// Whether a directory entry cuts its whole subtree from the walk.
    fn prunes(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.')
            || self.ignored_dirs.contains(name.as_ref())
            || self.ignored_patterns.iter().any(|p| p.matches(&name))
    }

    fn to_record(&self, entry: walkdir::Result<DirEntry>) -> Option<FileRecord> {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("skipping unreadable entry: {}", e);
                return None;
            }
        };

        // Symlinks report their own type here, so is_file() excludes them.
        if !entry.file_type().is_file() {
            return None;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.starts_with('.')
            || self.ignored_files.contains(&file_name)
            || self.ignored_patterns.iter().any(|p| p.matches(&file_name))
        {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                log::debug!("skipping {}: {}", entry.path().display(), e);
                return None;
            }
        };

        let path = entry.into_path();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let parent_dir = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Some(FileRecord {
            file_name,
            extension,
            parent_dir,
            size: metadata.len(),
            path,
        })
    }
}
