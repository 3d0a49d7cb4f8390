//! Content-hash duplicate detection.
//!
//! Duplicates are exact-content matches: two files are duplicates when
//! their SHA-256 digests agree. The index keeps only the first path seen
//! per digest and lives for a single pipeline run.

use crate::scanner::FileRecord;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const HASH_CHUNK_SIZE: usize = 8192;

/// Streaming SHA-256 of a file, returned as a lower-case hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Tracks content digests seen during one run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashMap<String, PathBuf>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this record's content was already seen earlier in the run.
    ///
    /// The first occurrence of a digest registers its path and reports
    /// `false`; later occurrences report `true` without touching the
    /// index. A file that cannot be hashed is treated as unique so that
    /// classification still proceeds.
    pub fn is_duplicate(&mut self, record: &FileRecord) -> bool {
        let hash = match hash_file(&record.path) {
            Ok(hash) => hash,
            Err(e) => {
                log::warn!("could not hash {}: {}", record.path.display(), e);
                return false;
            }
        };

        if self.seen.contains_key(&hash) {
            return true;
        }
        self.seen.insert(hash, record.path.clone());
        false
    }

    /// Path of the first file that produced `hash`, if any.
    pub fn first_seen(&self, hash: &str) -> Option<&Path> {
        self.seen.get(hash).map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record_for(path: &Path) -> FileRecord {
        FileRecord {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            extension: String::new(),
            parent_dir: String::new(),
            size: 0,
        }
    }

    #[test]
    fn test_hash_file_is_stable() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("a.txt");
        fs::write(&path, b"same bytes").expect("write");

        let first = hash_file(&path).expect("hash");
        let second = hash_file(&path).expect("hash");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_second_occurrence_is_duplicate() {
        let temp = TempDir::new().expect("temp dir");
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, b"identical content").expect("write");
        fs::write(&b, b"identical content").expect("write");

        let mut dedup = Deduplicator::new();
        assert!(!dedup.is_duplicate(&record_for(&a)));
        assert!(dedup.is_duplicate(&record_for(&b)));
    }

    #[test]
    fn test_index_keeps_first_path_only() {
        let temp = TempDir::new().expect("temp dir");
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, b"payload").expect("write");
        fs::write(&b, b"payload").expect("write");

        let mut dedup = Deduplicator::new();
        dedup.is_duplicate(&record_for(&a));
        dedup.is_duplicate(&record_for(&b));

        let hash = hash_file(&a).expect("hash");
        assert_eq!(dedup.first_seen(&hash), Some(a.as_path()));
    }

    #[test]
    fn test_distinct_content_is_not_duplicate() {
        let temp = TempDir::new().expect("temp dir");
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, b"one").expect("write");
        fs::write(&b, b"two").expect("write");

        let mut dedup = Deduplicator::new();
        assert!(!dedup.is_duplicate(&record_for(&a)));
        assert!(!dedup.is_duplicate(&record_for(&b)));
    }

    #[test]
    fn test_unreadable_file_fails_open() {
        let mut dedup = Deduplicator::new();
        let missing = record_for(Path::new("/no/such/file.bin"));
        assert!(!dedup.is_duplicate(&missing));
        assert!(!dedup.is_duplicate(&missing));
    }
}
