//! Classification rules and their persistence.
//!
//! The taxonomy is the full rule set driving classification: extension
//! groups, the two-level category/subcategory keyword hierarchy, ignore
//! lists, score weights and user-context keywords. It is loaded once at
//! startup and can be replaced wholesale at runtime through
//! [`TaxonomyStore::replace`], which validates the incoming rules before
//! swapping them in and persisting them back to disk.
//!
//! # Configuration File Format
//!
//! Rules are stored in TOML:
//!
//! ```toml
//! IGNORED_DIRS = [".git", "node_modules"]
//! IGNORED_FILES = [".DS_Store"]
//! IGNORED_PATTERNS = ["*.part"]
//! USER_CONTEXT_KEYWORDS = ["thesis"]
//!
//! [SCORES]
//! exact = 1.0
//! partial = 0.5
//! confidence_threshold = 0.3
//!
//! [[EXTENSION_GROUPS]]
//! name = "Documents"
//! extensions = ["pdf", "docx"]
//!
//! [[CATEGORY_HIERARCHY]]
//! name = "Work"
//! keywords = ["invoice", "meeting"]
//!
//! [[CATEGORY_HIERARCHY.subcategories]]
//! name = "Finance"
//! keywords = ["invoice", "receipt"]
//! ```
//!
//! Categories, subcategories and extension groups are ordered lists, not
//! maps: scoring ties are broken by the first entry encountered, so the
//! order written in the file is a behavioral contract.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Group label used when no extension group claims a file's extension.
pub const UNSORTED_GROUP: &str = "Unsorted_Extensions";

/// Errors that can occur while loading, validating or persisting rules.
#[derive(Debug, Clone)]
pub enum TaxonomyError {
    /// Rules file not found at the explicitly requested path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// A glob pattern in `IGNORED_PATTERNS` failed to compile.
    InvalidGlobPattern(String),
    /// The rules are structurally well-formed but semantically unusable.
    ValidationFailed(String),
    /// IO error while reading or writing the rules file.
    IoError(String),
}

impl std::fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxonomyError::ConfigNotFound(path) => {
                write!(f, "Taxonomy file not found: {}", path.display())
            }
            TaxonomyError::ConfigInvalid(msg) => write!(f, "Invalid taxonomy: {}", msg),
            TaxonomyError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid ignore pattern '{}'", pattern)
            }
            TaxonomyError::ValidationFailed(msg) => {
                write!(f, "Taxonomy validation failed: {}", msg)
            }
            TaxonomyError::IoError(msg) => write!(f, "IO error accessing taxonomy: {}", msg),
        }
    }
}

impl std::error::Error for TaxonomyError {}

/// A named bucket of file extensions (stored lower-case, without the dot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionGroup {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Second-level node of the category tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Top-level node of the category tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// Tunable weights for the keyword scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of a whole-token keyword match.
    pub exact: f64,
    /// Weight of a substring (non-token) keyword match.
    pub partial: f64,
    /// Minimum score for a category or subcategory verdict to be trusted.
    pub confidence_threshold: f64,
}

/// The complete, immutable-once-loaded rule set.
///
/// Classifiers and the planner receive this by reference; runtime
/// replacement swaps a fresh snapshot via [`TaxonomyStore`] rather than
/// mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Directory names pruned from the scan before descending.
    #[serde(rename = "IGNORED_DIRS")]
    pub ignored_dirs: Vec<String>,
    /// File names skipped during the scan.
    #[serde(rename = "IGNORED_FILES")]
    pub ignored_files: Vec<String>,
    /// Glob patterns matched against file names during the scan.
    #[serde(rename = "IGNORED_PATTERNS", default)]
    pub ignored_patterns: Vec<String>,
    /// Keywords describing the user's world, boosting heuristic scores.
    #[serde(rename = "USER_CONTEXT_KEYWORDS", default)]
    pub user_context_keywords: Vec<String>,
    #[serde(rename = "SCORES")]
    pub scores: ScoreWeights,
    #[serde(rename = "EXTENSION_GROUPS")]
    pub extension_groups: Vec<ExtensionGroup>,
    #[serde(rename = "CATEGORY_HIERARCHY")]
    pub categories: Vec<Category>,
}

impl TaxonomyConfig {
    /// Load rules with fallback to the built-in defaults.
    ///
    /// Resolution order:
    /// 1. If `config_path` is provided, load from that file (errors surface)
    /// 2. `./.orderlyrc.toml` in the current directory
    /// 3. `~/.config/orderly/taxonomy.toml`
    /// 4. Built-in defaults
    ///
    /// Read or parse failures on the implicit locations are logged and fall
    /// through to the defaults; only an explicitly requested file turns
    /// into an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self, TaxonomyError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        for candidate in Self::implicit_paths() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!(
                        "ignoring unreadable taxonomy at {}: {}",
                        candidate.display(),
                        e
                    );
                }
            }
        }

        Ok(Self::default())
    }

    fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".orderlyrc.toml")];
        if let Ok(home) = std::env::var("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("orderly")
                    .join("taxonomy.toml"),
            );
        }
        paths
    }

    /// Default location used for persistence when no explicit path is given.
    pub fn default_persist_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join(".config")
                .join("orderly")
                .join("taxonomy.toml"),
            Err(_) => PathBuf::from(".orderlyrc.toml"),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, TaxonomyError> {
        if !path.exists() {
            return Err(TaxonomyError::ConfigNotFound(path.to_path_buf()));
        }

        let content =
            fs::read_to_string(path).map_err(|e| TaxonomyError::IoError(e.to_string()))?;

        let config: TaxonomyConfig =
            toml::from_str(&content).map_err(|e| TaxonomyError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the rule set is usable before it goes live.
    ///
    /// Structural shape is already guaranteed by deserialization; this
    /// covers what the type system cannot: non-empty names, sane weights
    /// and compilable ignore patterns.
    pub fn validate(&self) -> Result<(), TaxonomyError> {
        for group in &self.extension_groups {
            if group.name.trim().is_empty() {
                return Err(TaxonomyError::ValidationFailed(
                    "extension group with empty name".to_string(),
                ));
            }
        }

        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(TaxonomyError::ValidationFailed(
                    "category with empty name".to_string(),
                ));
            }
            for sub in &category.subcategories {
                if sub.name.trim().is_empty() {
                    return Err(TaxonomyError::ValidationFailed(format!(
                        "subcategory of '{}' with empty name",
                        category.name
                    )));
                }
            }
        }

        let weights = [
            ("exact", self.scores.exact),
            ("partial", self.scores.partial),
            ("confidence_threshold", self.scores.confidence_threshold),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(TaxonomyError::ValidationFailed(format!(
                    "score weight '{}' must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        for pattern in &self.ignored_patterns {
            Pattern::new(pattern)
                .map_err(|_| TaxonomyError::InvalidGlobPattern(pattern.clone()))?;
        }

        Ok(())
    }

    /// Resolve the extension group for a (dot-less) extension.
    ///
    /// Groups are checked in their configured order; the first one whose
    /// extension list contains the lower-cased extension wins. Files with
    /// no recognized extension fall into [`UNSORTED_GROUP`].
    pub fn extension_group(&self, extension: &str) -> &str {
        let ext = extension.to_lowercase();
        for group in &self.extension_groups {
            if group.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                return &group.name;
            }
        }
        UNSORTED_GROUP
    }
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        builtin_defaults()
    }
}

/// Shared, swappable taxonomy snapshot.
///
/// Holds the live rules behind an [`Arc`] so that a runtime replacement is
/// an atomic pointer swap: readers that already took a snapshot keep
/// seeing the rules they started with, and a half-validated rule set can
/// never become visible.
pub struct TaxonomyStore {
    config: Arc<TaxonomyConfig>,
    persist_path: PathBuf,
}

impl TaxonomyStore {
    /// Open the store, loading persisted rules or the defaults.
    pub fn open(config_path: Option<&Path>) -> Result<Self, TaxonomyError> {
        let config = TaxonomyConfig::load(config_path)?;
        let persist_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(TaxonomyConfig::default_persist_path);
        Ok(Self {
            config: Arc::new(config),
            persist_path,
        })
    }

    /// Snapshot of the current rules. Cheap to clone and hold across a run.
    pub fn current(&self) -> Arc<TaxonomyConfig> {
        Arc::clone(&self.config)
    }

    /// Validate `next`, persist it, then swap it in as the live snapshot.
    ///
    /// A rule set that fails validation or cannot be written leaves the
    /// live snapshot untouched and reports why.
    pub fn replace(&mut self, next: TaxonomyConfig) -> Result<(), TaxonomyError> {
        next.validate()?;

        let serialized = toml::to_string_pretty(&next)
            .map_err(|e| TaxonomyError::ConfigInvalid(e.to_string()))?;
        if let Some(parent) = self.persist_path.parent() {
            fs::create_dir_all(parent).map_err(|e| TaxonomyError::IoError(e.to_string()))?;
        }
        fs::write(&self.persist_path, serialized)
            .map_err(|e| TaxonomyError::IoError(e.to_string()))?;

        self.config = Arc::new(next);
        Ok(())
    }

    /// Where [`replace`](Self::replace) persists to.
    pub fn persist_path(&self) -> &Path {
        &self.persist_path
    }
}

fn group(name: &str, extensions: &[&str]) -> ExtensionGroup {
    ExtensionGroup {
        name: name.to_string(),
        extensions: extensions.iter().map(|e| e.to_string()).collect(),
    }
}

fn sub(name: &str, keywords: &[&str]) -> Subcategory {
    Subcategory {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn category(name: &str, keywords: &[&str], subcategories: Vec<Subcategory>) -> Category {
    Category {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        subcategories,
    }
}

fn builtin_defaults() -> TaxonomyConfig {
    TaxonomyConfig {
        ignored_dirs: [
            ".git",
            "node_modules",
            "target",
            "venv",
            "env",
            ".idea",
            ".vscode",
            "__pycache__",
            ".trash",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        ignored_files: [".DS_Store", "Thumbs.db", "desktop.ini"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        ignored_patterns: ["*.part", "*.crdownload"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        user_context_keywords: Vec::new(),
        scores: ScoreWeights {
            exact: 1.0,
            partial: 0.5,
            confidence_threshold: 0.3,
        },
        extension_groups: vec![
            group(
                "Documents",
                &[
                    "pdf", "docx", "doc", "txt", "rtf", "odt", "xlsx", "csv", "pptx", "ppt",
                    "epub", "mobi",
                ],
            ),
            group(
                "Images",
                &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "heic", "svg", "webp"],
            ),
            group("Audio", &["mp3", "wav", "aac", "flac", "m4a", "ogg", "wma"]),
            group(
                "Video",
                &["mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "ts"],
            ),
            group("Archives", &["zip", "rar", "7z", "tar", "gz", "iso", "dmg"]),
            group("Executables", &["exe", "msi", "bat", "sh", "app", "apk"]),
        ],
        categories: vec![
            category(
                "Education",
                &[
                    "lecture", "course", "assignment", "homework", "exam", "quiz", "study",
                    "notes", "tutorial", "lesson", "learn", "student", "university", "college",
                    "school", "class",
                ],
                vec![
                    sub(
                        "Nursing",
                        &[
                            "nursing",
                            "patient",
                            "clinical",
                            "health",
                            "medical",
                            "anatomy",
                            "physiology",
                            "care plan",
                            "triage",
                            "perioperative",
                            "palliative",
                        ],
                    ),
                    sub(
                        "Psychiatry",
                        &[
                            "psychiatry",
                            "psychology",
                            "mental",
                            "disorder",
                            "dsm",
                            "therapy",
                            "counseling",
                            "cognitive",
                            "behavioral",
                            "neuro",
                        ],
                    ),
                    sub(
                        "Computer Science",
                        &[
                            "python",
                            "java",
                            "cpp",
                            "code",
                            "programming",
                            "algorithm",
                            "data structure",
                            "ai",
                            "machine learning",
                            "web",
                            "developer",
                            "hack",
                        ],
                    ),
                    sub(
                        "Mathematics",
                        &[
                            "math",
                            "algebra",
                            "calculus",
                            "statistics",
                            "geometry",
                            "trigonometry",
                            "probability",
                            "discrete",
                        ],
                    ),
                ],
            ),
            category(
                "Work",
                &[
                    "work", "job", "career", "resume", "cv", "invoice", "project", "meeting",
                    "schedule", "agenda", "proposal", "client", "business", "presentation",
                ],
                vec![
                    sub(
                        "Finance",
                        &[
                            "invoice", "receipt", "bill", "tax", "salary", "payroll", "budget",
                            "expense", "statement", "bank",
                        ],
                    ),
                    sub(
                        "Legal",
                        &["contract", "agreement", "nda", "law", "legal", "policy", "regulation"],
                    ),
                    sub(
                        "HR",
                        &["hiring", "offer", "interview", "onboarding", "employee", "benefits"],
                    ),
                    sub(
                        "Projects",
                        &["project", "plan", "roadmap", "milestone", "deliverable"],
                    ),
                ],
            ),
            category(
                "Personal",
                &[
                    "personal", "family", "home", "house", "car", "insurance", "id", "passport",
                    "travel", "photo", "video", "memories",
                ],
                vec![
                    sub(
                        "Identity",
                        &["passport", "id card", "license", "birth certificate", "social security"],
                    ),
                    sub(
                        "Travel",
                        &["ticket", "booking", "itinerary", "hotel", "flight", "visa"],
                    ),
                    sub(
                        "Health",
                        &["prescription", "doctor", "lab", "test", "result", "vaccine"],
                    ),
                ],
            ),
            category(
                "Finance",
                &["finance", "money", "bank", "investment", "crypto", "stock", "trade", "wallet"],
                vec![
                    sub("Statements", &["statement", "report", "summary", "balance"]),
                    sub("Taxes", &["tax", "return", "w2", "1099", "deduction"]),
                ],
            ),
            category(
                "Media",
                &[
                    "movie", "film", "series", "show", "episode", "season", "music", "song",
                    "track", "album", "podcast", "video", "game",
                ],
                vec![
                    sub(
                        "Movies",
                        &["1080p", "720p", "bluray", "dvdrip", "x264", "x265", "web-dl", "hdr"],
                    ),
                    sub(
                        "TV Shows",
                        &["s0", "e0", "season", "episode", "complete", "hdtv"],
                    ),
                    sub("Anime", &["anime", "dual audio", "sub", "dub", "ova"]),
                    sub(
                        "Music",
                        &["mp3", "flac", "remix", "feat", "original mix", "ost", "soundtrack"],
                    ),
                    sub("Podcasts", &["podcast", "interview", "talk", "episode"]),
                ],
            ),
        ],
    }
}
