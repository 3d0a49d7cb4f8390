//! Classification verdicts and strategy selection.

use crate::heuristic::HeuristicClassifier;
use crate::hierarchy::HierarchicalClassifier;
use crate::scanner::FileRecord;
use crate::taxonomy::TaxonomyConfig;

/// The outcome of classifying one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Top-level extension group (e.g. `Documents`).
    pub group: String,
    /// Slash-separated destination below the group, never empty.
    pub path: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Human-readable justifications, in the order they were earned.
    pub reasons: Vec<String>,
}

impl Verdict {
    /// Build a verdict, enforcing the invariants: an empty path becomes
    /// `Unsorted` and the confidence is clamped into `[0, 1]`.
    pub fn new(
        group: impl Into<String>,
        path: impl Into<String>,
        confidence: f64,
        reasons: Vec<String>,
    ) -> Self {
        let path = path.into();
        Self {
            group: group.into(),
            path: if path.is_empty() {
                "Unsorted".to_string()
            } else {
                path
            },
            confidence: confidence.clamp(0.0, 1.0),
            reasons,
        }
    }
}

/// Picks one verdict per file.
///
/// When the heuristic classifier is enabled and produces a verdict, that
/// verdict is used verbatim; otherwise the hierarchical keyword classifier
/// decides. A strict override, not a blend: each strategy stays
/// independently testable.
pub struct DomainInference {
    heuristic: Option<HeuristicClassifier>,
}

impl DomainInference {
    /// `heuristic` carries the (optional) enabled heuristic classifier.
    pub fn new(heuristic: Option<HeuristicClassifier>) -> Self {
        Self { heuristic }
    }

    pub fn infer(&self, record: &FileRecord, config: &TaxonomyConfig) -> Verdict {
        if let Some(heuristic) = &self.heuristic
            && let Some(verdict) = heuristic.classify(&record.file_name, &record.extension)
        {
            return verdict;
        }
        HierarchicalClassifier::classify(record, config)
    }
}
