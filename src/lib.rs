//! orderly - file classification and cleanup for messy folders
//!
//! This library scans source directories, detects duplicate content by
//! SHA-256, classifies each file through a heuristic concept matcher with
//! a keyword-hierarchy fallback, and turns the verdicts into a safe plan
//! of move/trash/skip actions that can be simulated or applied.

pub mod advisor;
pub mod cli;
pub mod dedup;
pub mod executor;
pub mod heuristic;
pub mod hierarchy;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod scanner;
pub mod taxonomy;

pub use dedup::Deduplicator;
pub use executor::Executor;
pub use heuristic::HeuristicClassifier;
pub use hierarchy::HierarchicalClassifier;
pub use inference::{DomainInference, Verdict};
pub use pipeline::{RunOptions, RunResult, run};
pub use planner::{ActionKind, ActionPlan, ActionPlanner};
pub use scanner::{FileRecord, Scanner};
pub use taxonomy::{TaxonomyConfig, TaxonomyError, TaxonomyStore};

pub use cli::{Cli, run_cli};
