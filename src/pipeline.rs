//! The streamed classify-and-act pipeline.
//!
//! One file at a time: scan, check for duplicate content, classify, plan,
//! execute. No buffering of the whole tree, no parallelism; a failure on
//! any single file is logged by the stage that hit it and the run moves
//! on. The only run-level failure is a destination root that cannot be
//! created.

use crate::advisor::Advisor;
use crate::dedup::Deduplicator;
use crate::executor::Executor;
use crate::heuristic::HeuristicClassifier;
use crate::inference::DomainInference;
use crate::planner::ActionPlanner;
use crate::scanner::Scanner;
use crate::taxonomy::TaxonomyConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Knobs for one pipeline pass.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Dry-run: log intended actions, mutate nothing. The default.
    pub simulate: bool,
    /// Whether the heuristic classifier runs before the keyword hierarchy.
    pub use_heuristic: bool,
    /// Extra context keywords merged with the taxonomy's configured ones.
    pub context_keywords: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            simulate: true,
            use_heuristic: true,
            context_keywords: Vec::new(),
        }
    }
}

/// Aggregate outcome of one pass.
#[derive(Debug)]
pub struct RunResult {
    /// Files scanned and pushed through the pipeline.
    pub processed: usize,
    pub elapsed: Duration,
    /// (source, destination) pairs actually moved. Empty in simulate mode.
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Destination directories created this run, sorted.
    pub created_dirs: Vec<PathBuf>,
    /// Source subdirectories found empty after the run. Listed, never
    /// deleted.
    pub empty_dirs: Vec<PathBuf>,
    /// Free-text advisory report. Informational only.
    pub advisory: String,
}

/// Run-level failures. Per-file problems never surface here.
#[derive(Debug)]
pub enum PipelineError {
    DestinationUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::DestinationUnavailable { path, source } => {
                write!(
                    f,
                    "Cannot create destination root {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Execute one full pass over `sources` into `dest_root`.
pub fn run(
    sources: &[PathBuf],
    dest_root: &Path,
    config: &TaxonomyConfig,
    options: &RunOptions,
) -> Result<RunResult, PipelineError> {
    let started = Instant::now();

    if !options.simulate {
        fs::create_dir_all(dest_root).map_err(|e| PipelineError::DestinationUnavailable {
            path: dest_root.to_path_buf(),
            source: e,
        })?;
    }

    let scanner = Scanner::new(sources, config);
    let mut deduplicator = Deduplicator::new();
    let inference = DomainInference::new(build_heuristic(config, options));
    let planner = ActionPlanner::new(dest_root);
    let mut executor = Executor::new(dest_root, options.simulate);
    let mut advisor = Advisor::new();

    let mut processed = 0;
    for record in scanner.scan() {
        processed += 1;
        log::info!("Processing: {}", record.file_name);

        let is_duplicate = deduplicator.is_duplicate(&record);
        advisor.observe(&record);
        let verdict = inference.infer(&record, config);
        let plan = planner.plan(&record, &verdict, is_duplicate);
        executor.execute(&plan);
    }

    let empty_dirs = if options.simulate {
        Vec::new()
    } else {
        find_empty_dirs(sources)
    };

    if !options.simulate
        && let Err(e) = executor.save_history()
    {
        log::warn!("could not save run history: {}", e);
    }

    Ok(RunResult {
        processed,
        elapsed: started.elapsed(),
        moved: executor.moved().to_vec(),
        created_dirs: executor.created_dirs(),
        empty_dirs,
        advisory: advisor.report(),
    })
}

fn build_heuristic(config: &TaxonomyConfig, options: &RunOptions) -> Option<HeuristicClassifier> {
    if !options.use_heuristic {
        return None;
    }
    let mut context = config.user_context_keywords.clone();
    context.extend(options.context_keywords.iter().cloned());
    Some(HeuristicClassifier::new(&context))
}

/// Strictly-empty subdirectories under the sources, depth-first so the
/// deepest show up first. Offered to the user; nothing is removed here.
fn find_empty_dirs(sources: &[PathBuf]) -> Vec<PathBuf> {
    let mut empty = Vec::new();
    for source in sources {
        if !source.exists() {
            continue;
        }
        for entry in WalkDir::new(source)
            .follow_links(false)
            .contents_first(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            match fs::read_dir(entry.path()) {
                Ok(mut contents) => {
                    if contents.next().is_none() {
                        empty.push(entry.into_path());
                    }
                }
                Err(e) => log::debug!("cannot inspect {}: {}", entry.path().display(), e),
            }
        }
    }
    empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_empty_dirs_lists_only_empty_ones() {
        let temp = TempDir::new().expect("temp dir");
        let empty = temp.path().join("emptied");
        let full = temp.path().join("full");
        fs::create_dir(&empty).expect("mkdir");
        fs::create_dir(&full).expect("mkdir");
        fs::write(full.join("keep.txt"), b"x").expect("write");

        let found = find_empty_dirs(&[temp.path().to_path_buf()]);
        assert_eq!(found, vec![empty]);
    }

    #[test]
    fn test_default_options_simulate() {
        let options = RunOptions::default();
        assert!(options.simulate);
        assert!(options.use_heuristic);
    }
}
