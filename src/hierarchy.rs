//! Two-level keyword classification over the taxonomy tree.
//!
//! A greedy argmax, not a probabilistic model: the highest-scoring
//! category wins, then the highest-scoring subcategory inside it. Ties
//! keep the first candidate in taxonomy order, which is why the taxonomy
//! stores ordered lists.

use crate::inference::Verdict;
use crate::scanner::FileRecord;
use crate::taxonomy::{ScoreWeights, TaxonomyConfig};
use std::collections::HashSet;

pub struct HierarchicalClassifier;

struct LevelMatch {
    index: Option<usize>,
    score: f64,
    reasons: Vec<String>,
}

impl HierarchicalClassifier {
    /// Classify a record against the configured taxonomy.
    ///
    /// The extension group is always resolved, independently of keyword
    /// scoring. Keyword scores below the confidence threshold degrade to
    /// `Unsorted` (no category) or `{category}/Unsorted` (category but no
    /// subcategory).
    pub fn classify(record: &FileRecord, config: &TaxonomyConfig) -> Verdict {
        let group = config.extension_group(&record.extension);
        let clean = clean_name(&record.file_name);
        let tokens: HashSet<&str> = clean.split_whitespace().collect();
        let parent = record.parent_dir.to_lowercase();
        let threshold = config.scores.confidence_threshold;

        let primary = best_match(
            config
                .categories
                .iter()
                .map(|c| (c.name.as_str(), c.keywords.as_slice())),
            &clean,
            &tokens,
            &parent,
            &config.scores,
        );

        let Some(category_index) = primary.index.filter(|_| primary.score >= threshold) else {
            return Verdict::new(
                group,
                "Unsorted",
                primary.score,
                vec!["Low confidence in primary category".to_string()],
            );
        };
        let category = &config.categories[category_index];

        let secondary = best_match(
            category
                .subcategories
                .iter()
                .map(|s| (s.name.as_str(), s.keywords.as_slice())),
            &clean,
            &tokens,
            &parent,
            &config.scores,
        );

        let Some(sub_index) = secondary.index.filter(|_| secondary.score >= threshold) else {
            let mut reasons = primary.reasons;
            reasons.push("No subcategory match".to_string());
            return Verdict::new(
                group,
                format!("{}/Unsorted", category.name),
                primary.score,
                reasons,
            );
        };
        let subcategory = &category.subcategories[sub_index];

        let mut reasons = primary.reasons;
        reasons.extend(secondary.reasons);
        Verdict::new(
            group,
            format!("{}/{}", category.name, subcategory.name),
            secondary.score,
            reasons,
        )
    }
}

/// Lower-case the name and turn `.`, `_`, `-` into spaces so keywords can
/// match as whole tokens or raw substrings.
fn clean_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            '.' | '_' | '-' => ' ',
            other => other,
        })
        .collect()
}

/// Score every candidate and keep the strictly-best one.
///
/// A keyword that equals a token scores the exact weight; a keyword that
/// only appears as a substring of the cleaned name scores the partial
/// weight. A candidate whose name occurs inside the parent directory name
/// earns one partial-weight context bonus. The substring check is known to
/// fire on coincidental matches (a folder named "taxfree" suggests
/// "Taxes"); that behavior is kept as-is.
fn best_match<'a>(
    candidates: impl Iterator<Item = (&'a str, &'a [String])>,
    clean: &str,
    tokens: &HashSet<&str>,
    parent: &str,
    weights: &ScoreWeights,
) -> LevelMatch {
    let mut best = LevelMatch {
        index: None,
        score: 0.0,
        reasons: Vec::new(),
    };

    for (index, (name, keywords)) in candidates.enumerate() {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        for keyword in keywords {
            let keyword = keyword.to_lowercase();
            if tokens.contains(keyword.as_str()) {
                score += weights.exact;
                reasons.push(format!("Matched keyword '{}'", keyword));
            } else if clean.contains(keyword.as_str()) {
                score += weights.partial;
                reasons.push(format!("Partial match '{}'", keyword));
            }
        }

        if !parent.is_empty() && parent.contains(&name.to_lowercase()) {
            score += weights.partial;
            reasons.push(format!("Folder context '{}'", name));
        }

        if score > best.score {
            best = LevelMatch {
                index: Some(index),
                score,
                reasons,
            };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(file_name: &str, extension: &str, parent_dir: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from(file_name),
            file_name: file_name.to_string(),
            extension: extension.to_string(),
            parent_dir: parent_dir.to_string(),
            size: 0,
        }
    }

    #[test]
    fn test_full_two_level_match() {
        let config = TaxonomyConfig::default();
        let verdict =
            HierarchicalClassifier::classify(&record("Copy of Invoice (2).pdf", "pdf", "inbox"), &config);

        assert_eq!(verdict.group, "Documents");
        assert_eq!(verdict.path, "Work/Finance");
        assert!(verdict.reasons.iter().any(|r| r.contains("invoice")));
    }

    #[test]
    fn test_low_confidence_goes_unsorted() {
        let config = TaxonomyConfig::default();
        let verdict = HierarchicalClassifier::classify(
            &record("quarterly_report_v2.xlsx", "xlsx", "inbox"),
            &config,
        );

        assert_eq!(verdict.group, "Documents");
        assert_eq!(verdict.path, "Unsorted");
        assert!(
            verdict
                .reasons
                .contains(&"Low confidence in primary category".to_string())
        );
    }

    #[test]
    fn test_category_without_subcategory_match() {
        let config = TaxonomyConfig::default();
        let verdict =
            HierarchicalClassifier::classify(&record("lecture_recording.mp4", "mp4", "inbox"), &config);

        assert_eq!(verdict.group, "Video");
        assert_eq!(verdict.path, "Education/Unsorted");
        assert!(verdict.reasons.contains(&"No subcategory match".to_string()));
    }

    #[test]
    fn test_tie_keeps_first_category_in_taxonomy_order() {
        let config = TaxonomyConfig::default();
        // "notes" (Education) and "meeting" (Work) both score one exact
        // match; Education is listed first and must win.
        let verdict =
            HierarchicalClassifier::classify(&record("meeting_notes.txt", "txt", "inbox"), &config);

        assert!(verdict.path.starts_with("Education/"));
    }

    #[test]
    fn test_parent_folder_context_bonus() {
        let config = TaxonomyConfig::default();
        let verdict =
            HierarchicalClassifier::classify(&record("meeting.txt", "txt", "work-stuff"), &config);

        assert_eq!(verdict.path, "Work/Unsorted");
        assert!(
            verdict
                .reasons
                .iter()
                .any(|r| r.contains("Folder context"))
        );
    }

    #[test]
    fn test_multiword_keyword_matches_as_substring() {
        let config = TaxonomyConfig::default();
        // "care plan" can never equal a single token, so it scores as a
        // partial match only.
        let verdict = HierarchicalClassifier::classify(
            &record("lecture care plan.docx", "docx", "inbox"),
            &config,
        );

        assert_eq!(verdict.path, "Education/Nursing");
        assert!(verdict.reasons.iter().any(|r| r.contains("Partial match 'care plan'")));
    }

    #[test]
    fn test_unknown_extension_still_scored() {
        let config = TaxonomyConfig::default();
        let verdict =
            HierarchicalClassifier::classify(&record("invoice_scan.xyz", "xyz", "inbox"), &config);

        assert_eq!(verdict.group, crate::taxonomy::UNSORTED_GROUP);
        assert_eq!(verdict.path, "Work/Finance");
    }

    #[test]
    fn test_confidence_is_clamped() {
        let config = TaxonomyConfig::default();
        // Many Work keywords at once push the raw score past 1.0.
        let verdict = HierarchicalClassifier::classify(
            &record("work_job_career_invoice_meeting.pdf", "pdf", "inbox"),
            &config,
        );

        assert!(verdict.confidence <= 1.0);
        assert!(verdict.confidence >= 0.0);
    }
}
