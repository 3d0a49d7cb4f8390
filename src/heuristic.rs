//! Filename heuristics standing in for a trained classifier.
//!
//! A hand-built concept lexicon plus typo tolerance: filenames are
//! tokenized, tokens are matched against a fixed keyword table (exactly or
//! through a similarity ratio), user-context keywords bias the scores, and
//! the file extension corroborates or contradicts the best candidate. A
//! verdict is only produced when the final score clears the acceptance
//! bar; otherwise the caller falls back to the keyword hierarchy.

use crate::inference::Verdict;

/// Minimum final score for a heuristic verdict to be trusted.
const ACCEPTANCE_BAR: f64 = 0.45;
/// Minimum similarity ratio for a near-miss token/concept pair.
const FUZZY_CUTOFF: f64 = 0.85;
/// Score multiplier applied to fuzzy (non-exact) concept matches.
const FUZZY_PENALTY: f64 = 0.85;
/// Additive bias earned per matching user-context keyword.
const CONTEXT_BOOST: f64 = 0.25;
/// Bonus when the extension's known groups include the candidate.
const CORROBORATION_BONUS: f64 = 0.1;
/// Multiplier when the extension contradicts the candidate outright.
const CONTRADICTION_PENALTY: f64 = 0.5;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "for", "in", "to", "at", "by", "my", "new", "copy", "final", "draft",
    "v1", "v2",
];

/// Keyword concepts: keyword, group, destination path, base weight.
/// Order matters for fuzzy tie-breaking, so this stays a slice.
const CONCEPTS: &[(&str, &str, &str, f64)] = &[
    ("invoice", "Documents", "Finance/Invoices", 0.9),
    ("receipt", "Documents", "Finance/Invoices", 0.9),
    ("bill", "Documents", "Finance/Invoices", 0.8),
    ("tax", "Documents", "Finance/Taxes", 0.9),
    ("statement", "Documents", "Finance/Statements", 0.8),
    ("ledger", "Documents", "Finance/Accounting", 0.7),
    ("payroll", "Documents", "Work/HR", 0.8),
    ("contract", "Documents", "Work/Legal", 0.9),
    ("agreement", "Documents", "Work/Legal", 0.8),
    ("thesis", "Documents", "Education/Research", 0.95),
    ("dissertation", "Documents", "Education/Research", 0.95),
    ("assignment", "Documents", "Education/Assignments", 0.8),
    ("lecture", "Documents", "Education/Materials", 0.7),
    ("syllabus", "Documents", "Education/Admin", 0.8),
    ("exam", "Documents", "Education/Exams", 0.8),
    ("quiz", "Documents", "Education/Exams", 0.8),
    ("lab", "Documents", "Education/Labs", 0.7),
    ("main", "Documents", "Computer Science/Code", 0.6),
    ("script", "Documents", "Computer Science/Code", 0.6),
    ("config", "Documents", "Computer Science/Config", 0.7),
    ("log", "Documents", "Computer Science/Logs", 0.8),
    ("backup", "Archives", "Backups", 0.9),
    ("dump", "Archives", "Backups", 0.7),
    ("database", "Documents", "Computer Science/Data", 0.8),
    ("track", "Media", "Music", 0.6),
    ("mix", "Media", "Music", 0.6),
    ("episode", "Media", "TV Shows", 0.8),
    ("season", "Media", "TV Shows", 0.8),
    ("trailer", "Media", "Movies", 0.8),
    ("footage", "Media", "Video/Raw", 0.7),
    ("render", "Media", "Video/Renders", 0.8),
    ("resume", "Documents", "Work/Career", 0.95),
    ("cv", "Documents", "Work/Career", 0.95),
    ("letter", "Documents", "Personal/Letters", 0.6),
    ("ticket", "Documents", "Personal/Travel", 0.8),
    ("booking", "Documents", "Personal/Travel", 0.8),
    ("itinerary", "Documents", "Personal/Travel", 0.8),
    ("scan", "Documents", "Scans", 0.6),
];

/// Groups an extension is expected to land in, used to validate the
/// semantic guess (extensions are dot-less and lower-case).
const EXTENSION_ASSOCIATIONS: &[(&str, &[&str])] = &[
    ("pdf", &["Documents"]),
    ("docx", &["Documents"]),
    ("xlsx", &["Documents", "Finance"]),
    ("csv", &["Documents", "Data"]),
    ("py", &["Computer Science", "Work"]),
    ("js", &["Computer Science", "Work"]),
    ("jpg", &["Images", "Personal"]),
    ("png", &["Images", "Screenshots"]),
    ("mp4", &["Media", "Video"]),
    ("mp3", &["Media", "Music"]),
];

/// Classifies filenames from the concept lexicon.
pub struct HeuristicClassifier {
    context: Vec<String>,
}

impl HeuristicClassifier {
    /// `context_keywords` describe the user's world ("university",
    /// "freelance", ...); they are lower-cased and bias every score this
    /// classifier produces.
    pub fn new<S: AsRef<str>>(context_keywords: &[S]) -> Self {
        Self {
            context: context_keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Analyze a filename; `None` means no concept cleared the bar and the
    /// caller should fall through to the keyword hierarchy.
    pub fn classify(&self, file_name: &str, extension: &str) -> Option<Verdict> {
        let tokens = tokenize(file_name);

        let mut boost = 0.0;
        for ctx in &self.context {
            if tokens.iter().any(|t| t.contains(ctx.as_str())) {
                boost += CONTEXT_BOOST;
            }
        }

        let mut best: Option<(&str, &str)> = None;
        let mut best_score = 0.0;
        let mut reasons: Vec<String> = Vec::new();

        for token in &tokens {
            if let Some((group, path, weight)) = exact_concept(token) {
                let score = weight + boost;
                if score > best_score {
                    best_score = score;
                    best = Some((group, path));
                    reasons = vec![format!("Detected concept: '{}'", token)];
                }
            }

            if let Some((key, group, path, weight)) = closest_concept(token) {
                let score = weight * FUZZY_PENALTY + boost;
                if score > best_score {
                    best_score = score;
                    best = Some((group, path));
                    reasons = vec![format!("Fuzzy match: '{}' ~ '{}'", token, key)];
                }
            }
        }

        let (group, path) = best?;
        let mut score = best_score;

        if let Some(valid_groups) = association(&extension.to_lowercase()) {
            let accepted =
                valid_groups.contains(&group) || valid_groups.contains(&"Documents");
            if accepted {
                score += CORROBORATION_BONUS;
                reasons.push("Extension validation bonus".to_string());
            } else {
                score *= CONTRADICTION_PENALTY;
                reasons.push("Extension mismatch penalty".to_string());
            }
        }

        if score <= ACCEPTANCE_BAR {
            return None;
        }

        reasons.push("Local heuristic analysis".to_string());
        Some(Verdict::new(group, path, score.min(1.0), reasons))
    }
}

fn exact_concept(token: &str) -> Option<(&'static str, &'static str, f64)> {
    CONCEPTS
        .iter()
        .find(|(key, _, _, _)| *key == token)
        .map(|&(_, group, path, weight)| (group, path, weight))
}

/// Best concept within the similarity cutoff, first-wins on equal ratios.
fn closest_concept(token: &str) -> Option<(&'static str, &'static str, &'static str, f64)> {
    let mut best = None;
    let mut best_ratio = 0.0;
    for &(key, group, path, weight) in CONCEPTS {
        let ratio = similarity(token, key);
        if ratio >= FUZZY_CUTOFF && ratio > best_ratio {
            best_ratio = ratio;
            best = Some((key, group, path, weight));
        }
    }
    best
}

fn association(extension: &str) -> Option<&'static [&'static str]> {
    EXTENSION_ASSOCIATIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|&(_, groups)| groups)
}

/// Split a filename into meaningful lower-case tokens: separators become
/// spaces, camel-case boundaries split, digits and punctuation drop out,
/// and short or stop-word tokens are discarded.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        match ch {
            '_' | '-' | '.' => spaced.push(' '),
            _ => {
                if let Some(p) = prev
                    && p.is_ascii_lowercase()
                    && ch.is_ascii_uppercase()
                {
                    spaced.push(' ');
                }
                spaced.push(ch);
            }
        }
        prev = Some(ch);
    }

    let cleaned: String = spaced
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    cleaned
        .split_whitespace()
        .filter(|t| t.len() > 2 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Ratcliff/Obershelp similarity ratio in `[0, 1]`.
///
/// Equivalent to Python's `difflib.SequenceMatcher.ratio()`: twice the
/// total length of recursively-found longest matching blocks over the
/// combined length. Blocks tie-break toward the earliest position in the
/// first string, then the second.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_len(a, b) as f64 / total as f64
}

fn matching_len(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut best_i = 0;
    let mut best_j = 0;
    let mut best_len = 0;
    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        for slot in current.iter_mut() {
            *slot = 0;
        }
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                let len = prev[j] + 1;
                current[j + 1] = len;
                if len > best_len {
                    best_len = len;
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                }
            }
        }
        std::mem::swap(&mut prev, &mut current);
    }

    if best_len == 0 {
        return 0;
    }

    best_len
        + matching_len(&a[..best_i], &b[..best_j])
        + matching_len(&a[best_i + best_len..], &b[best_j + best_len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_separators_and_camel_case() {
        assert_eq!(
            tokenize("MyTaxReturn_2024-final.pdf"),
            ["tax", "return", "pdf"]
        );
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        assert_eq!(tokenize("copy of the lab v2.txt"), ["lab", "txt"]);
    }

    #[test]
    fn test_tokenize_strips_digits() {
        assert_eq!(tokenize("invoice2024.pdf"), ["invoice", "pdf"]);
    }

    #[test]
    fn test_similarity_identical_and_disjoint() {
        assert_eq!(similarity("invoice", "invoice"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_similarity_matches_difflib_on_typo() {
        // difflib.SequenceMatcher(None, "invioce", "invoice").ratio()
        let ratio = similarity("invioce", "invoice");
        assert!((ratio - 12.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_below_cutoff_for_loose_pairs() {
        assert!(similarity("report", "receipt") < FUZZY_CUTOFF);
        assert!(similarity("lesson", "season") < FUZZY_CUTOFF);
    }

    #[test]
    fn test_exact_concept_with_extension_bonus() {
        let classifier = HeuristicClassifier::new::<&str>(&[]);
        let verdict = classifier.classify("invoice_march.pdf", "pdf").expect("verdict");

        assert_eq!(verdict.group, "Documents");
        assert_eq!(verdict.path, "Finance/Invoices");
        // 0.9 base + 0.1 corroboration, clamped at 1.0.
        assert!((verdict.confidence - 1.0).abs() < 1e-9);
        assert!(
            verdict
                .reasons
                .contains(&"Extension validation bonus".to_string())
        );
    }

    #[test]
    fn test_fuzzy_match_catches_typo() {
        let classifier = HeuristicClassifier::new::<&str>(&[]);
        let verdict = classifier.classify("invioce_2024.pdf", "pdf").expect("verdict");

        assert_eq!(verdict.path, "Finance/Invoices");
        assert!(verdict.reasons.iter().any(|r| r.starts_with("Fuzzy match")));
    }

    #[test]
    fn test_contradicting_extension_drops_below_bar() {
        let classifier = HeuristicClassifier::new::<&str>(&[]);
        // "invoice" scores 0.9, but mp3 only accepts Media/Music, so the
        // halved score of 0.45 no longer clears the strict bar.
        assert!(classifier.classify("invoice.mp3", "mp3").is_none());
    }

    #[test]
    fn test_unknown_tokens_produce_no_verdict() {
        let classifier = HeuristicClassifier::new::<&str>(&[]);
        assert!(classifier.classify("zzqqxx.bin", "bin").is_none());
    }

    #[test]
    fn test_context_keyword_boosts_score() {
        let plain = HeuristicClassifier::new::<&str>(&[]);
        let boosted = HeuristicClassifier::new(&["thesis"]);

        let without = plain.classify("thesis_draft.txt", "txt").expect("verdict");
        let with = boosted.classify("thesis_draft.txt", "txt").expect("verdict");

        assert_eq!(without.path, "Education/Research");
        assert!(with.confidence >= without.confidence);
        assert!((with.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_context_boost_counts_each_keyword_once() {
        let classifier = HeuristicClassifier::new(&["scan"]);
        // "scan" appears in two tokens but the boost is per context
        // keyword: 0.6 + 0.25, no association for "tiff".
        let verdict = classifier
            .classify("scan_scanner.tiff", "tiff")
            .expect("verdict");
        assert!((verdict.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_short_concept_keys_are_unreachable() {
        // "cv" survives in the concept table but tokens of length <= 2 are
        // discarded, so it can only ever fire through longer fuzzy tokens.
        let classifier = HeuristicClassifier::new::<&str>(&[]);
        assert!(classifier.classify("cv.pdf", "pdf").is_none());
    }
}
