//! Ranked reconstruction output.

use serde::{Deserialize, Serialize};

use crate::LetterCandidate;

/// One accepted reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionResult {
    /// The reconstructed visible text (skip positions omitted).
    pub text: String,
    /// Confidence score. Additive while the search runs; rescaled against the
    /// session's per-character ceiling once analysis completes.
    pub score: f64,
    /// Whether a region template accepted (and normalized) this text.
    pub matches_template: bool,
    /// The visible candidates this text was assembled from, left to right.
    pub letters: Vec<LetterCandidate>,
}

/// The rank the caller should surface: the first template match, else rank 0.
///
/// Results arrive in pop order, so rank 0 is the score winner and an earlier
/// template match always beats a later one.
pub(crate) fn best_index(results: &[ReconstructionResult]) -> usize {
    results
        .iter()
        .position(|result| result.matches_template)
        .unwrap_or(0)
}

/// Rescale additive scores so the top-ranked result lands exactly on
/// `ceiling` and the rest keep their relative proportions. Converts the
/// internal sum into a display-oriented figure; not a calibrated probability.
pub(crate) fn rescale(results: &mut [ReconstructionResult], ceiling: f64) {
    let Some(top) = results.first().map(|result| result.score) else {
        return;
    };
    if top == 0.0 {
        return;
    }
    for result in results.iter_mut() {
        result.score = ceiling * (result.score / top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str, score: f64, matches_template: bool) -> ReconstructionResult {
        ReconstructionResult {
            text: text.to_string(),
            score,
            matches_template,
            letters: Vec::new(),
        }
    }

    #[test]
    fn best_index_prefers_the_first_template_match() {
        let results = vec![
            result("AAA", 90.0, false),
            result("AAB", 80.0, true),
            result("AAC", 70.0, true),
        ];
        assert_eq!(best_index(&results), 1);
    }

    #[test]
    fn best_index_falls_back_to_rank_zero() {
        let results = vec![result("AAA", 90.0, false), result("AAB", 80.0, false)];
        assert_eq!(best_index(&results), 0);
    }

    #[test]
    fn rescale_pins_the_top_result_to_the_ceiling() {
        let mut results = vec![result("AB", 64.0, false), result("AC", 48.0, false)];
        rescale(&mut results, 92.0);
        assert_eq!(results[0].score, 92.0);
        assert_eq!(results[1].score, 69.0);
    }

    #[test]
    fn rescale_of_nothing_is_a_noop() {
        let mut results: Vec<ReconstructionResult> = Vec::new();
        rescale(&mut results, 92.0);
        assert!(results.is_empty());
    }
}
