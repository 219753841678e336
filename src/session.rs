//! One-input analysis session.
//!
//! A [`ReconstructionSession`] ties the candidate table, the permutation
//! search, and the rule store together for a single segmented input:
//! accumulate observations, [`analyze`](ReconstructionSession::analyze), read
//! the ranked results, then [`reset`](ReconstructionSession::reset) before the
//! next input.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, trace};

use crate::result::{best_index, rescale};
use crate::search::PermutationSearch;
use crate::{
    CandidateTable, Glyph, ReconstructionResult, RuleStore, SessionConfig,
};

/// Reconstructs ranked candidate strings for one segmented input.
///
/// The session owns its evidence and results. The shared [`RuleStore`] is
/// immutable and may back any number of sessions concurrently.
pub struct ReconstructionSession {
    config: SessionConfig,
    rules: Arc<RuleStore>,
    table: CandidateTable,
    results: Vec<ReconstructionResult>,
    seen_texts: HashSet<String>,
    best_text: String,
}

impl ReconstructionSession {
    pub fn new(config: SessionConfig, rules: Arc<RuleStore>) -> Self {
        Self {
            config,
            rules,
            table: CandidateTable::new(),
            results: Vec::new(),
            seen_texts: HashSet::new(),
            best_text: String::new(),
        }
    }

    /// Feed one classifier observation; see
    /// [`CandidateTable::add_observation`] for the threshold semantics.
    pub fn add_observation(&mut self, letter: char, position: usize, raw_score: f64) {
        self.table
            .add_observation(letter, position, raw_score, &self.config);
    }

    /// Whether any format rules exist for `region`.
    pub fn region_is_valid(&self, region: &str) -> bool {
        self.rules.has_region(region)
    }

    /// Ranked results of the last [`analyze`](Self::analyze) call.
    pub fn results(&self) -> &[ReconstructionResult] {
        &self.results
    }

    /// Best reconstruction of the last [`analyze`](Self::analyze) call: the
    /// highest-ranked template match if one exists, otherwise the top-scoring
    /// text. Empty when analysis produced nothing.
    pub fn best_text(&self) -> &str {
        &self.best_text
    }

    /// Positions that never received a usable observation.
    pub fn unknown_positions(&self) -> Vec<usize> {
        self.table.unknown_positions()
    }

    /// Clear all per-input state for reuse.
    pub fn reset(&mut self) {
        self.table.reset();
        self.results.clear();
        self.seen_texts.clear();
        self.best_text.clear();
    }

    /// Run the ranked reconstruction over everything observed so far.
    ///
    /// `template_region` selects the rule list used for validation and
    /// normalization; `None`, or a region with no rules, skips the template
    /// phase entirely. At most `top_n` results are produced. With no usable
    /// observations this is a no-op and the result list stays empty.
    pub fn analyze(
        &mut self,
        template_region: Option<&str>,
        top_n: usize,
    ) -> &[ReconstructionResult] {
        if self.table.is_empty() {
            return &self.results;
        }

        let unknown = self.table.unknown_positions();
        if !unknown.is_empty() {
            debug!("positions without usable candidates: {unknown:?}");
        }

        self.table.finalize_ordering();
        self.log_table();

        self.run_search(template_region, top_n);

        if !self.results.is_empty() {
            self.best_text = self.results[best_index(&self.results)].text.clone();
            let ceiling = self.confidence_ceiling();
            rescale(&mut self.results, ceiling);
        }

        &self.results
    }

    fn run_search(&mut self, template_region: Option<&str>, top_n: usize) {
        let mut search = PermutationSearch::seed(&self.table);
        while let Some(permutation) = search.pop() {
            let accepted = self.evaluate(&permutation.indices, template_region);
            search.record_outcome(accepted);

            if self.results.len() >= top_n || search.exhausted_patience() {
                break;
            }
            search.expand(&permutation, &self.table);
        }
    }

    /// Assemble and vet the candidate string for one index assignment.
    /// Returns false on rejection (length window, duplicate text).
    fn evaluate(&mut self, indices: &[usize], template_region: Option<&str>) -> bool {
        let mut text = String::new();
        let mut letters = Vec::new();
        let mut score = 0.0;

        for position in 0..self.table.position_count() {
            let candidates = self.table.candidates_at(position);
            if candidates.is_empty() {
                continue;
            }
            let candidate = &candidates[indices[position]];
            // Skips contribute score but neither text nor length.
            if let Glyph::Char(c) = candidate.glyph {
                text.push(c);
                letters.push(candidate.clone());
            }
            score += candidate.score;
        }

        let visible = text.chars().count();
        if visible < self.config.min_characters || visible > self.config.max_characters {
            trace!("rejecting {text:?}: {visible} visible character(s)");
            return false;
        }

        let mut matches_template = false;
        if let Some(region) = template_region {
            for rule in self.rules.rules_for(region) {
                if rule.matches(&text) {
                    matches_template = true;
                    text = rule.normalize(&text);
                    break;
                }
            }
        }

        if !self.seen_texts.insert(text.clone()) {
            trace!("rejecting duplicate {text:?}");
            return false;
        }

        debug!("accepted {text:?} (score {score:.3}, template match: {matches_template})");
        self.results.push(ReconstructionResult {
            text,
            score,
            matches_template,
            letters,
        });
        true
    }

    /// Mean best-candidate confidence across populated positions, mapped back
    /// onto the classifier's raw scale. Approximates the expected
    /// per-character ceiling the rescaled scores are pinned to.
    fn confidence_ceiling(&self) -> f64 {
        let mut total = 0.0;
        let mut populated = 0;
        for position in 0..self.table.position_count() {
            if let Some(best) = self.table.candidates_at(position).first() {
                total += best.score / f64::from(best.occurrences) + self.config.min_confidence;
                populated += 1;
            }
        }
        if populated == 0 {
            0.0
        } else {
            total / f64::from(populated)
        }
    }

    fn log_table(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for position in 0..self.table.position_count() {
            for candidate in self.table.candidates_at(position) {
                debug!(
                    "position {position}: {} score {:.3} over {} occurrence(s)",
                    candidate.glyph, candidate.score, candidate.occurrences
                );
            }
        }
    }
}
