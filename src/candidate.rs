//! Per-position letter evidence.
//!
//! The [`CandidateTable`] accumulates classifier observations into one
//! aggregated [`LetterCandidate`] per `(position, glyph)` pair. Call
//! [`finalize_ordering`](CandidateTable::finalize_ordering) once accumulation
//! is done, and [`reset`](CandidateTable::reset) before reusing the table for
//! a new input.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::SessionConfig;

/// Display form of [`Glyph::Skip`], also stripped by rule normalization.
pub const SKIP_MARKER: char = '~';

/// One symbol hypothesis at a character position.
///
/// Low-confidence observations seed a [`Glyph::Skip`] alongside the real
/// letter: "this position reads as nothing" competes in the search like any
/// other candidate, but contributes no visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Glyph {
    /// A concrete character read by the classifier.
    Char(char),
    /// The position is treated as unknown/absent.
    Skip,
}

impl Glyph {
    /// The visible character, if any.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Glyph::Char(c) => Some(*c),
            Glyph::Skip => None,
        }
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Glyph::Char(c) => write!(f, "{}", c),
            Glyph::Skip => write!(f, "{}", SKIP_MARKER),
        }
    }
}

/// Aggregated evidence for one glyph at one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterCandidate {
    /// Character slot, indexed left to right.
    pub position: usize,
    /// The hypothesized symbol.
    pub glyph: Glyph,
    /// How many classifier observations were folded into `score`.
    pub occurrences: u32,
    /// Accumulated floor-adjusted score across those observations.
    pub score: f64,
}

/// Collects classifier observations per character position.
#[derive(Debug, Default)]
pub struct CandidateTable {
    // Index-addressed; grown once per out-of-range insert.
    positions: Vec<Vec<LetterCandidate>>,
}

impl CandidateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classifier observation.
    ///
    /// Observations below `min_confidence` are dropped. An observation below
    /// `skip_confidence` also seeds a [`Glyph::Skip`] candidate at the same
    /// position, scored `|skip_confidence - raw_score| + min_confidence`
    /// before the usual floor adjustment: the further the letter falls below
    /// the skip level, the stronger the case that the position is noise, while
    /// a letter just under the level still outranks its own skip.
    pub fn add_observation(
        &mut self,
        letter: char,
        position: usize,
        raw_score: f64,
        config: &SessionConfig,
    ) {
        if !raw_score.is_finite() {
            warn!("ignoring non-finite score at position {position}");
            return;
        }
        if raw_score < config.min_confidence {
            return;
        }

        self.insert(Glyph::Char(letter), position, raw_score, config);

        if raw_score < config.skip_confidence {
            let adjusted = (config.skip_confidence - raw_score).abs() + config.min_confidence;
            self.insert(Glyph::Skip, position, adjusted, config);
        }
    }

    fn insert(&mut self, glyph: Glyph, position: usize, score: f64, config: &SessionConfig) {
        let score = score - config.min_confidence;

        if self.positions.len() <= position {
            self.positions.resize_with(position + 1, Vec::new);
        }

        let slot = &mut self.positions[position];
        match slot.iter_mut().find(|candidate| candidate.glyph == glyph) {
            Some(existing) => {
                existing.occurrences += 1;
                existing.score += score;
            }
            None => slot.push(LetterCandidate {
                position,
                glyph,
                occurrences: 1,
                score,
            }),
        }
    }

    /// Sort every non-empty position by descending score.
    ///
    /// The sort is stable: equally scored candidates keep first-seen order.
    pub fn finalize_ordering(&mut self) {
        for slot in &mut self.positions {
            slot.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    /// Positions that never received a usable observation, in ascending order.
    pub fn unknown_positions(&self) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_empty())
            .map(|(position, _)| position)
            .collect()
    }

    /// Number of recorded positions (highest observed index + 1).
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// True when no observation has survived the confidence floor.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Candidates at `position`, best first once ordering is finalized.
    ///
    /// Out-of-range positions yield an empty slice.
    pub fn candidates_at(&self, position: usize) -> &[LetterCandidate] {
        self.positions
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drop all accumulated evidence for reuse with a new input.
    pub fn reset(&mut self) {
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_confidence: f64, skip_confidence: f64) -> SessionConfig {
        SessionConfig {
            min_confidence,
            skip_confidence,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn below_floor_is_dropped() {
        let mut table = CandidateTable::new();
        table.add_observation('A', 0, 40.0, &config(50.0, 0.0));
        assert!(table.is_empty());
    }

    #[test]
    fn low_confidence_seeds_a_skip() {
        let mut table = CandidateTable::new();
        table.add_observation('A', 0, 85.0, &config(50.0, 90.0));

        let candidates = table.candidates_at(0);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].glyph, Glyph::Char('A'));
        assert!((candidates[0].score - 35.0).abs() < 1e-9);
        assert_eq!(candidates[1].glyph, Glyph::Skip);
        assert!((candidates[1].score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_observations_aggregate() {
        let mut table = CandidateTable::new();
        let config = config(50.0, 0.0);
        table.add_observation('A', 2, 80.0, &config);
        table.add_observation('A', 2, 70.0, &config);

        let candidates = table.candidates_at(2);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].occurrences, 2);
        assert!((candidates[0].score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn ordering_is_descending_by_score() {
        let mut table = CandidateTable::new();
        let config = config(0.0, 0.0);
        table.add_observation('C', 0, 10.0, &config);
        table.add_observation('A', 0, 30.0, &config);
        table.add_observation('B', 0, 20.0, &config);
        table.finalize_ordering();

        let scores: Vec<f64> = table.candidates_at(0).iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn gaps_are_reported_as_unknown_positions() {
        let mut table = CandidateTable::new();
        let config = config(50.0, 0.0);
        table.add_observation('A', 0, 80.0, &config);
        table.add_observation('B', 3, 80.0, &config);

        assert_eq!(table.unknown_positions(), vec![1, 2]);
        assert_eq!(table.position_count(), 4);
    }

    #[test]
    fn reset_clears_everything() {
        let mut table = CandidateTable::new();
        table.add_observation('A', 0, 80.0, &config(50.0, 0.0));
        table.reset();
        assert!(table.is_empty());
        assert!(table.unknown_positions().is_empty());
    }
}
