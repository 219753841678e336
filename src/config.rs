//! Session configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for one reconstruction session.
///
/// Scores live on whatever scale the upstream classifier emits (the defaults
/// assume 0-100 percentages). The engine never interprets scores beyond
/// comparing them against these thresholds and against each other, so a
/// 0.0-1.0 classifier works just as well with matching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Observations scoring below this floor are discarded outright.
    pub min_confidence: f64,
    /// Observations scoring below this level additionally seed a skip
    /// candidate at the same position; see
    /// [`CandidateTable::add_observation`](crate::CandidateTable::add_observation).
    pub skip_confidence: f64,
    /// Minimum visible characters for an accepted reconstruction.
    pub min_characters: usize,
    /// Maximum visible characters for an accepted reconstruction.
    pub max_characters: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 75.0,
            skip_confidence: 80.0,
            min_characters: 4,
            max_characters: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_ordered() {
        let config = SessionConfig::default();
        assert!(config.min_confidence <= config.skip_confidence);
        assert!(config.min_characters <= config.max_characters);
    }
}
