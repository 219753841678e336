//! Best-effort text reconstruction for plate recognition pipelines.
//!
//! Given per-position candidate letters with confidence scores from an
//! upstream character classifier, this crate reassembles the most probable
//! full strings, validates them against optional region format templates,
//! and returns a ranked, de-duplicated top-N with calibrated scores.
//!
//! ## Core Types
//!
//! - [`ReconstructionSession`] - Owns one input's lifecycle: accumulate
//!   observations, analyze, read the ranked results
//! - [`CandidateTable`] - Per-position aggregated letter evidence, with skip
//!   candidates for low-confidence reads
//! - [`RuleStore`] / [`FormatRule`] - Region format templates with
//!   first-match-wins priority
//! - [`ReconstructionResult`] - Ranked output carrying the template flag and
//!   the contributing letters
//!
//! The search over candidate assignments is priority-ordered and bounded (a
//! top-N cap plus a consecutive-reject cutoff), so it yields a deterministic
//! best-effort answer without enumerating the full cross product.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use plate_recon::{ReconstructionSession, RuleStore, SessionConfig};
//!
//! let rules = Arc::new(RuleStore::new());
//! let mut session = ReconstructionSession::new(SessionConfig::default(), rules);
//!
//! session.add_observation('A', 0, 92.0);
//! session.add_observation('B', 1, 90.0);
//! session.add_observation('C', 2, 88.0);
//! session.add_observation('1', 3, 85.0);
//!
//! session.analyze(None, 5);
//! assert_eq!(session.best_text(), "ABC1");
//! ```

mod candidate;
mod config;
mod result;
mod rules;
mod search;
mod session;

pub use candidate::{CandidateTable, Glyph, LetterCandidate, SKIP_MARKER};
pub use config::SessionConfig;
pub use result::ReconstructionResult;
pub use rules::{FormatRule, RuleStore, RuleStoreError};
pub use session::ReconstructionSession;
