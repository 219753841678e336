//! Priority-ordered permutation search.
//!
//! Explores "which candidate is chosen at each position" assignments in
//! non-increasing total-score order without materializing the cross product.
//! Children of a popped assignment advance exactly one position to its next
//! candidate; the candidate lists are sorted descending, so the score delta
//! is never negative and heap order equals global score order.

use std::collections::{BinaryHeap, HashSet};

use ordered_float::OrderedFloat;

use crate::CandidateTable;

/// Consecutive rejected permutations tolerated before the search gives up.
/// Bounds the cost of inputs where most permutations are invalid or
/// duplicates.
const CONSECUTIVE_REJECT_CUTOFF: u32 = 10;

/// One assignment of a candidate index to every position.
// Field order matters: the heap compares score first, the index vector only
// breaks exact ties (deterministically, but in no meaningful order).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Permutation {
    pub score: OrderedFloat<f64>,
    pub indices: Vec<usize>,
}

/// Max-priority queue over permutations with exact visited-state tracking.
///
/// Visited states are keyed on the full index vector. Keying on the total
/// score alone would be cheaper but collapses distinct assignments that
/// happen to collide on score.
pub(crate) struct PermutationSearch {
    queue: BinaryHeap<Permutation>,
    visited: HashSet<Vec<usize>>,
    consecutive_rejects: u32,
}

impl PermutationSearch {
    /// Seed with the all-best assignment (index 0 at every position).
    pub fn seed(table: &CandidateTable) -> Self {
        let mut total = 0.0;
        for position in 0..table.position_count() {
            if let Some(best) = table.candidates_at(position).first() {
                total += best.score;
            }
        }
        let start = Permutation {
            score: OrderedFloat(total),
            indices: vec![0; table.position_count()],
        };

        let mut queue = BinaryHeap::new();
        let mut visited = HashSet::new();
        visited.insert(start.indices.clone());
        queue.push(start);

        Self {
            queue,
            visited,
            consecutive_rejects: 0,
        }
    }

    /// The highest-scoring unexplored permutation, if any remain.
    pub fn pop(&mut self) -> Option<Permutation> {
        self.queue.pop()
    }

    /// Feed back whether the last popped permutation was accepted.
    pub fn record_outcome(&mut self, accepted: bool) {
        if accepted {
            self.consecutive_rejects = 0;
        } else {
            self.consecutive_rejects += 1;
        }
    }

    /// True once the reject cutoff has been reached.
    pub fn exhausted_patience(&self) -> bool {
        self.consecutive_rejects >= CONSECUTIVE_REJECT_CUTOFF
    }

    /// Queue every unvisited single-step descendant of `parent`.
    pub fn expand(&mut self, parent: &Permutation, table: &CandidateTable) {
        for position in 0..table.position_count() {
            let candidates = table.candidates_at(position);
            let current = parent.indices[position];
            if current + 1 >= candidates.len() {
                continue;
            }

            let delta = candidates[current].score - candidates[current + 1].score;
            let mut child = parent.clone();
            child.indices[position] += 1;
            child.score = OrderedFloat(child.score.into_inner() - delta);

            if self.visited.insert(child.indices.clone()) {
                self.queue.push(child);
            }
        }
    }
}
