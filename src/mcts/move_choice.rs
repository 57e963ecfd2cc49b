//! Move choice rules shared by expansion and playouts.
//!
//! A guided choice is epsilon-greedy over a statistics table: with probability
//! `epsilon` a uniformly random candidate, otherwise the candidate with the best
//! table score for the mover. Candidates the table has never seen score
//! [`UNSEEN_MOVE_SCORE`] so that untried moves are tried first.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::game_state::Player;
use crate::mcts::selection::Reservoir;
use crate::mcts::statistics::HistoryTables;

/// Score given to a move without a trusted table entry.
pub const UNSEEN_MOVE_SCORE: f64 = f64::INFINITY;

/// Visit threshold used by the tuned n-gram variants.
pub const DEFAULT_MIN_VISITS: u32 = 7;

/// Parameters of an epsilon-greedy table-guided choice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableGuidance {
    /// Probability of a uniformly random choice
    pub epsilon: f64,
    /// Visits an entry needs before its score is trusted.
    /// For the move-average table this applies to the move's own entry, for
    /// the n-gram table to every chain entry longer than one move.
    pub min_visits: u32,
}

impl TableGuidance {
    pub fn new(epsilon: f64, min_visits: u32) -> Self {
        Self {
            epsilon,
            min_visits,
        }
    }
}

/// How a move is picked among candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveChoice {
    /// Uniformly random
    #[default]
    Random,
    /// Epsilon-greedy over the decision's history table
    TableGuided(TableGuidance),
}

impl MoveChoice {
    /// Picks the index of one of `candidates`.
    ///
    /// # Arguments
    /// * `candidates` - Moves to choose from, must be non-empty
    /// * `history` - Moves played before this choice, oldest first
    /// * `mover` - Player making the choice
    /// * `tables` - Statistics of the current decision
    ///
    /// # Panics
    /// Panics if `candidates` is empty.
    pub fn choose<M, R: Rng>(
        &self,
        candidates: &[M],
        history: &[M],
        mover: Player,
        tables: &HistoryTables<M>,
        rng: &mut R,
    ) -> usize
    where
        M: Clone + Eq + std::hash::Hash,
    {
        match self {
            Self::Random => rng.random_range(0..candidates.len()),
            Self::TableGuided(guidance) => {
                if rng.random_bool(guidance.epsilon) {
                    return rng.random_range(0..candidates.len());
                }

                let mut best = Reservoir::new();
                for (index, candidate) in candidates.iter().enumerate() {
                    let score = tables
                        .score(candidate, history, mover, guidance.min_visits)
                        .unwrap_or(UNSEEN_MOVE_SCORE);
                    best.offer(index, score, rng);
                }
                best.into_best().unwrap_or(0)
            }
        }
    }

    pub fn is_guided(&self) -> bool {
        matches!(self, Self::TableGuided(_))
    }
}
