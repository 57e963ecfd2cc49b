//! Game abstraction consumed by the search engines.
//!
//! The engines never know the rules of the game they search. Everything they
//! need (legal moves, transitions, terminal test and utilities) is provided by
//! an implementation of [`GameState`] supplied by the caller.

use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;

use crate::game::simulate_game;

/// Player index. Players are numbered from 1; index 0 of a utility vector is a
/// sentinel slot that is never read as a player's score.
pub type Player = usize;

/// Per-player utility vector of length `num_players + 1`.
///
/// Terminal utilities lie in `[-1.0, 1.0]`. Heuristic evaluations of
/// non-terminal states may leave that range.
pub type Utilities = Vec<f64>;

/// Snapshot of a deterministic, fully observable, alternating-move game.
///
/// Implementations must be cheap enough to clone: the engines copy the state
/// before every transition so the caller's snapshot is never mutated.
pub trait GameState: Clone {
    /// Move identity. Equality and hashing are used to key the statistics
    /// tables, so two moves that are "the same move" must compare equal.
    type Move: Clone + Eq + Hash + Debug;

    /// Number of players taking part in the game.
    fn num_players(&self) -> usize;

    /// The player to act in this state (1-based).
    fn mover(&self) -> Player;

    /// All legal moves for the mover. Must be non-empty for non-terminal states.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Applies `mv` in place.
    fn apply(&mut self, mv: &Self::Move);

    /// Whether the game is over.
    fn is_terminal(&self) -> bool;

    /// Utility vector of a terminal state.
    fn utilities(&self) -> Utilities;

    /// Evaluation used when a search is cut off before reaching a terminal
    /// state. Defaults to [`GameState::utilities`].
    fn heuristic_utilities(&self) -> Utilities {
        self.utilities()
    }

    /// Games with chance events are not supported by the engines.
    fn is_stochastic(&self) -> bool {
        false
    }

    /// Games with hidden information are not supported by the engines.
    fn has_hidden_information(&self) -> bool {
        false
    }

    /// Plays uniformly random moves on a copy of this state until the game is
    /// over and returns the final state. Games with a faster playout of their
    /// own can override it.
    fn random_playout<R: Rng>(&self, rng: &mut R) -> Self {
        simulate_game::random_playout(self, rng)
    }

    /// Returns a copy of this state with `mv` applied.
    fn successor(&self, mv: &Self::Move) -> Self {
        let mut next = self.clone();
        next.apply(mv);
        next
    }
}

/// Zeroed utility vector sized for `num_players` players plus the sentinel.
pub fn empty_utilities(num_players: usize) -> Utilities {
    vec![0.0; num_players + 1]
}

/// Adds `values` into `sums` index-for-index.
pub fn accumulate(sums: &mut [f64], values: &[f64]) {
    for (sum, value) in sums.iter_mut().zip(values) {
        *sum += value;
    }
}

/// Whether the engines can search games of this kind.
pub fn supports_game<G: GameState>(state: &G) -> bool {
    !state.is_stochastic() && !state.has_hidden_information()
}
