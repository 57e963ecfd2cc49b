//! Simulation step: play the game out from a leaf and record what happened.

use rand::Rng;

use crate::game::game_state::{GameState, Utilities};
use crate::mcts::move_choice::MoveChoice;
use crate::mcts::statistics::HistoryTables;

/// Outcome of one playout
#[derive(Debug, Clone, PartialEq)]
pub struct Playout<M> {
    /// Utility vector of the final state
    pub utilities: Utilities,
    /// Moves played during the playout, in order
    pub history: Vec<M>,
}

/// Plays from `state` until the game ends (or `max_length` moves were
/// played), choosing moves with `choice`. Works on a private copy of `state`.
///
/// A terminal start state is evaluated immediately with an empty history. A
/// playout cut off before the end is evaluated with
/// [`GameState::heuristic_utilities`]. Unbounded random playouts that feed no
/// table are delegated to [`GameState::random_playout`] and record no history.
pub fn run_playout<G: GameState, R: Rng>(
    state: &G,
    choice: &MoveChoice,
    max_length: Option<usize>,
    tables: &HistoryTables<G::Move>,
    rng: &mut R,
) -> Playout<G::Move> {
    if state.is_terminal() {
        return Playout {
            utilities: state.utilities(),
            history: Vec::new(),
        };
    }

    if *choice == MoveChoice::Random && max_length.is_none() && !tables.is_enabled() {
        return Playout {
            utilities: state.random_playout(rng).utilities(),
            history: Vec::new(),
        };
    }

    let mut simulated = state.clone();
    let mut history = Vec::new();

    while !simulated.is_terminal() {
        if max_length.is_some_and(|max| history.len() >= max) {
            break;
        }

        let legal_moves = simulated.legal_moves();
        if legal_moves.is_empty() {
            break;
        }

        let index = choice.choose(&legal_moves, &history, simulated.mover(), tables, rng);
        let mv = legal_moves[index].clone();
        simulated.apply(&mv);
        history.push(mv);
    }

    let utilities = if simulated.is_terminal() {
        simulated.utilities()
    } else {
        simulated.heuristic_utilities()
    };

    Playout { utilities, history }
}
