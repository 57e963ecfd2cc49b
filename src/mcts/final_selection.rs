//! Final move selection at the root once the budget is spent.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::game_state::GameState;
use crate::mcts::node::{NodeId, Tree};
use crate::mcts::selection::Reservoir;

/// Rule used to pick the recommended root child.
///
/// Both rules appear in the variants this engine covers; neither is applied
/// silently in place of the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalMoveSelection {
    /// Child with the highest average utility for the root mover ("max child")
    #[default]
    MaxValue,
    /// Child with the highest visit count ("robust child")
    Robust,
}

impl FinalMoveSelection {
    /// Picks a root child, breaking ties uniformly. `None` if the root has no
    /// children.
    pub fn select<G: GameState, R: Rng>(&self, tree: &Tree<G>, rng: &mut R) -> Option<NodeId> {
        let root = Tree::<G>::ROOT;
        let mover = tree.root().mover();
        let mut best = Reservoir::new();

        for (child_id, child) in tree.children(root) {
            let score = match self {
                Self::MaxValue => child.average_value(mover),
                Self::Robust => f64::from(child.visit_count),
            };
            best.offer(child_id, score, rng);
        }

        best.into_best()
    }

    /// Picks a root child and returns the move leading to it.
    pub fn select_move<G: GameState, R: Rng>(
        &self,
        tree: &Tree<G>,
        rng: &mut R,
    ) -> Option<G::Move> {
        self.select(tree, rng)
            .and_then(|child| tree.node(child).move_from_parent.clone())
    }
}
