//! Selection step of the tree search.
//!
//! Descends from the root: a node with unexpanded moves gets one of them
//! expanded and the new zero-visit child becomes the iteration's leaf; a fully
//! expanded node hands over to the child chosen by a [`ChildSelection`]
//! formula. Descent also stops on terminal nodes.
//!
//! Equal scores are broken by reservoir sampling so that every tied candidate
//! is equally likely to win.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::game_state::GameState;
use crate::mcts::move_choice::MoveChoice;
use crate::mcts::node::{NodeId, Tree};
use crate::mcts::statistics::HistoryTables;

/// Uniform choice among the best-scoring items seen so far.
#[derive(Debug, Clone)]
pub struct Reservoir<T> {
    best: Option<T>,
    best_score: f64,
    ties: u32,
}

impl<T> Default for Reservoir<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Reservoir<T> {
    pub fn new() -> Self {
        Self {
            best: None,
            best_score: f64::NEG_INFINITY,
            ties: 0,
        }
    }

    /// Offers `item` with `score`. A strictly better score replaces the
    /// incumbent; the n-th equal score replaces it with probability 1/n.
    /// NaN scores only win when nothing else was offered.
    pub fn offer<R: Rng>(&mut self, item: T, score: f64, rng: &mut R) {
        let displaces_nan = self.best_score.is_nan() && !score.is_nan();
        if self.best.is_none() || displaces_nan || score > self.best_score {
            self.best = Some(item);
            self.best_score = score;
            self.ties = 1;
        } else if score == self.best_score {
            self.ties += 1;
            if rng.random_range(0..self.ties) == 0 {
                self.best = Some(item);
            }
        }
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn into_best(self) -> Option<T> {
        self.best
    }
}

/// UCB1: `exploit + sqrt(2 ln(max(1, N)) / n)`.
pub fn ucb1(exploit: f64, parent_visits: u32, child_visits: u32) -> f64 {
    let parent_log = f64::from(parent_visits.max(1)).ln();
    exploit + (2.0 * parent_log / f64::from(child_visits)).sqrt()
}

/// UCB1-Tuned with the variance term `exploit * (1 - exploit)`.
///
/// The variance term assumes utilities normalized to `[0, 1]`; with utilities
/// in `[-1, 1]` it can go negative, and strongly negative averages give a NaN
/// score, which [`Reservoir`] never prefers over a real one. Kept as is.
pub fn ucb1_tuned(exploit: f64, parent_visits: u32, child_visits: u32) -> f64 {
    let parent_log = f64::from(parent_visits.max(1)).ln();
    let visits = f64::from(child_visits);
    let variance = exploit * (1.0 - exploit);
    let bound = 0.25_f64.min(variance + (2.0 * parent_log / visits).sqrt());
    exploit + (parent_log / visits * bound).sqrt()
}

/// UCT with an explicit exploration constant: `exploit + c sqrt(ln(max(1, N)) / n)`.
pub fn uct(exploit: f64, parent_visits: u32, child_visits: u32, exploration: f64) -> f64 {
    let parent_log = f64::from(parent_visits.max(1)).ln();
    exploit + exploration * (parent_log / f64::from(child_visits)).sqrt()
}

/// Formula used to pick a child of a fully expanded node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildSelection {
    #[default]
    Ucb1,
    Ucb1Tuned,
    Uct {
        exploration: f64,
    },
    /// Uniformly random child, ignoring statistics
    Random,
}

impl ChildSelection {
    /// Score of a child with `child_visits` visits and `child_score_sum` for
    /// the mover of its parent. Unvisited children score `+inf`.
    pub fn score(&self, parent_visits: u32, child_visits: u32, child_score_sum: f64) -> f64 {
        if child_visits == 0 {
            return f64::INFINITY;
        }
        let exploit = child_score_sum / f64::from(child_visits);
        match *self {
            Self::Ucb1 => ucb1(exploit, parent_visits, child_visits),
            Self::Ucb1Tuned => ucb1_tuned(exploit, parent_visits, child_visits),
            Self::Uct { exploration } => uct(exploit, parent_visits, child_visits, exploration),
            Self::Random => 0.0,
        }
    }
}

/// Picks a child of `node` with `selection`. `None` if `node` has no children.
pub fn select_child<G: GameState, R: Rng>(
    tree: &Tree<G>,
    node: NodeId,
    selection: ChildSelection,
    rng: &mut R,
) -> Option<NodeId> {
    let parent = tree.node(node);
    let mover = parent.mover();
    let mut best = Reservoir::new();

    for (child_id, child) in tree.children(node) {
        let score = selection.score(
            parent.visit_count,
            child.visit_count,
            child.score_sums[mover],
        );
        best.offer(child_id, score, rng);
    }

    best.into_best()
}

/// Runs the selection step from the root and returns the iteration's leaf:
/// a newly expanded node, a terminal node, or an unvisited child.
///
/// `history` collects the moves of the descent (oldest first) and is what the
/// n-gram table sees as context when a guided expansion scores candidates.
pub fn select_leaf<G: GameState, R: Rng>(
    tree: &mut Tree<G>,
    selection: ChildSelection,
    expansion: &MoveChoice,
    tables: &HistoryTables<G::Move>,
    rng: &mut R,
) -> NodeId {
    let mut current = Tree::<G>::ROOT;
    let mut history: Vec<G::Move> = Vec::new();

    loop {
        let node = tree.node(current);
        if node.is_terminal() {
            break;
        }

        if node.has_unexpanded_moves() {
            let expanded = match expansion {
                MoveChoice::Random => tree.expand(current, rng),
                guided => {
                    let index =
                        guided.choose(&node.unexpanded_moves, &history, node.mover(), tables, rng);
                    Some(tree.add_child(current, index))
                }
            };
            if let Some(child) = expanded {
                current = child;
            }
            break;
        }

        match select_child(tree, current, selection, rng) {
            Some(child) => current = child,
            None => break,
        }

        let node = tree.node(current);
        if node.visit_count == 0 {
            break;
        }
        if let Some(mv) = &node.move_from_parent {
            history.push(mv.clone());
        }
    }

    current
}
