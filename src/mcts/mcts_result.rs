use serde::{Deserialize, Serialize};

use crate::game::game_state::{GameState, Player};
use crate::mcts::node::Tree;

/// Root child statistics after a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSummary<M> {
    pub mv: M,
    pub visits: u32,
    /// Average utility for the root mover
    pub mean: f64,
}

/// Outcome of one tree-search decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MctsResult<M> {
    pub best_move: M,
    /// Player the decision was made for
    pub mover: Player,
    /// Root children in expansion order
    pub children: Vec<ChildSummary<M>>,
    pub iterations: u64,
}

impl<M: Clone> MctsResult<M> {
    /// Collects the root children of `tree` around an already chosen move.
    pub fn from_tree<G>(tree: &Tree<G>, best_move: M, iterations: u64) -> Self
    where
        G: GameState<Move = M>,
    {
        let mover = tree.root().mover();
        let children = tree
            .children(Tree::<G>::ROOT)
            .filter_map(|(_, child)| {
                child.move_from_parent.clone().map(|mv| ChildSummary {
                    mv,
                    visits: child.visit_count,
                    mean: child.average_value(mover),
                })
            })
            .collect();

        Self {
            best_move,
            mover,
            children,
            iterations,
        }
    }

    /// Visit share of each root child, summing to 1 when any child was visited.
    pub fn visit_distribution(&self) -> Vec<(M, f64)> {
        let total: u32 = self.children.iter().map(|child| child.visits).sum();
        self.children
            .iter()
            .map(|child| {
                let share = if total == 0 {
                    0.0
                } else {
                    f64::from(child.visits) / f64::from(total)
                };
                (child.mv.clone(), share)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_games::OnePly;

    #[test]
    fn test_from_tree_collects_children() {
        let mut tree = Tree::new(OnePly::new(vec![0.5, -0.5]));
        let first = tree.add_child(Tree::<OnePly>::ROOT, 0);
        let second = tree.add_child(Tree::<OnePly>::ROOT, 0);
        tree.backpropagate(first, &[0.0, 0.5, -0.5]);
        for _ in 0..3 {
            tree.backpropagate(second, &[0.0, -0.5, 0.5]);
        }

        let result = MctsResult::from_tree(&tree, 0, 4);
        assert_eq!(result.mover, 1);
        assert_eq!(result.children.len(), 2);
        assert_eq!(result.children[0].mv, 0);
        assert_eq!(result.children[1].visits, 3);
        assert!((result.children[1].mean + 0.5).abs() < 1e-12);

        let distribution = result.visit_distribution();
        assert!((distribution[0].1 - 0.25).abs() < 1e-12);
        assert!((distribution[1].1 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_empty_distribution() {
        let tree = Tree::new(OnePly::new(vec![0.5]));
        let result = MctsResult::from_tree(&tree, 0, 0);
        assert!(result.children.is_empty());
        assert!(result.visit_distribution().is_empty());
    }
}
