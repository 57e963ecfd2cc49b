//! Tree-search engine.
//!
//! Every decision builds a fresh [`Tree`] and, when configured, fresh history
//! tables. One iteration is: select a leaf (expanding at most one node), play
//! out from it, feed the playout into the tables, backpropagate the outcome.
//! The budget is checked between iterations.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::agent::{check_root, seeded_rng, Agent, Budget, SearchLimits, SearchStats};
use crate::game::game_state::GameState;
use crate::mcts::hyperparameters::MctsConfig;
use crate::mcts::mcts_result::MctsResult;
use crate::mcts::node::Tree;
use crate::mcts::playout::run_playout;
use crate::mcts::selection::select_leaf;
use crate::mcts::statistics::HistoryTables;
use crate::Result;

/// Parameterized Monte Carlo Tree Search agent.
#[derive(Debug)]
pub struct MctsEngine {
    config: MctsConfig,
    rng: StdRng,
    interrupt: Arc<AtomicBool>,
    last_stats: SearchStats,
}

impl MctsEngine {
    /// Creates an engine for a validated configuration.
    pub fn new(config: MctsConfig) -> Result<Self> {
        config.validate()?;
        log::debug!("[MCTS] new engine {}", config.to_config_string());

        Ok(Self {
            rng: seeded_rng(config.seed),
            config,
            interrupt: Arc::new(AtomicBool::new(false)),
            last_stats: SearchStats::default(),
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Runs the search from `state` and returns the tree it built.
    ///
    /// # Arguments
    /// * `state` - Root state, copied into the tree
    /// * `limits` - Decision budget; `depth` is ignored
    ///
    /// # Returns
    /// The search tree, or an error if `state` cannot be decided from.
    pub fn search_tree<G: GameState>(
        &mut self,
        state: &G,
        limits: &SearchLimits,
    ) -> Result<Tree<G>> {
        check_root(state)?;

        let budget = Budget::start(limits, &self.interrupt);
        let mut tree = Tree::new(state.clone());
        let mut tables = HistoryTables::new(self.config.history_table);
        let mut iterations = 0;

        while budget.allows(iterations) {
            self.run_iteration(&mut tree, &mut tables);
            iterations += 1;
        }

        self.last_stats = SearchStats {
            iterations,
            nodes: tree.len() as u64,
            elapsed: budget.elapsed(),
        };
        Ok(tree)
    }

    /// Runs a decision and reports the root statistics along with the move.
    pub fn analyze<G: GameState>(
        &mut self,
        state: &G,
        limits: &SearchLimits,
    ) -> Result<MctsResult<G::Move>> {
        let tree = self.search_tree(state, limits)?;
        let best_move = self.pick_move(&tree);
        let result = MctsResult::from_tree(&tree, best_move, self.last_stats.iterations);

        log::debug!(
            "[MCTS] {} chose {:?} after {} iterations ({} nodes, {:?})",
            self.config.name,
            result.best_move,
            self.last_stats.iterations,
            self.last_stats.nodes,
            self.last_stats.elapsed
        );
        if log::log_enabled!(log::Level::Trace) {
            for child in &result.children {
                log::trace!(
                    "[MCTS] root child {:?}: visits={} mean={:.3}",
                    child.mv,
                    child.visits,
                    child.mean
                );
            }
        }

        Ok(result)
    }

    fn run_iteration<G: GameState>(
        &mut self,
        tree: &mut Tree<G>,
        tables: &mut HistoryTables<G::Move>,
    ) {
        let leaf = select_leaf(
            tree,
            self.config.child_selection,
            &self.config.expansion,
            tables,
            &mut self.rng,
        );

        let playout = run_playout(
            &tree.node(leaf).state,
            &self.config.playout,
            self.config.max_playout_length,
            tables,
            &mut self.rng,
        );

        tables.update(&playout.history, &playout.utilities);
        tree.backpropagate(leaf, &playout.utilities);
    }

    /// Final selection, or a random legal move when the search never got to
    /// expand the root.
    fn pick_move<G: GameState>(&mut self, tree: &Tree<G>) -> G::Move {
        if let Some(mv) = self.config.final_selection.select_move(tree, &mut self.rng) {
            return mv;
        }

        log::warn!(
            "[MCTS] {} finished without expanding the root, playing a random move",
            self.config.name
        );
        let moves = &tree.root().unexpanded_moves;
        moves[self.rng.random_range(0..moves.len())].clone()
    }
}

impl<G: GameState> Agent<G> for MctsEngine {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn select_action(&mut self, state: &G, limits: &SearchLimits) -> Result<G::Move> {
        Ok(self.analyze(state, limits)?.best_move)
    }

    fn last_stats(&self) -> &SearchStats {
        &self.last_stats
    }

    fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }
}
