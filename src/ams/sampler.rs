//! Recursive sampling engine.
//!
//! Each level works on one state with remaining depth `d`:
//! 1. At `d == 0` or on a terminal state the leaf is evaluated.
//! 2. Every legal move is sampled once at depth `d - 1`.
//! 3. Until the level's budget is spent (or the decision's deadline passes),
//!    the move maximizing `Q + bonus` is sampled again.
//! 4. The level returns `sum(visits / total * Q)` over its moves.
//!
//! The initialization in step 2 always completes; only the loop in step 3
//! watches the deadline and the interrupt flag.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{check_root, seeded_rng, Agent, Budget, SearchLimits, SearchStats};
use crate::ams::config::{AmsBackup, AmsConfig};
use crate::game::game_state::{GameState, Player, Utilities};
use crate::mcts::selection::Reservoir;
use crate::Result;

/// Per-move sample statistics of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionStats {
    /// Samples drawn for each move
    pub visits: Vec<u32>,
    /// Sum of the sampled values of each move
    pub sums: Vec<Utilities>,
}

impl ActionStats {
    pub fn new(actions: usize, width: usize) -> Self {
        Self {
            visits: vec![0; actions],
            sums: vec![vec![0.0; width]; actions],
        }
    }

    pub fn total(&self) -> u32 {
        self.visits.iter().sum()
    }

    pub fn record(&mut self, action: usize, value: &[f64]) {
        self.visits[action] += 1;
        for (sum, v) in self.sums[action].iter_mut().zip(value) {
            *sum += v;
        }
    }

    /// Discounted average `discount / visits * sum` of `action` in `component`.
    pub fn q(&self, action: usize, component: usize, discount: f64) -> f64 {
        let visits = self.visits[action];
        if visits == 0 {
            return 0.0;
        }
        discount / f64::from(visits) * self.sums[action][component]
    }

    /// Visit-weighted estimate over every move, per component.
    pub fn exit_estimate(&self, discount: f64) -> Utilities {
        let width = self.sums.first().map_or(0, Vec::len);
        let mut estimate = vec![0.0; width];
        let total = self.total();
        if total == 0 {
            return estimate;
        }

        for action in 0..self.visits.len() {
            let weight = f64::from(self.visits[action]) / f64::from(total);
            for (component, value) in estimate.iter_mut().enumerate() {
                *value += weight * self.q(action, component, discount);
            }
        }
        estimate
    }
}

/// Root estimate of one move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEstimate<M> {
    pub mv: M,
    pub visits: u32,
    /// Discounted average for the root mover
    pub q: f64,
}

/// Outcome of one AMS decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmsResult<M> {
    pub best_move: M,
    pub mover: Player,
    /// Root moves in legal-move order
    pub estimates: Vec<ActionEstimate<M>>,
    /// States sampled at every level
    pub sampled: u64,
}

/// State threaded through the recursion of one decision.
struct Sampler<'a, R> {
    config: &'a AmsConfig,
    budget: &'a Budget,
    per_level: u64,
    rng: &'a mut R,
    sampled: u64,
}

impl<R: Rng> Sampler<'_, R> {
    /// Value of `state`, entered by `parent_mover`, in the frame of the
    /// backup mode.
    fn sample<G: GameState>(&mut self, state: &G, depth: u32, parent_mover: Player) -> Utilities {
        self.sampled += 1;
        if depth == 0 || state.is_terminal() {
            return self.leaf_value(state, parent_mover);
        }

        let moves = state.legal_moves();
        if moves.is_empty() {
            return self.leaf_value(state, parent_mover);
        }

        let discount = self.config.discount;
        self.sample_level(state, &moves, depth, discount)
            .exit_estimate(discount)
    }

    /// Negamax leaves are scored for the player to act after `parent_mover`,
    /// that is as the negation of the parent mover's heuristic utility.
    fn leaf_value<G: GameState>(&mut self, state: &G, parent_mover: Player) -> Utilities {
        match self.config.backup {
            AmsBackup::Negamax => {
                vec![-state.heuristic_utilities()[parent_mover]]
            }
            AmsBackup::PerPlayer => {
                if state.is_terminal() {
                    state.utilities()
                } else {
                    state.random_playout(&mut *self.rng).utilities()
                }
            }
        }
    }

    fn sample_level<G: GameState>(
        &mut self,
        state: &G,
        moves: &[G::Move],
        depth: u32,
        discount: f64,
    ) -> ActionStats {
        let backup = self.config.backup;
        let mover = state.mover();
        let component = backup.component(mover);
        let child_depth = depth.saturating_sub(1);
        let mut stats = ActionStats::new(moves.len(), backup.width(state.num_players()));

        for (action, mv) in moves.iter().enumerate() {
            let value = self.sample_child(state, mv, child_depth, mover);
            stats.record(action, &value);
        }

        let mut samples = 0;
        while samples < self.per_level && !self.budget.expired() {
            let total = stats.total();
            let mut best = Reservoir::new();
            for (action, &visits) in stats.visits.iter().enumerate() {
                let q = stats.q(action, component, discount);
                best.offer(action, self.config.bonus.score(q, total, visits), &mut *self.rng);
            }

            let Some(action) = best.into_best() else {
                break;
            };
            let value = self.sample_child(state, &moves[action], child_depth, mover);
            stats.record(action, &value);
            samples += 1;
        }

        stats
    }

    fn sample_child<G: GameState>(
        &mut self,
        state: &G,
        mv: &G::Move,
        depth: u32,
        mover: Player,
    ) -> Utilities {
        let child = state.successor(mv);
        let value = self.sample(&child, depth, mover);
        self.config.backup.lift(value)
    }
}

/// Adaptive Multi-stage Sampling agent.
#[derive(Debug)]
pub struct AmsEngine {
    config: AmsConfig,
    rng: StdRng,
    interrupt: Arc<AtomicBool>,
    last_stats: SearchStats,
}

impl AmsEngine {
    pub fn new(config: AmsConfig) -> Result<Self> {
        config.validate()?;
        log::debug!("[AMS] new engine {}", config.to_config_string());

        Ok(Self {
            rng: seeded_rng(config.seed),
            config,
            interrupt: Arc::new(AtomicBool::new(false)),
            last_stats: SearchStats::default(),
        })
    }

    pub fn config(&self) -> &AmsConfig {
        &self.config
    }

    /// Runs a decision and reports the root estimates along with the move.
    ///
    /// # Arguments
    /// * `state` - Root state
    /// * `limits` - `depth` and `iterations` (samples per level after
    ///   initialization) fall back to the configured defaults; `time` bounds
    ///   the whole decision
    pub fn analyze<G: GameState>(
        &mut self,
        state: &G,
        limits: &SearchLimits,
    ) -> Result<AmsResult<G::Move>> {
        let moves = check_root(state)?;
        let budget = Budget::start(limits, &self.interrupt);
        let depth = limits.depth.unwrap_or(self.config.default_depth);
        let per_level = limits.iterations.unwrap_or(self.config.default_iterations);
        let root_discount = self.config.root_discount;

        let mut sampler = Sampler {
            config: &self.config,
            budget: &budget,
            per_level,
            rng: &mut self.rng,
            sampled: 0,
        };
        let stats = sampler.sample_level(state, &moves, depth, root_discount);
        let sampled = sampler.sampled;

        let mover = state.mover();
        let component = self.config.backup.component(mover);
        let total = f64::from(stats.total());
        let mut best = Reservoir::new();
        for (action, &visits) in stats.visits.iter().enumerate() {
            let weighted = stats.q(action, component, root_discount) * f64::from(visits) / total;
            best.offer(action, weighted, &mut self.rng);
        }
        let best_action = best.into_best().unwrap_or(0);

        let estimates: Vec<ActionEstimate<G::Move>> = moves
            .iter()
            .enumerate()
            .map(|(action, mv)| ActionEstimate {
                mv: mv.clone(),
                visits: stats.visits[action],
                q: stats.q(action, component, root_discount),
            })
            .collect();

        self.last_stats = SearchStats {
            iterations: u64::from(stats.total()),
            nodes: sampled,
            elapsed: budget.elapsed(),
        };

        log::debug!(
            "[AMS] {} chose {:?} after {} root samples ({} states, depth {}, {:?})",
            self.config.name,
            moves[best_action],
            self.last_stats.iterations,
            sampled,
            depth,
            self.last_stats.elapsed
        );
        if log::log_enabled!(log::Level::Trace) {
            for estimate in &estimates {
                log::trace!(
                    "[AMS] root move {:?}: visits={} q={:.3}",
                    estimate.mv,
                    estimate.visits,
                    estimate.q
                );
            }
        }

        Ok(AmsResult {
            best_move: moves[best_action].clone(),
            mover,
            estimates,
            sampled,
        })
    }
}

impl<G: GameState> Agent<G> for AmsEngine {
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
