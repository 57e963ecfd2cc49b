//! Decision interface shared by every engine.
//!
//! A decision takes a root state and a [`SearchLimits`] budget and returns one
//! move. Budgets are checked once per iteration: elapsed wall-clock time,
//! iteration count and a cooperative interrupt flag. A running playout is never
//! cut short.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game::game_state::{supports_game, GameState};
use crate::{Result, SearchError};

/// Budget for a single decision.
///
/// `None` means "unbounded" for that dimension. A decision with every field
/// unbounded only stops when interrupted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Wall-clock budget.
    pub time: Option<Duration>,
    /// Maximum number of iterations (tree search) or samples per level (AMS).
    pub iterations: Option<u64>,
    /// Recursion depth for AMS. Ignored by tree search.
    pub depth: Option<u32>,
}

impl SearchLimits {
    /// Limits the decision to `iterations` iterations.
    pub fn iterations(iterations: u64) -> Self {
        Self {
            iterations: Some(iterations),
            ..Self::default()
        }
    }

    /// Limits the decision to `time` of wall-clock time.
    pub fn time(time: Duration) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }
}

/// What the last decision did, for benchmarking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Completed iterations (tree search) or root-level samples (AMS).
    pub iterations: u64,
    /// Tree nodes created (tree search) or states sampled (AMS).
    pub nodes: u64,
    /// Wall-clock time spent in the decision.
    pub elapsed: Duration,
}

/// A move-selection strategy.
pub trait Agent<G: GameState> {
    /// Human-readable name used in logs and benchmarks.
    fn name(&self) -> &str;

    /// Searches from `state` within `limits` and returns the move to play.
    ///
    /// The caller's state is never mutated.
    fn select_action(&mut self, state: &G, limits: &SearchLimits) -> Result<G::Move>;

    /// Statistics of the most recent decision.
    fn last_stats(&self) -> &SearchStats;

    /// Number of iterations the most recent decision performed.
    fn last_iterations(&self) -> u64 {
        self.last_stats().iterations
    }

    /// Flag that stops the running decision at its next iteration boundary.
    ///
    /// The flag is owned by the caller: once raised it stays raised until the
    /// caller clears it.
    fn interrupt_handle(&self) -> Arc<AtomicBool>;
}

/// Seeds from `seed` when given, from the thread generator otherwise.
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Rejects root states no engine can decide from and returns the root's
/// legal moves otherwise.
pub(crate) fn check_root<G: GameState>(state: &G) -> Result<Vec<G::Move>> {
    if !supports_game(state) {
        return Err(SearchError::UnsupportedGame(
            "stochastic or hidden-information games cannot be searched".to_string(),
        ));
    }
    if state.is_terminal() {
        return Err(SearchError::TerminalState);
    }

    let legal_moves = state.legal_moves();
    if legal_moves.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    Ok(legal_moves)
}

/// Running budget of one decision.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    started: Instant,
    deadline: Option<Instant>,
    max_iterations: Option<u64>,
    interrupt: Arc<AtomicBool>,
}

impl Budget {
    pub(crate) fn start(limits: &SearchLimits, interrupt: &Arc<AtomicBool>) -> Self {
        let started = Instant::now();
        Self {
            started,
            // A budget past the clock's range means no deadline.
            deadline: limits.time.and_then(|time| started.checked_add(time)),
            max_iterations: limits.iterations,
            interrupt: Arc::clone(interrupt),
        }
    }

    /// Whether another iteration may start after `completed` iterations.
    pub(crate) fn allows(&self, completed: u64) -> bool {
        let under_count = self.max_iterations.is_none_or(|max| completed < max);
        under_count && !self.expired()
    }

    /// Deadline passed or interrupt raised.
    pub(crate) fn expired(&self) -> bool {
        let late = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        late || self.interrupt.load(Ordering::Relaxed)
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_games::{Nim, Shuffled};
    use assert_matches::assert_matches;

    #[test]
    fn test_check_root() {
        assert_eq!(check_root(&Nim::new(3)).unwrap(), vec![1, 2]);
        assert_matches!(check_root(&Nim::new(0)), Err(SearchError::TerminalState));
        assert_matches!(
            check_root(&Shuffled(Nim::new(3))),
            Err(SearchError::UnsupportedGame(_))
        );
    }

    #[test]
    fn test_budget_respects_iteration_count() {
        let interrupt = Arc::new(AtomicBool::new(false));
        let budget = Budget::start(&SearchLimits::iterations(3), &interrupt);

        assert!(budget.allows(0));
        assert!(budget.allows(2));
        assert!(!budget.allows(3));
    }

    #[test]
    fn test_budget_stops_on_interrupt() {
        let interrupt = Arc::new(AtomicBool::new(false));
        let budget = Budget::start(&SearchLimits::default(), &interrupt);
        assert!(budget.allows(1_000_000));

        interrupt.store(true, Ordering::Relaxed);
        assert!(!budget.allows(0));
        assert!(budget.expired());
    }

    #[test]
    fn test_budget_zero_time_is_expired() {
        let interrupt = Arc::new(AtomicBool::new(false));
        let budget = Budget::start(&SearchLimits::time(Duration::ZERO), &interrupt);
        assert!(budget.expired());
    }

    #[test]
    fn test_budget_huge_time_has_no_deadline() {
        let interrupt = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits::time(Duration::MAX).with_iterations(1);
        let budget = Budget::start(&limits, &interrupt);

        assert!(!budget.expired());
        assert!(budget.allows(0));
        assert!(!budget.allows(1));
    }

    #[test]
    fn test_limits_builders() {
        let limits = SearchLimits::iterations(100)
            .with_time(Duration::from_millis(50))
            .with_depth(4);
        assert_eq!(limits.iterations, Some(100));
        assert_eq!(limits.time, Some(Duration::from_millis(50)));
        assert_eq!(limits.depth, Some(4));
    }
}
