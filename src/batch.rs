//! Independent decisions in parallel.
//!
//! Every state gets its own freshly built agent, so trees, tables and random
//! generators are never shared between threads.

use rayon::prelude::*;

use crate::agent::{Agent, SearchLimits};
use crate::game::game_state::GameState;
use crate::Result;

/// Seed for the `index`-th task of a batch seeded with `base`.
pub fn task_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Decides every state of `states` on the rayon pool.
///
/// # Arguments
/// * `states` - Root states, one decision each
/// * `limits` - Budget applied to each decision
/// * `make_agent` - Builds the agent for the state at the given index
///
/// # Returns
/// One result per state, in input order.
pub fn decide_batch<G, A, F>(
    states: &[G],
    limits: &SearchLimits,
    make_agent: F,
) -> Vec<Result<G::Move>>
where
    G: GameState + Sync,
    G::Move: Send,
    A: Agent<G>,
    F: Fn(usize) -> Result<A> + Sync,
{
    let results: Vec<Result<G::Move>> = states
        .par_iter()
        .enumerate()
        .map(|(index, state)| {
            let mut agent = make_agent(index)?;
            agent.select_action(state, limits)
        })
        .collect();

    log::debug!(
        "[Batch] {} decisions, {} failed",
        results.len(),
        results.iter().filter(|result| result.is_err()).count()
    );
    results
}
