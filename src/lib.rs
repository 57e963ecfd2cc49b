//! # Monte Carlo decision engines
//!
//! A family of Monte Carlo search strategies for choosing the next move in a
//! deterministic, perfect-information, alternating-move game with two or more
//! players.
//!
//! ## Features
//!
//! - **Tree search**: one parameterized MCTS engine covering UCB1, UCB1-Tuned,
//!   UCT with an exploration constant, and history-table guidance (MAST and
//!   n-gram/NST) for expansion and playouts
//! - **Recursive sampling**: the non-tree AMS sampler with EXIT estimates
//! - **Batch decisions**: independent searches run in parallel with rayon
//!
//! The rules of the game are supplied by the caller through [`GameState`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mc_search::{Agent, MctsConfig, MctsEngine, SearchLimits};
//!
//! let mut engine = MctsEngine::new(MctsConfig::nst_tuned().with_seed(7))?;
//! let best = engine.select_action(&state, &SearchLimits::iterations(10_000))?;
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Agent interface, search limits and statistics
pub mod agent;

/// Non-tree recursive sampler (AMS)
pub mod ams;

/// Parallel independent decisions
pub mod batch;

/// Game abstraction supplied by the caller
pub mod game;

/// Logger setup for harnesses embedding the engines
pub mod logging;

/// Monte Carlo Tree Search engine
pub mod mcts;

#[cfg(test)]
pub(crate) mod test_games;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use agent::{Agent, SearchLimits, SearchStats};
pub use ams::config::{AmsBackup, AmsConfig, ExplorationBonus};
pub use ams::sampler::{AmsEngine, AmsResult};
pub use batch::{decide_batch, task_seed};
pub use game::game_state::{GameState, Player, Utilities};
pub use mcts::algorithm::MctsEngine;
pub use mcts::final_selection::FinalMoveSelection;
pub use mcts::hyperparameters::MctsConfig;
pub use mcts::mcts_result::MctsResult;
pub use mcts::move_choice::{MoveChoice, TableGuidance};
pub use mcts::selection::ChildSelection;
pub use mcts::statistics::HistoryTable;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors surfaced at the engine API boundary.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("No legal moves in the root state")]
    NoLegalMoves,

    #[error("Root state is terminal")]
    TerminalState,

    #[error("Unsupported game: {0}")]
    UnsupportedGame(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SearchError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
