//! MCTS configuration
//!
//! One [`MctsConfig`] describes a complete tree-search variant. The named
//! presets reproduce the classic variants (plain UCB1, UCB1-Tuned, UCT, MAST,
//! NST); anything in between can be built by hand or loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mcts::final_selection::FinalMoveSelection;
use crate::mcts::move_choice::{MoveChoice, TableGuidance, DEFAULT_MIN_VISITS};
use crate::mcts::selection::ChildSelection;
use crate::mcts::statistics::{HistoryTable, DEFAULT_MAX_GRAM_LENGTH};
use crate::{Result, SearchError};

/// Exploration constant of the UCT preset.
pub const DEFAULT_UCT_EXPLORATION: f64 = 0.4;

/// Exploration probability of the guided playouts in the MAST and NST presets.
pub const DEFAULT_PLAYOUT_EPSILON: f64 = 0.1;

/// Tree-search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Name reported by the engine
    pub name: String,

    // ========== Tree policy ==========
    /// Formula for picking a child of a fully expanded node
    /// Default: UCB1
    pub child_selection: ChildSelection,

    /// How the next unexpanded move of a node is picked
    /// Default: random
    pub expansion: MoveChoice,

    // ========== Playouts ==========
    /// How playout moves are picked
    /// Default: random
    pub playout: MoveChoice,

    /// Statistics gathered from playouts, used by guided choices
    /// Default: none
    pub history_table: HistoryTable,

    /// Playout length after which the game is evaluated heuristically.
    /// `None` plays every playout to the end.
    pub max_playout_length: Option<usize>,

    // ========== Decision ==========
    /// Rule for the returned root child
    /// Default: max value
    pub final_selection: FinalMoveSelection,

    /// Seed of the engine's random generator. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            name: "mcts".to_string(),
            child_selection: ChildSelection::Ucb1,
            expansion: MoveChoice::Random,
            playout: MoveChoice::Random,
            history_table: HistoryTable::None,
            max_playout_length: None,
            final_selection: FinalMoveSelection::MaxValue,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Plain UCB1 tree search, returning the most visited child.
    pub fn vanilla() -> Self {
        Self {
            name: "vanilla".to_string(),
            final_selection: FinalMoveSelection::Robust,
            ..Self::default()
        }
    }

    /// UCB1-Tuned tree search, returning the best-valued child.
    pub fn vanilla_tuned() -> Self {
        Self {
            name: "vanilla_tuned".to_string(),
            child_selection: ChildSelection::Ucb1Tuned,
            ..Self::default()
        }
    }

    /// UCT with exploration constant `exploration`.
    pub fn uct(exploration: f64) -> Self {
        Self {
            name: format!("uct_{exploration}"),
            child_selection: ChildSelection::Uct { exploration },
            ..Self::default()
        }
    }

    /// Move-Average Sampling: UCB1-Tuned tree, expansion and playouts both
    /// guided by per-move averages.
    pub fn mast_tuned() -> Self {
        let guidance = MoveChoice::TableGuided(TableGuidance::new(DEFAULT_PLAYOUT_EPSILON, 0));
        Self {
            name: "mast_tuned".to_string(),
            child_selection: ChildSelection::Ucb1Tuned,
            expansion: guidance,
            playout: guidance,
            history_table: HistoryTable::MoveAverage,
            ..Self::default()
        }
    }

    /// N-gram Selection: UCT tree, playouts guided by move-sequence averages.
    pub fn nst() -> Self {
        Self {
            name: "nst".to_string(),
            child_selection: ChildSelection::Uct {
                exploration: DEFAULT_UCT_EXPLORATION,
            },
            playout: MoveChoice::TableGuided(TableGuidance::new(DEFAULT_PLAYOUT_EPSILON, 0)),
            history_table: HistoryTable::NGram {
                max_length: DEFAULT_MAX_GRAM_LENGTH,
            },
            ..Self::default()
        }
    }

    /// Tuned N-gram Selection: UCB1-Tuned tree, greedy n-gram guidance for
    /// both expansion and playouts, with a visit threshold on longer grams.
    pub fn nst_tuned() -> Self {
        let guidance = MoveChoice::TableGuided(TableGuidance::new(0.0, DEFAULT_MIN_VISITS));
        Self {
            name: "nst_tuned".to_string(),
            child_selection: ChildSelection::Ucb1Tuned,
            expansion: guidance,
            playout: guidance,
            history_table: HistoryTable::NGram {
                max_length: DEFAULT_MAX_GRAM_LENGTH,
            },
            ..Self::default()
        }
    }

    /// Looks up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "vanilla" => Some(Self::vanilla()),
            "vanilla_tuned" => Some(Self::vanilla_tuned()),
            "uct" => Some(Self::uct(DEFAULT_UCT_EXPLORATION)),
            "mast_tuned" => Some(Self::mast_tuned()),
            "nst" => Some(Self::nst()),
            "nst_tuned" => Some(Self::nst_tuned()),
            _ => None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the configuration describes a runnable engine.
    pub fn validate(&self) -> Result<()> {
        if let ChildSelection::Uct { exploration } = self.child_selection {
            if !exploration.is_finite() || exploration < 0.0 {
                return Err(SearchError::InvalidConfig(format!(
                    "UCT exploration constant must be finite and non-negative, got {exploration}"
                )));
            }
        }

        if let HistoryTable::NGram { max_length } = self.history_table {
            if max_length == 0 {
                return Err(SearchError::InvalidConfig(
                    "n-gram table needs a maximum length of at least 1".to_string(),
                ));
            }
        }

        for (stage, choice) in [("expansion", &self.expansion), ("playout", &self.playout)] {
            if let MoveChoice::TableGuided(guidance) = choice {
                if !(0.0..=1.0).contains(&guidance.epsilon) {
                    return Err(SearchError::InvalidConfig(format!(
                        "{stage} epsilon must be within [0, 1], got {}",
                        guidance.epsilon
                    )));
                }
                if self.history_table == HistoryTable::None {
                    return Err(SearchError::InvalidConfig(format!(
                        "{stage} is table-guided but no history table is configured"
                    )));
                }
            }
        }

        if self.max_playout_length == Some(0) {
            return Err(SearchError::InvalidConfig(
                "max_playout_length must be positive when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Parses and validates a configuration from JSON. Missing fields take
    /// their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Compact description for logging.
    pub fn to_config_string(&self) -> String {
        format!(
            "{}[select={:?},expand={:?},playout={:?},table={:?},final={:?}]",
            self.name,
            self.child_selection,
            self.expansion,
            self.playout,
            self.history_table,
            self.final_selection
        )
    }
}
