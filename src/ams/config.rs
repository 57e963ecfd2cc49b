//! AMS configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::game_state::{Player, Utilities};
use crate::mcts::selection::{ucb1, ucb1_tuned};
use crate::{Result, SearchError};

/// How sampled values flow back up the recursion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmsBackup {
    /// Scalar value from the view of the player to move; a child's value is
    /// negated on the way up. Leaves are scored heuristically.
    #[default]
    Negamax,
    /// Full utility vectors; each level selects on its mover's component.
    /// Leaves are scored by a random playout.
    PerPlayer,
}

impl AmsBackup {
    /// Length of the value vectors passed between levels.
    pub(crate) fn width(&self, num_players: usize) -> usize {
        match self {
            Self::Negamax => 1,
            Self::PerPlayer => num_players + 1,
        }
    }

    /// Index of the value a level maximizes for `mover`.
    pub(crate) fn component(&self, mover: Player) -> usize {
        match self {
            Self::Negamax => 0,
            Self::PerPlayer => mover,
        }
    }

    /// Converts a child's value into the parent's frame.
    pub(crate) fn lift(&self, value: Utilities) -> Utilities {
        match self {
            Self::Negamax => value.into_iter().map(|v| -v).collect(),
            Self::PerPlayer => value,
        }
    }
}

/// Exploration bonus added to a move's estimate during sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationBonus {
    /// `sqrt(2 ln(total) / visits)`
    #[default]
    Ucb1,
    /// UCB1-Tuned bound, same formula as the tree search
    Ucb1Tuned,
}

impl ExplorationBonus {
    /// Upper confidence score of an estimate `q` sampled `visits` times out of
    /// `total` samples at this level.
    pub fn score(&self, q: f64, total: u32, visits: u32) -> f64 {
        match self {
            Self::Ucb1 => ucb1(q, total, visits),
            Self::Ucb1Tuned => ucb1_tuned(q, total, visits),
        }
    }
}

/// AMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmsConfig {
    /// Name reported by the engine
    pub name: String,

    /// Value representation and leaf evaluation
    /// Default: negamax
    pub backup: AmsBackup,

    /// Default: UCB1
    pub bonus: ExplorationBonus,

    /// Discount applied to estimates below the root
    /// Default: 0.9
    pub discount: f64,

    /// Discount applied to estimates at the root
    /// Default: 1.0
    pub root_discount: f64,

    /// Recursion depth when the limits give none
    /// Default: 3
    pub default_depth: u32,

    /// Samples per level after initialization when the limits give none
    /// Default: 20
    pub default_iterations: u64,

    /// Seed of the engine's random generator. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for AmsConfig {
    fn default() -> Self {
        Self {
            name: "ams".to_string(),
            backup: AmsBackup::Negamax,
            bonus: ExplorationBonus::Ucb1,
            discount: 0.9,
            root_discount: 1.0,
            default_depth: 3,
            default_iterations: 20,
            seed: None,
        }
    }
}

impl AmsConfig {
    /// Negamax sampler with heuristic leaves.
    pub fn negamax() -> Self {
        Self {
            name: "ams_negamax".to_string(),
            ..Self::default()
        }
    }

    /// Per-player sampler with playout leaves, no discount and the UCB1-Tuned
    /// bonus.
    pub fn per_player_tuned() -> Self {
        Self {
            name: "ams_per_player_tuned".to_string(),
            backup: AmsBackup::PerPlayer,
            bonus: ExplorationBonus::Ucb1Tuned,
            discount: 1.0,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.default_depth = depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("discount", self.discount), ("root_discount", self.root_discount)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SearchError::InvalidConfig(format!(
                    "{field} must be finite and positive, got {value}"
                )));
            }
        }
        if self.default_depth == 0 {
            return Err(SearchError::InvalidConfig(
                "default_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "{}[backup={:?},bonus={:?},discount={:.2},root_discount={:.2},depth={},iterations={}]",
            self.name,
            self.backup,
            self.bonus,
            self.discount,
            self.root_discount,
            self.default_depth,
            self.default_iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_presets() {
        let negamax = AmsConfig::negamax();
        assert_eq!(negamax.backup, AmsBackup::Negamax);
        assert_eq!(negamax.discount, 0.9);
        assert!(negamax.validate().is_ok());

        let tuned = AmsConfig::per_player_tuned();
        assert_eq!(tuned.backup, AmsBackup::PerPlayer);
        assert_eq!(tuned.bonus, ExplorationBonus::Ucb1Tuned);
        assert_eq!(tuned.discount, 1.0);
        assert!(tuned.validate().is_ok());
    }

    #[test]
    fn test_backup_frames() {
        assert_eq!(AmsBackup::Negamax.width(2), 1);
        assert_eq!(AmsBackup::Negamax.component(2), 0);
        assert_eq!(AmsBackup::Negamax.lift(vec![0.4]), vec![-0.4]);

        assert_eq!(AmsBackup::PerPlayer.width(3), 4);
        assert_eq!(AmsBackup::PerPlayer.component(2), 2);
        assert_eq!(AmsBackup::PerPlayer.lift(vec![0.0, 1.0, -1.0]), vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn test_bonus_matches_tree_formulas() {
        assert_eq!(ExplorationBonus::Ucb1.score(0.3, 12, 4), ucb1(0.3, 12, 4));
        assert_eq!(
            ExplorationBonus::Ucb1Tuned.score(0.3, 12, 4),
            ucb1_tuned(0.3, 12, 4)
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut config = AmsConfig::default();
        config.discount = 0.0;
        assert_matches!(config.validate(), Err(SearchError::InvalidConfig(_)));

        let config = AmsConfig::default().with_depth(0);
        assert_matches!(config.validate(), Err(SearchError::InvalidConfig(_)));
    }

    #[test]
    fn test_json() {
        let config = AmsConfig::from_json_str(
            r#"{"backup": "per_player", "bonus": "ucb1_tuned", "default_depth": 2}"#,
        )
        .unwrap();
        assert_eq!(config.backup, AmsBackup::PerPlayer);
        assert_eq!(config.default_depth, 2);
        assert_eq!(config.discount, 0.9);

        assert_matches!(
            AmsConfig::from_json_str(r#"{"root_discount": -1.0}"#),
            Err(SearchError::InvalidConfig(_))
        );
    }

    #[test]
    fn test_config_string() {
        assert!(AmsConfig::negamax()
            .to_config_string()
            .starts_with("ams_negamax[backup=Negamax"));
    }
}
