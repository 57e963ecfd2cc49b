//! Small fixture games for unit tests.

use crate::game::game_state::{empty_utilities, GameState, Player, Utilities};

/// Two-player Nim: remove 1 or 2 stones, whoever takes the last stone wins.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Nim {
    pub(crate) stones: u32,
    pub(crate) to_move: Player,
}

impl Nim {
    pub(crate) fn new(stones: u32) -> Self {
        Self { stones, to_move: 1 }
    }
}

impl GameState for Nim {
    type Move = u32;

    fn num_players(&self) -> usize {
        2
    }

    fn mover(&self) -> Player {
        self.to_move
    }

    fn legal_moves(&self) -> Vec<u32> {
        (1..=2).filter(|&take| take <= self.stones).collect()
    }

    fn apply(&mut self, mv: &u32) {
        self.stones -= mv;
        if self.stones > 0 {
            self.to_move = 3 - self.to_move;
        }
    }

    fn is_terminal(&self) -> bool {
        self.stones == 0
    }

    fn utilities(&self) -> Utilities {
        let mut utilities = empty_utilities(2);
        if self.is_terminal() {
            // The player who moved last took the last stone.
            utilities[self.to_move] = 1.0;
            utilities[3 - self.to_move] = -1.0;
        }
        utilities
    }
}

/// One decision for player 1 among fixed outcomes, then the game ends.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OnePly {
    /// Player-1 utility of each move; player 2 receives the negation.
    pub(crate) payoffs: Vec<f64>,
    pub(crate) chosen: Option<usize>,
}

impl OnePly {
    pub(crate) fn new(payoffs: Vec<f64>) -> Self {
        Self {
            payoffs,
            chosen: None,
        }
    }
}

impl GameState for OnePly {
    type Move = usize;

    fn num_players(&self) -> usize {
        2
    }

    fn mover(&self) -> Player {
        if self.chosen.is_none() {
            1
        } else {
            2
        }
    }

    fn legal_moves(&self) -> Vec<usize> {
        if self.chosen.is_some() {
            Vec::new()
        } else {
            (0..self.payoffs.len()).collect()
        }
    }

    fn apply(&mut self, mv: &usize) {
        self.chosen = Some(*mv);
    }

    fn is_terminal(&self) -> bool {
        self.chosen.is_some()
    }

    fn utilities(&self) -> Utilities {
        let mut utilities = empty_utilities(2);
        if let Some(chosen) = self.chosen {
            utilities[1] = self.payoffs[chosen];
            utilities[2] = -self.payoffs[chosen];
        }
        utilities
    }
}

/// Nim that claims to have chance events.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Shuffled(pub(crate) Nim);

impl GameState for Shuffled {
    type Move = u32;

    fn num_players(&self) -> usize {
        self.0.num_players()
    }

    fn mover(&self) -> Player {
        self.0.mover()
    }

    fn legal_moves(&self) -> Vec<u32> {
        self.0.legal_moves()
    }

    fn apply(&mut self, mv: &u32) {
        self.0.apply(mv)
    }

    fn is_terminal(&self) -> bool {
        self.0.is_terminal()
    }

    fn utilities(&self) -> Utilities {
        self.0.utilities()
    }

    fn is_stochastic(&self) -> bool {
        true
    }
}
