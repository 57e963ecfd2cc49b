//! Fixture games shared by the integration tests.

#![allow(dead_code)]

use mc_search::{GameState, Player, Utilities};

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Tic-tac-toe. Player 1 plays first; cells hold 0 when empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TicTacToe {
    pub cells: [Player; 9],
    pub to_move: Player,
}

impl TicTacToe {
    pub fn new() -> Self {
        Self {
            cells: [0; 9],
            to_move: 1,
        }
    }

    /// Board from a picture such as `"xo.|.x.|..o"`; `x` is player 1.
    pub fn from_rows(rows: &str, to_move: Player) -> Self {
        let mut cells = [0; 9];
        let marks = rows.chars().filter(|c| *c != '|');
        for (cell, mark) in cells.iter_mut().zip(marks) {
            *cell = match mark {
                'x' => 1,
                'o' => 2,
                _ => 0,
            };
        }
        Self { cells, to_move }
    }

    pub fn winner(&self) -> Option<Player> {
        LINES.iter().find_map(|line| {
            let first = self.cells[line[0]];
            (first != 0 && line.iter().all(|&cell| self.cells[cell] == first)).then_some(first)
        })
    }
}

impl GameState for TicTacToe {
    type Move = usize;

    fn num_players(&self) -> usize {
        2
    }

    fn mover(&self) -> Player {
        self.to_move
    }

    fn legal_moves(&self) -> Vec<usize> {
        if self.winner().is_some() {
            return Vec::new();
        }
        (0..9).filter(|&cell| self.cells[cell] == 0).collect()
    }

    fn apply(&mut self, mv: &usize) {
        self.cells[*mv] = self.to_move;
        self.to_move = 3 - self.to_move;
    }

    fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.cells.iter().all(|&cell| cell != 0)
    }

    fn utilities(&self) -> Utilities {
        let mut utilities = vec![0.0; 3];
        if let Some(winner) = self.winner() {
            utilities[winner] = 1.0;
            utilities[3 - winner] = -1.0;
        }
        utilities
    }
}

/// Counting race for `players` players: each turn adds 1 or 2 to the total,
/// whoever reaches `target` exactly wins and every other player loses.
#[derive(Debug, Clone, PartialEq)]
pub struct Race {
    pub players: usize,
    pub total: u32,
    pub target: u32,
    pub to_move: Player,
    pub winner: Option<Player>,
}

impl Race {
    pub fn new(players: usize, target: u32) -> Self {
        Self {
            players,
            total: 0,
            target,
            to_move: 1,
            winner: None,
        }
    }
}

impl GameState for Race {
    type Move = u32;

    fn num_players(&self) -> usize {
        self.players
    }

    fn mover(&self) -> Player {
        self.to_move
    }

    fn legal_moves(&self) -> Vec<u32> {
        (1..=2).filter(|step| self.total + step <= self.target).collect()
    }

    fn apply(&mut self, mv: &u32) {
        self.total += mv;
        if self.total == self.target {
            self.winner = Some(self.to_move);
        }
        self.to_move = self.to_move % self.players + 1;
    }

    fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    fn utilities(&self) -> Utilities {
        let mut utilities = vec![0.0; self.players + 1];
        if let Some(winner) = self.winner {
            for (player, utility) in utilities.iter_mut().enumerate().skip(1) {
                *utility = if player == winner { 1.0 } else { -1.0 };
            }
        }
        utilities
    }
}
