pub mod game_state;
pub mod simulate_game;
