pub mod algorithm;
pub mod final_selection;
pub mod hyperparameters;
pub mod mcts_result;
pub mod move_choice;
pub mod node;
pub mod playout;
pub mod selection;
pub mod statistics;
