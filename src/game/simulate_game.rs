use rand::Rng;

use crate::game::game_state::GameState;

/// Plays uniformly random moves from `state` until the game is over and
/// returns the final state. The input snapshot is left untouched.
pub fn random_playout<G: GameState, R: Rng>(state: &G, rng: &mut R) -> G {
    let mut simulated = state.clone();

    while !simulated.is_terminal() {
        let legal_moves = simulated.legal_moves();
        if legal_moves.is_empty() {
            break;
        }

        let move_index = rng.random_range(0..legal_moves.len());
        simulated.apply(&legal_moves[move_index]);
    }

    simulated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_games::Nim;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_playout_ends_game() {
        let mut rng = StdRng::seed_from_u64(1);
        let start = Nim::new(9);

        let end = random_playout(&start, &mut rng);
        assert!(end.is_terminal());
        assert_eq!(start, Nim::new(9));
    }

    #[test]
    fn test_terminal_state_is_returned_as_is() {
        let mut rng = StdRng::seed_from_u64(2);
        let end = Nim::new(0).random_playout(&mut rng);
        assert_eq!(end, Nim::new(0));
    }
}
