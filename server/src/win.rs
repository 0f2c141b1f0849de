//! Win condition evaluation

use crate::session::SessionRegistry;
use shared::{ServerMessage, Winner};

/// Checks the living population.
///
/// Good wins once no evil session is alive; evil wins as soon as living
/// evil sessions are at least as many as living good ones.
pub fn evaluate(registry: &SessionRegistry) -> Option<Winner> {
    let alive = registry.iter().filter(|s| s.alive).count();
    let evil_alive = registry.iter().filter(|s| s.alive && s.is_evil()).count();
    let good_alive = alive - evil_alive;

    if evil_alive == 0 {
        Some(Winner::Good)
    } else if evil_alive >= good_alive {
        Some(Winner::Evil)
    } else {
        None
    }
}

/// `game_over` followed by the full role reveal
pub fn game_over_messages(registry: &SessionRegistry, winner: Winner) -> [ServerMessage; 2] {
    [
        ServerMessage::GameOver { winner },
        ServerMessage::RolesRevealed {
            roles: registry.reveal_all(),
        },
    ]
}
