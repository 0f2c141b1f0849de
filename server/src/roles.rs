//! Role assignment at game start

use crate::config::RoleConfig;
use crate::error::GameError;
use crate::rng::{shuffle, RandomSource};
use crate::session::{RoleState, SessionRegistry};
use shared::{Role, ServerMessage};

/// Deals one role to every registered session.
///
/// The pool is built from `roles`, shuffled, and paired with an
/// independently shuffled session order. Returns the (session id, role)
/// pairs in dealing order. Fails without touching any session when the
/// room does not hold exactly `capacity` sessions or the pool does not
/// match the room.
pub fn assign_roles(
    registry: &mut SessionRegistry,
    roles: &RoleConfig,
    capacity: usize,
    rng: &mut dyn RandomSource,
) -> Result<Vec<(u32, Role)>, GameError> {
    let connected = registry.len();
    if connected != capacity {
        return Err(GameError::CapacityShortfall {
            required: capacity,
            connected,
        });
    }

    let mut pool = roles.pool();
    if pool.len() != connected {
        return Err(GameError::CapacityShortfall {
            required: pool.len(),
            connected,
        });
    }
    shuffle(rng, &mut pool);

    let mut order = registry.ids();
    shuffle(rng, &mut order);

    let dealt: Vec<(u32, Role)> = order.into_iter().zip(pool).collect();
    for (id, role) in &dealt {
        registry.assign_role(*id, *role);
    }

    Ok(dealt)
}

/// The private `assign_role` message for a dealt role, carrying only the
/// counters that role uses
pub fn assignment_message(state: &RoleState) -> ServerMessage {
    let (heals_left, self_heal_used, seer_checks_left) = match *state {
        RoleState::Doctor {
            heals_left,
            self_heal_used,
        } => (Some(heals_left), Some(self_heal_used), None),
        RoleState::Seer { checks_left } => (None, None, Some(checks_left)),
        _ => (None, None, None),
    };

    ServerMessage::AssignRole {
        role: state.role(),
        heals_left,
        self_heal_used,
        seer_checks_left,
    }
}
