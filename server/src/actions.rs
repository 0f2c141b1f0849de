//! Secret action intake: validation against phase and role, then buffering
//! until the host ends the phase

use crate::error::GameError;
use crate::session::{RoleState, SessionRegistry};
use log::debug;
use shared::{ActionKind, Alignment, Phase, Role};

/// A validated action waiting for phase-end resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub actor: u32,
    pub kind: ActionKind,
    pub target: Option<u32>,
    pub guess: Option<Alignment>,
}

/// Where and by whom an action kind may be used
#[derive(Debug)]
pub struct ActionRule {
    pub kind: ActionKind,
    pub phase: Phase,
    /// Empty means any role
    pub roles: &'static [Role],
    pub needs_target: bool,
}

pub static ACTION_RULES: [ActionRule; 4] = [
    ActionRule {
        kind: ActionKind::Seer,
        phase: Phase::Night,
        roles: &[Role::Seer],
        needs_target: true,
    },
    ActionRule {
        kind: ActionKind::Heal,
        phase: Phase::Night,
        roles: &[Role::Doctor],
        needs_target: false,
    },
    ActionRule {
        kind: ActionKind::Kill,
        phase: Phase::Night,
        roles: &[Role::Killer, Role::Blackjack],
        needs_target: true,
    },
    ActionRule {
        kind: ActionKind::Guess,
        phase: Phase::Discussion,
        roles: &[],
        needs_target: true,
    },
];

pub fn rule_for(kind: ActionKind) -> &'static ActionRule {
    match kind {
        ActionKind::Seer => &ACTION_RULES[0],
        ActionKind::Heal => &ACTION_RULES[1],
        ActionKind::Kill => &ACTION_RULES[2],
        ActionKind::Guess => &ACTION_RULES[3],
    }
}

impl ActionRule {
    fn permits_role(&self, role: Option<Role>) -> bool {
        self.roles.is_empty() || role.map_or(false, |r| self.roles.contains(&r))
    }
}

/// Per-phase queue of accepted actions
#[derive(Debug, Default)]
pub struct ActionBuffer {
    actions: Vec<Action>,
}

impl ActionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Empties the buffer, handing back everything queued this phase
    pub fn drain(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Raw action as it arrives from the wire
#[derive(Debug, Clone, Copy)]
pub struct ActionRequest<'a> {
    pub action: &'a str,
    pub target: Option<u32>,
    pub extra: Option<&'a str>,
}

/// Validates an action and buffers it.
///
/// Checks run in a fixed order: actor alive, phase accepts actions at all,
/// known kind, kind's phase, actor's role, role quota, target, guess
/// payload. Nothing is mutated unless every check passes; a seer check is
/// spent as soon as it is accepted.
pub fn submit_action(
    registry: &mut SessionRegistry,
    buffer: &mut ActionBuffer,
    phase: Phase,
    actor: u32,
    request: ActionRequest<'_>,
) -> Result<ActionKind, GameError> {
    let session = registry.get(actor).ok_or(GameError::Dead)?;
    if !session.alive {
        return Err(GameError::Dead);
    }

    if !matches!(phase, Phase::Night | Phase::Discussion | Phase::Voting) {
        return Err(GameError::NotActionTime);
    }

    let kind: ActionKind = request
        .action
        .parse()
        .map_err(|_| GameError::UnknownAction(request.action.to_string()))?;
    let rule = rule_for(kind);

    if rule.phase != phase {
        return Err(GameError::WrongPhase {
            action: kind,
            phase,
        });
    }

    if !rule.permits_role(session.role()) {
        return Err(GameError::NotAllowed { action: kind });
    }

    match (kind, session.role) {
        (ActionKind::Seer, Some(RoleState::Seer { checks_left })) if checks_left == 0 => {
            return Err(GameError::SeerQuotaExhausted);
        }
        (ActionKind::Heal, Some(RoleState::Doctor { heals_left, .. })) if heals_left == 0 => {
            return Err(GameError::NoHealsLeft);
        }
        _ => {}
    }

    let target = if rule.needs_target {
        let target = request
            .target
            .ok_or(GameError::MissingTarget { action: kind })?;
        if !registry.is_alive(target) {
            return Err(GameError::InvalidTarget(target));
        }
        Some(target)
    } else {
        None
    };

    let guess = if kind == ActionKind::Guess {
        let raw = request.extra.ok_or(GameError::InvalidGuess)?;
        Some(Alignment::parse_guess(raw).ok_or(GameError::InvalidGuess)?)
    } else {
        None
    };

    if kind == ActionKind::Seer {
        if let Some(RoleState::Seer { checks_left }) =
            registry.get_mut(actor).and_then(|s| s.role.as_mut())
        {
            *checks_left -= 1;
        }
    }

    debug!("Buffered {} from session {} (target {:?})", kind, actor, target);
    buffer.push(Action {
        actor,
        kind,
        target,
        guess,
    });

    Ok(kind)
}
