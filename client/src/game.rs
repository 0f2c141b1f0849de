use shared::{Phase, PlayerSummary, Role, ServerMessage, Winner};

/// The client's picture of the match, rebuilt from server messages
#[derive(Debug, Clone, Default)]
pub struct ClientGameState {
    pub my_id: Option<u32>,
    pub role: Option<Role>,
    pub heals_left: Option<u32>,
    pub self_heal_used: Option<bool>,
    pub seer_checks_left: Option<u32>,
    pub phase: Option<Phase>,
    pub players: Vec<PlayerSummary>,
    pub winner: Option<Winner>,
    logs_seen: usize,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one message into the view. Returns event-log lines that were
    /// not in any earlier `state` message.
    pub fn apply(&mut self, message: &ServerMessage) -> Vec<String> {
        match message {
            ServerMessage::Connected { your_id } => {
                self.my_id = Some(*your_id);
            }
            ServerMessage::LobbyUpdate { players } => {
                self.players = players.clone();
            }
            ServerMessage::AssignRole {
                role,
                heals_left,
                self_heal_used,
                seer_checks_left,
            } => {
                self.role = Some(*role);
                self.heals_left = *heals_left;
                self.self_heal_used = *self_heal_used;
                self.seer_checks_left = *seer_checks_left;
            }
            ServerMessage::RoleUpdate {
                heals_left,
                self_heal_used,
            } => {
                self.heals_left = Some(*heals_left);
                self.self_heal_used = Some(*self_heal_used);
            }
            ServerMessage::State {
                phase,
                players,
                logs,
            } => {
                // The seer quota is refilled server-side on every new night
                if *phase == Phase::Night && self.phase != Some(Phase::Night) {
                    if let Some(Role::Seer) = self.role {
                        self.seer_checks_left = Some(shared::SEER_CHECKS_PER_NIGHT);
                    }
                }
                self.phase = Some(*phase);
                self.players = players.clone();

                let fresh = logs.iter().skip(self.logs_seen).cloned().collect();
                self.logs_seen = logs.len();
                return fresh;
            }
            ServerMessage::Eliminate { id, .. } => {
                if let Some(player) = self.players.iter_mut().find(|p| p.id == *id) {
                    player.alive = false;
                }
            }
            ServerMessage::ActionAck {
                action: shared::ActionKind::Seer,
            } => {
                if let Some(left) = self.seer_checks_left.as_mut() {
                    *left = left.saturating_sub(1);
                }
            }
            ServerMessage::GameOver { winner } => {
                self.winner = Some(*winner);
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn name_of(&self, id: u32) -> String {
        self.players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }

    pub fn is_me(&self, id: u32) -> bool {
        self.my_id == Some(id)
    }

    pub fn am_alive(&self) -> bool {
        match self.my_id {
            Some(id) => self.players.iter().any(|p| p.id == id && p.alive),
            None => false,
        }
    }
}
