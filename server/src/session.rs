//! Session registry: connected participants, their roles and the current host
//!
//! This module tracks everyone connected to the room:
//! - Sequential id assignment on connect, removal on disconnect
//! - Host election and promotion when the host leaves
//! - Role-specific counters attached to each session once roles are dealt
//! - Ordered player snapshots for broadcasting

use log::info;
use shared::{PlayerSummary, Role, RoleReveal, DOCTOR_HEALS, SEER_CHECKS_PER_NIGHT};
use std::collections::BTreeMap;

/// A dealt role together with the counters only that role needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    Blackjack,
    Killer,
    Whitejack,
    Seer { checks_left: u32 },
    Doctor { heals_left: u32, self_heal_used: bool },
    Villager,
}

impl RoleState {
    /// Fresh state for a role as dealt at game start
    pub fn initial(role: Role) -> Self {
        match role {
            Role::Blackjack => RoleState::Blackjack,
            Role::Killer => RoleState::Killer,
            Role::Whitejack => RoleState::Whitejack,
            Role::Seer => RoleState::Seer {
                checks_left: SEER_CHECKS_PER_NIGHT,
            },
            Role::Doctor => RoleState::Doctor {
                heals_left: DOCTOR_HEALS,
                self_heal_used: false,
            },
            Role::Villager => RoleState::Villager,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleState::Blackjack => Role::Blackjack,
            RoleState::Killer => Role::Killer,
            RoleState::Whitejack => Role::Whitejack,
            RoleState::Seer { .. } => Role::Seer,
            RoleState::Doctor { .. } => Role::Doctor,
            RoleState::Villager => Role::Villager,
        }
    }
}

/// A connected participant
#[derive(Debug, Clone)]
pub struct Session {
    pub id: u32,
    pub name: String,
    pub alive: bool,
    /// Unset until the game starts
    pub role: Option<RoleState>,
}

impl Session {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: format!("Player{}", id),
            alive: true,
            role: None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role.as_ref().map(RoleState::role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn is_evil(&self) -> bool {
        self.role().map_or(false, Role::is_evil)
    }

    /// Remaining doctor heals, or `None` for non-doctors
    pub fn heals_left(&self) -> Option<u32> {
        match self.role {
            Some(RoleState::Doctor { heals_left, .. }) => Some(heals_left),
            _ => None,
        }
    }

    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id,
            name: self.name.clone(),
            alive: self.alive,
        }
    }

    pub fn reveal(&self) -> RoleReveal {
        RoleReveal {
            id: self.id,
            name: self.name.clone(),
            role: self.role(),
        }
    }
}

/// Owns every session and the host pointer.
///
/// Sessions are kept ordered by id so snapshots and host promotion are
/// deterministic.
pub struct SessionRegistry {
    sessions: BTreeMap<u32, Session>,
    next_id: u32,
    host: Option<u32>,
}

impl SessionRegistry {
    /// Ids start from 1 and are never reused.
    pub fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_id: 1,
            host: None,
        }
    }

    /// Registers a new session and returns its id. The first session to
    /// arrive while there is no host becomes host.
    pub fn register(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        self.sessions.insert(id, Session::new(id));
        if self.host.is_none() {
            self.host = Some(id);
            info!("Session {} connected and is now host", id);
        } else {
            info!("Session {} connected", id);
        }

        id
    }

    /// Removes a session. If it was host, the lowest remaining id is
    /// promoted, or the host is cleared when nobody is left.
    pub fn deregister(&mut self, id: u32) -> Option<Session> {
        let removed = self.sessions.remove(&id)?;
        info!("Session {} disconnected", id);

        if self.host == Some(id) {
            self.host = self.sessions.keys().next().copied();
            match self.host {
                Some(new_host) => info!("Session {} promoted to host", new_host),
                None => info!("Room is empty, no host"),
            }
        }

        Some(removed)
    }

    /// Ordered `{id, name, alive}` list for broadcasting
    pub fn snapshot(&self) -> Vec<PlayerSummary> {
        self.sessions.values().map(Session::summary).collect()
    }

    pub fn reveal_all(&self) -> Vec<RoleReveal> {
        self.sessions.values().map(Session::reveal).collect()
    }

    pub fn host(&self) -> Option<u32> {
        self.host
    }

    pub fn is_host(&self, id: u32) -> bool {
        self.host == Some(id)
    }

    pub fn get(&self, id: u32) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// True if `id` names a registered session that is still alive
    pub fn is_alive(&self, id: u32) -> bool {
        self.sessions.get(&id).map_or(false, |s| s.alive)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.sessions.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    /// Deals a role with its initial counters
    pub fn assign_role(&mut self, id: u32, role: Role) -> bool {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.role = Some(RoleState::initial(role));
            true
        } else {
            false
        }
    }

    /// Refills the nightly check quota of every alive seer
    pub fn reset_seer_checks(&mut self) {
        for session in self.sessions.values_mut().filter(|s| s.alive) {
            if let Some(RoleState::Seer { checks_left }) = session.role.as_mut() {
                *checks_left = SEER_CHECKS_PER_NIGHT;
            }
        }
    }

    /// Returns the number of currently connected sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no sessions are currently connected
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
