//! Room and server configuration with startup validation

use shared::{Role, DEFAULT_PORT, ROOM_CAPACITY};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("room capacity must be at least 1")]
    ZeroCapacity,
    #[error("role counts sum to {configured} but the room holds {capacity} players")]
    RoleCountMismatch { configured: usize, capacity: usize },
}

/// How many copies of each role go into the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleConfig {
    pub blackjack: usize,
    pub killer: usize,
    pub whitejack: usize,
    pub seer: usize,
    pub doctor: usize,
    pub villager: usize,
}

impl RoleConfig {
    /// The historical table: three villagers, nine roles in total. It does
    /// not fill a room of ten and fails `validate` for the default capacity.
    pub fn reference() -> Self {
        Self {
            villager: 3,
            ..Self::default()
        }
    }

    pub fn counts(&self) -> [(Role, usize); 6] {
        [
            (Role::Blackjack, self.blackjack),
            (Role::Killer, self.killer),
            (Role::Whitejack, self.whitejack),
            (Role::Seer, self.seer),
            (Role::Doctor, self.doctor),
            (Role::Villager, self.villager),
        ]
    }

    pub fn total(&self) -> usize {
        self.counts().iter().map(|(_, count)| count).sum()
    }

    /// Expands every role by its count, in declaration order
    pub fn pool(&self) -> Vec<Role> {
        self.counts()
            .into_iter()
            .flat_map(|(role, count)| std::iter::repeat(role).take(count))
            .collect()
    }

    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let configured = self.total();
        if configured != capacity {
            return Err(ConfigError::RoleCountMismatch {
                configured,
                capacity,
            });
        }
        Ok(())
    }
}

impl Default for RoleConfig {
    /// Ten roles for the default room of ten.
    fn default() -> Self {
        Self {
            blackjack: 1,
            killer: 2,
            whitejack: 1,
            seer: 1,
            doctor: 1,
            villager: 4,
        }
    }
}

/// Who sees a seer check result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeerReveal {
    #[default]
    Public,
    Private,
}

/// Validated rules for one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    capacity: usize,
    roles: RoleConfig,
    seer_reveal: SeerReveal,
}

impl GameConfig {
    pub fn new(
        capacity: usize,
        roles: RoleConfig,
        seer_reveal: SeerReveal,
    ) -> Result<Self, ConfigError> {
        roles.validate(capacity)?;
        Ok(Self {
            capacity,
            roles,
            seer_reveal,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn roles(&self) -> &RoleConfig {
        &self.roles
    }

    pub fn seer_reveal(&self) -> SeerReveal {
        self.seer_reveal
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            capacity: ROOM_CAPACITY,
            roles: RoleConfig::default(),
            seer_reveal: SeerReveal::Public,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: format!("0.0.0.0:{}", DEFAULT_PORT),
            game: GameConfig::default(),
        }
    }
}
