use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 6789;
pub const ROOM_CAPACITY: usize = 10;
pub const SEER_CHECKS_PER_NIGHT: u32 = 3;
pub const DOCTOR_HEALS: u32 = 2;

/// Roles a guess of "good" is correct for. Doctors are in neither set.
pub const GOOD_GUESS_ROLES: [Role; 3] = [Role::Whitejack, Role::Seer, Role::Villager];
/// Roles a guess of "evil" is correct for
pub const EVIL_GUESS_ROLES: [Role; 2] = [Role::Blackjack, Role::Killer];

/// Every role a session can be dealt.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Blackjack,
    Killer,
    Whitejack,
    Seer,
    Doctor,
    Villager,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Blackjack,
        Role::Killer,
        Role::Whitejack,
        Role::Seer,
        Role::Doctor,
        Role::Villager,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Blackjack => "blackjack",
            Role::Killer => "killer",
            Role::Whitejack => "whitejack",
            Role::Seer => "seer",
            Role::Doctor => "doctor",
            Role::Villager => "villager",
        }
    }

    pub fn alignment(self) -> Alignment {
        match self {
            Role::Blackjack | Role::Killer => Alignment::Evil,
            _ => Alignment::Good,
        }
    }

    pub fn is_evil(self) -> bool {
        self.alignment() == Alignment::Evil
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Good,
    Evil,
}

impl Alignment {
    /// Parses a guess payload. Accepts an alignment or a role name from
    /// one of the guess sets, which stands for that set's side. "doctor"
    /// names no side and is refused.
    pub fn parse_guess(raw: &str) -> Option<Alignment> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "good" => Some(Alignment::Good),
            "evil" => Some(Alignment::Evil),
            other => {
                let role = other.parse::<Role>().ok()?;
                if GOOD_GUESS_ROLES.contains(&role) {
                    Some(Alignment::Good)
                } else if EVIL_GUESS_ROLES.contains(&role) {
                    Some(Alignment::Evil)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Night,
    Discussion,
    Voting,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lobby => "lobby",
            Phase::Night => "night",
            Phase::Discussion => "discussion",
            Phase::Voting => "voting",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Seer,
    Heal,
    Kill,
    Guess,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Seer => "seer",
            ActionKind::Heal => "heal",
            ActionKind::Kill => "kill",
            ActionKind::Guess => "guess",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seer" => Ok(ActionKind::Seer),
            "heal" => Ok(ActionKind::Heal),
            "kill" => Ok(ActionKind::Kill),
            "guess" => Ok(ActionKind::Guess),
            _ => Err(()),
        }
    }
}

/// Public mark shown for a seer check.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SeerMark {
    #[serde(rename = "😈")]
    Evil,
    #[serde(rename = "😇")]
    Good,
}

impl From<Alignment> for SeerMark {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::Evil => SeerMark::Evil,
            Alignment::Good => SeerMark::Good,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EliminationCause {
    Night,
    Vote,
    BlackjackGuess,
    BlackjackFail,
    WhitejackGuess,
    WhitejackFail,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Good,
    Evil,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub id: u32,
    pub name: String,
    pub alive: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RoleReveal {
    pub id: u32,
    pub name: String,
    pub role: Option<Role>,
}

/// Messages sent by a participant.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        #[serde(default)]
        name: Option<String>,
    },
    StartRequest,
    Chat {
        #[serde(default)]
        text: String,
    },
    /// The action kind stays a raw string so unknown kinds can be
    /// reported back instead of dropped as undecodable.
    Action {
        action: String,
        #[serde(default)]
        target: Option<u32>,
        #[serde(default)]
        extra: Option<String>,
    },
    EndPhase,
    Vote {
        target: u32,
    },
}

/// Messages sent by the server, either broadcast or to a single session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        your_id: u32,
    },
    LobbyUpdate {
        players: Vec<PlayerSummary>,
    },
    AssignRole {
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heals_left: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        self_heal_used: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seer_checks_left: Option<u32>,
    },
    State {
        phase: Phase,
        players: Vec<PlayerSummary>,
        logs: Vec<String>,
    },
    Chat {
        from: String,
        text: String,
    },
    ActionAck {
        action: ActionKind,
    },
    VoteAck {
        target: u32,
    },
    Error {
        message: String,
    },
    RoleUpdate {
        heals_left: u32,
        self_heal_used: bool,
    },
    Eliminate {
        id: u32,
        name: String,
        by: EliminationCause,
        role: Option<Role>,
    },
    SeerResult {
        target_id: u32,
        mark: SeerMark,
    },
    GameOver {
        winner: Winner,
    },
    RolesRevealed {
        roles: Vec<RoleReveal>,
    },
}

impl ClientMessage {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerMessage {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
