//! The room: one match, its phase machine and inbound message dispatch

use crate::actions::{submit_action, ActionBuffer, ActionRequest};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::outbound::{Outbound, Outbox};
use crate::resolution::Resolver;
use crate::rng::RandomSource;
use crate::roles::{assign_roles, assignment_message};
use crate::session::SessionRegistry;
use crate::vote::VoteTally;
use crate::win::{evaluate, game_over_messages};
use log::{debug, info};
use shared::{ActionKind, ClientMessage, Phase, ServerMessage, Winner};

/// Authoritative state of the single match hosted by this process.
///
/// Every entry point returns the notifications it produced, in order. The
/// room itself never touches the network.
pub struct Room {
    config: GameConfig,
    phase: Phase,
    sessions: SessionRegistry,
    logs: Vec<String>,
    actions: ActionBuffer,
    votes: VoteTally,
    winner: Option<Winner>,
    rng: Box<dyn RandomSource>,
}

impl Room {
    pub fn new(config: GameConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            phase: Phase::Lobby,
            sessions: SessionRegistry::new(),
            logs: Vec::new(),
            actions: ActionBuffer::new(),
            votes: VoteTally::new(),
            winner: None,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Registers a new session. Only possible while the lobby is open.
    pub fn connect(&mut self) -> Result<(u32, Vec<Outbound>), GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::AlreadyStarted);
        }

        let id = self.sessions.register();

        let mut outbox = Outbox::new();
        outbox.direct(id, ServerMessage::Connected { your_id: id });
        Ok((id, outbox.into_vec()))
    }

    /// Drops a session whose channel closed. Buffered actions and ballots
    /// it already submitted stay in place.
    pub fn disconnect(&mut self, id: u32) -> Vec<Outbound> {
        if self.sessions.deregister(id).is_none() {
            return Vec::new();
        }

        let mut outbox = Outbox::new();
        self.broadcast_lobby(&mut outbox);
        outbox.into_vec()
    }

    /// Applies one inbound message from `id`. A rejected request produces a
    /// single private `error` and leaves the room untouched.
    pub fn handle_message(&mut self, id: u32, message: ClientMessage) -> Vec<Outbound> {
        if self.sessions.get(id).is_none() {
            debug!("Ignoring message from unknown session {}", id);
            return Vec::new();
        }

        let mut outbox = Outbox::new();
        let result = match message {
            ClientMessage::Join { name } => {
                self.join(id, name, &mut outbox);
                Ok(())
            }
            ClientMessage::StartRequest => self.start(id, &mut outbox),
            ClientMessage::Chat { text } => {
                self.chat(id, text, &mut outbox);
                Ok(())
            }
            ClientMessage::Action {
                action,
                target,
                extra,
            } => {
                let request = ActionRequest {
                    action: &action,
                    target,
                    extra: extra.as_deref(),
                };
                self.act(id, request, &mut outbox)
            }
            ClientMessage::EndPhase => self.end_phase(id, &mut outbox),
            ClientMessage::Vote { target } => self.vote(id, target, &mut outbox),
        };

        if let Err(e) = result {
            debug!("Rejected request from session {}: {}", id, e);
            let mut rejected = Outbox::new();
            rejected.error(id, e);
            return rejected.into_vec();
        }
        outbox.into_vec()
    }

    fn join(&mut self, id: u32, name: Option<String>, outbox: &mut Outbox) {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Player{}", id));

        if let Some(session) = self.sessions.get_mut(id) {
            info!("Session {} is now known as {}", id, name);
            session.name = name;
        }
        self.broadcast_lobby(outbox);
    }

    fn chat(&mut self, id: u32, text: String, outbox: &mut Outbox) {
        let from = match self.sessions.get(id) {
            Some(session) => session.name.clone(),
            None => return,
        };
        outbox.broadcast(ServerMessage::Chat { from, text });
    }

    fn start(&mut self, id: u32, outbox: &mut Outbox) -> Result<(), GameError> {
        if !self.sessions.is_host(id) {
            return Err(GameError::NotHost);
        }
        match self.phase {
            Phase::Lobby => {}
            Phase::Ended => return Err(GameError::GameOver),
            _ => return Err(GameError::AlreadyStarted),
        }

        assign_roles(
            &mut self.sessions,
            self.config.roles(),
            self.config.capacity(),
            self.rng.as_mut(),
        )?;

        for session in self.sessions.iter() {
            if let Some(state) = &session.role {
                outbox.direct(session.id, assignment_message(state));
            }
        }

        self.phase = Phase::Night;
        info!("Game started with {} players", self.sessions.len());
        self.broadcast_state(outbox);
        Ok(())
    }

    fn act(
        &mut self,
        id: u32,
        request: ActionRequest<'_>,
        outbox: &mut Outbox,
    ) -> Result<(), GameError> {
        let action: ActionKind = submit_action(
            &mut self.sessions,
            &mut self.actions,
            self.phase,
            id,
            request,
        )?;
        outbox.direct(id, ServerMessage::ActionAck { action });
        Ok(())
    }

    fn vote(&mut self, id: u32, target: u32, outbox: &mut Outbox) -> Result<(), GameError> {
        if !self.sessions.is_alive(id) {
            return Err(GameError::Dead);
        }
        if self.phase != Phase::Voting {
            return Err(GameError::NotVotingTime);
        }
        if !self.sessions.is_alive(target) {
            return Err(GameError::InvalidTarget(target));
        }

        if let Some(previous) = self.votes.cast(id, target) {
            debug!("Session {} moved vote from {} to {}", id, previous, target);
        } else {
            debug!("Session {} voted for {}", id, target);
        }
        outbox.direct(id, ServerMessage::VoteAck { target });
        Ok(())
    }

    /// Host-driven advance: resolve the current phase, check for a winner,
    /// then move on unless the match just ended.
    fn end_phase(&mut self, id: u32, outbox: &mut Outbox) -> Result<(), GameError> {
        if !self.sessions.is_host(id) {
            return Err(GameError::NotHost);
        }

        let next = match self.phase {
            Phase::Lobby => return Err(GameError::NotStarted),
            Phase::Ended => return Err(GameError::GameOver),
            Phase::Night => {
                let actions = self.actions.drain();
                let mut resolver = Resolver {
                    registry: &mut self.sessions,
                    logs: &mut self.logs,
                    outbox: &mut *outbox,
                    rng: self.rng.as_mut(),
                };
                resolver.resolve_night(&actions, self.config.seer_reveal());
                Phase::Discussion
            }
            Phase::Discussion => {
                let actions = self.actions.drain();
                let mut resolver = Resolver {
                    registry: &mut self.sessions,
                    logs: &mut self.logs,
                    outbox: &mut *outbox,
                    rng: self.rng.as_mut(),
                };
                resolver.resolve_discussion(&actions);
                self.votes.reset();
                Phase::Voting
            }
            Phase::Voting => {
                self.actions.clear();
                let mut resolver = Resolver {
                    registry: &mut self.sessions,
                    logs: &mut self.logs,
                    outbox: &mut *outbox,
                    rng: self.rng.as_mut(),
                };
                self.votes.resolve(&mut resolver);
                self.sessions.reset_seer_checks();
                Phase::Night
            }
        };

        if !self.check_winner(outbox) {
            info!("Phase {} -> {}", self.phase, next);
            self.phase = next;
        }
        self.broadcast_state(outbox);
        Ok(())
    }

    /// Ends the match if one side has won. Returns true when it did.
    fn check_winner(&mut self, outbox: &mut Outbox) -> bool {
        let Some(winner) = evaluate(&self.sessions) else {
            return false;
        };

        info!("Game over, {:?} wins", winner);
        self.phase = Phase::Ended;
        self.winner = Some(winner);
        self.logs.push(format!("Game over. {:?} wins.", winner));
        for message in game_over_messages(&self.sessions, winner) {
            outbox.broadcast(message);
        }
        true
    }

    fn broadcast_lobby(&self, outbox: &mut Outbox) {
        outbox.broadcast(ServerMessage::LobbyUpdate {
            players: self.sessions.snapshot(),
        });
    }

    fn broadcast_state(&self, outbox: &mut Outbox) {
        outbox.broadcast(ServerMessage::State {
            phase: self.phase,
            players: self.sessions.snapshot(),
            logs: self.logs.clone(),
        });
    }
}
