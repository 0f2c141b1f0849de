//! Notifications produced by the room, in the order they must be delivered

use shared::ServerMessage;

/// A message the room wants delivered
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Fan out to every registered session
    Broadcast(ServerMessage),
    /// Deliver to one session only
    Direct { to: u32, message: ServerMessage },
}

impl Outbound {
    pub fn message(&self) -> &ServerMessage {
        match self {
            Outbound::Broadcast(message) => message,
            Outbound::Direct { message, .. } => message,
        }
    }

    /// True if `session` receives this notification
    pub fn reaches(&self, session: u32) -> bool {
        match self {
            Outbound::Broadcast(_) => true,
            Outbound::Direct { to, .. } => *to == session,
        }
    }
}

/// Ordered collector the room writes into while handling one event
#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<Outbound>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcast(&mut self, message: ServerMessage) {
        self.queued.push(Outbound::Broadcast(message));
    }

    pub fn direct(&mut self, to: u32, message: ServerMessage) {
        self.queued.push(Outbound::Direct { to, message });
    }

    pub fn error(&mut self, to: u32, message: impl ToString) {
        self.direct(
            to,
            ServerMessage::Error {
                message: message.to_string(),
            },
        );
    }

    pub fn into_vec(self) -> Vec<Outbound> {
        self.queued
    }
}
