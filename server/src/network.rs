//! Server network layer: WebSocket transport and the single dispatch loop

use crate::config::ServerConfig;
use crate::game::Room;
use crate::outbound::Outbound;
use crate::rng::{RandomSource, StdRandom};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerMessage};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Events sent from connection tasks to the dispatch loop
#[derive(Debug)]
enum ConnectionEvent {
    /// Handshake finished; the loop answers with the session id, or None
    /// if the room refused the connection
    Opened {
        writer: mpsc::UnboundedSender<Message>,
        reply: oneshot::Sender<Option<u32>>,
    },
    Frame {
        id: u32,
        text: String,
    },
    Closed {
        id: u32,
    },
}

/// Owns the listener and the room. All room mutations happen inside
/// [`Server::run`], one event at a time.
pub struct Server {
    listener: TcpListener,
    room: Room,
    writers: HashMap<u32, mpsc::UnboundedSender<Message>>,

    // Communication channels
    event_tx: mpsc::UnboundedSender<ConnectionEvent>,
    event_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        Self::bind_with_rng(config, Box::new(StdRandom::from_entropy())).await
    }

    /// Like [`Server::bind`] with a caller-supplied source of randomness
    pub async fn bind_with_rng(
        config: ServerConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(&config.address).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            room: Room::new(config.game, rng),
            writers: HashMap::new(),
            event_tx,
            event_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Main server loop: accepts connections and applies their events to
    /// the room in arrival order
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        debug!("Accepted TCP connection from {}", addr);
                        let events = self.event_tx.clone();
                        tokio::spawn(serve_connection(stream, addr, events));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
            }
        }
    }

    fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened { writer, reply } => match self.room.connect() {
                Ok((id, outbound)) => {
                    self.writers.insert(id, writer);
                    if reply.send(Some(id)).is_err() {
                        warn!("Connection task for session {} went away", id);
                    }
                    self.deliver(outbound);
                }
                Err(e) => {
                    info!("Refusing connection: {}", e);
                    let refusal = ServerMessage::Error {
                        message: e.to_string(),
                    };
                    if let Ok(text) = refusal.encode() {
                        let _ = writer.send(Message::Text(text));
                    }
                    let _ = writer.send(Message::Close(None));
                    let _ = reply.send(None);
                }
            },
            ConnectionEvent::Frame { id, text } => match ClientMessage::decode(&text) {
                Ok(message) => {
                    debug!("Session {} sent {:?}", id, message);
                    let outbound = self.room.handle_message(id, message);
                    self.deliver(outbound);
                }
                Err(e) => {
                    warn!("Dropping undecodable frame from session {}: {}", id, e);
                }
            },
            ConnectionEvent::Closed { id } => {
                self.writers.remove(&id);
                let outbound = self.room.disconnect(id);
                self.deliver(outbound);
            }
        }
    }

    /// Sends notifications in order. A failed send is logged and skipped.
    fn deliver(&self, outbound: Vec<Outbound>) {
        for item in outbound {
            let text = match item.message().encode() {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode {:?}: {}", item.message(), e);
                    continue;
                }
            };

            match &item {
                Outbound::Broadcast(_) => {
                    for (id, writer) in &self.writers {
                        if writer.send(Message::Text(text.clone())).is_err() {
                            warn!("Failed to send to session {}", id);
                        }
                    }
                }
                Outbound::Direct { to, .. } => match self.writers.get(to) {
                    Some(writer) => {
                        if writer.send(Message::Text(text)).is_err() {
                            warn!("Failed to send to session {}", to);
                        }
                    }
                    None => debug!("No connection for session {}", to),
                },
            }
        }
    }
}

/// Per-connection task: performs the handshake, then forwards inbound text
/// frames to the dispatch loop until the socket closes
async fn serve_connection(
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    let (mut sink, mut source) = ws_stream.split();

    let (writer, mut outgoing) = mpsc::unbounded_channel::<Message>();
    tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = sink.send(message).await {
                debug!("Write to {} failed: {}", addr, e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    let (reply, assigned) = oneshot::channel();
    if events
        .send(ConnectionEvent::Opened { writer, reply })
        .is_err()
    {
        return;
    }
    let id = match assigned.await {
        Ok(Some(id)) => id,
        _ => return,
    };
    info!("Session {} connected from {}", id, addr);

    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if events.send(ConnectionEvent::Frame { id, text }).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read from session {} failed: {}", id, e);
                break;
            }
        }
    }

    info!("Session {} closed", id);
    let _ = events.send(ConnectionEvent::Closed { id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn local_config() -> ServerConfig {
        ServerConfig {
            address: "127.0.0.1:0".to_string(),
            game: GameConfig::default(),
        }
    }

    fn decode(message: Option<Message>) -> ServerMessage {
        match message {
            Some(Message::Text(text)) => ServerMessage::decode(&text).unwrap(),
            other => panic!("Expected a text frame, got {:?}", other),
        }
    }

    #[test]
    fn test_bind_reports_ephemeral_port() {
        let server = tokio_test::block_on(Server::bind(local_config())).unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_events_drive_room_and_fan_out() {
        let mut server = Server::bind(local_config()).await.unwrap();

        let (writer, mut inbox) = mpsc::unbounded_channel();
        let (reply, assigned) = oneshot::channel();
        server.handle_event(ConnectionEvent::Opened { writer, reply });
        assert_eq!(assigned.await.unwrap(), Some(1));
        assert_eq!(
            decode(inbox.recv().await),
            ServerMessage::Connected { your_id: 1 }
        );

        server.handle_event(ConnectionEvent::Frame {
            id: 1,
            text: "garbage".to_string(),
        });
        assert!(inbox.try_recv().is_err());

        server.handle_event(ConnectionEvent::Frame {
            id: 1,
            text: r#"{"type":"chat","text":"hi"}"#.to_string(),
        });
        assert_eq!(
            decode(inbox.recv().await),
            ServerMessage::Chat {
                from: "Player1".to_string(),
                text: "hi".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_closed_writer_does_not_block_others() {
        let mut server = Server::bind(local_config()).await.unwrap();

        let (gone, dropped) = mpsc::unbounded_channel();
        let (reply, _) = oneshot::channel();
        server.handle_event(ConnectionEvent::Opened { writer: gone, reply });
        drop(dropped);

        let (writer, mut inbox) = mpsc::unbounded_channel();
        let (reply, _) = oneshot::channel();
        server.handle_event(ConnectionEvent::Opened { writer, reply });
        decode(inbox.recv().await);

        server.handle_event(ConnectionEvent::Frame {
            id: 1,
            text: r#"{"type":"chat","text":"anyone?"}"#.to_string(),
        });
        assert!(matches!(
            decode(inbox.recv().await),
            ServerMessage::Chat { .. }
        ));

        server.handle_event(ConnectionEvent::Closed { id: 1 });
        assert!(matches!(
            decode(inbox.recv().await),
            ServerMessage::LobbyUpdate { players } if players.len() == 1
        ));
    }
}
