//! Integration tests for the networked game server
//!
//! These tests run a real server on an ephemeral port and drive it with
//! WebSocket clients, the same way the terminal client does.

use client::input::{parse_line, Command};
use futures_util::{SinkExt, StreamExt};
use server::config::{GameConfig, RoleConfig, SeerReveal, ServerConfig};
use server::network::Server;
use shared::{ClientMessage, Phase, Role, ServerMessage, Winner};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

/// Two-seat room: one killer, one villager
fn duel_config() -> ServerConfig {
    let roles = RoleConfig {
        blackjack: 0,
        killer: 1,
        whitejack: 0,
        seer: 0,
        doctor: 0,
        villager: 1,
    };
    ServerConfig {
        address: "127.0.0.1:0".to_string(),
        game: GameConfig::new(2, roles, SeerReveal::Public).unwrap(),
    }
}

async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let mut server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn connect(addr: SocketAddr) -> Socket {
    let (socket, _) = timeout(WAIT, connect_async(format!("ws://{}", addr)))
        .await
        .expect("connect timed out")
        .unwrap();
    socket
}

async fn send(socket: &mut Socket, message: &ClientMessage) {
    socket
        .send(Message::Text(message.encode().unwrap()))
        .await
        .unwrap();
}

/// Sends a line exactly as the terminal client would
async fn send_line(socket: &mut Socket, line: &str) {
    match parse_line(line) {
        Ok(Some(Command::Send(message))) => send(socket, &message).await,
        other => panic!("{:?} is not a request: {:?}", line, other),
    }
}

/// Reads server messages until one matches `pred`
async fn recv_until<F>(socket: &mut Socket, mut pred: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    timeout(WAIT, async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    let message = ServerMessage::decode(&text).unwrap();
                    if pred(&message) {
                        return message;
                    }
                }
                Some(Ok(_)) => {}
                other => panic!("Connection ended early: {:?}", other),
            }
        }
    })
    .await
    .expect("Timed out waiting for server message")
}

async fn recv_id(socket: &mut Socket) -> u32 {
    match recv_until(socket, |m| matches!(m, ServerMessage::Connected { .. })).await {
        ServerMessage::Connected { your_id } => your_id,
        _ => unreachable!(),
    }
}

async fn recv_role(socket: &mut Socket) -> Role {
    match recv_until(socket, |m| matches!(m, ServerMessage::AssignRole { .. })).await {
        ServerMessage::AssignRole { role, .. } => role,
        _ => unreachable!(),
    }
}

async fn recv_error(socket: &mut Socket) -> String {
    match recv_until(socket, |m| matches!(m, ServerMessage::Error { .. })).await {
        ServerMessage::Error { message } => message,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn killer_wins_duel_over_websocket() {
    let addr = spawn_server(duel_config()).await;

    let mut host = connect(addr).await;
    let host_id = recv_id(&mut host).await;
    let mut guest = connect(addr).await;
    let guest_id = recv_id(&mut guest).await;
    assert_eq!((host_id, guest_id), (1, 2));

    send_line(&mut host, "/start").await;
    let host_role = recv_role(&mut host).await;
    let guest_role = recv_role(&mut guest).await;

    let mut dealt = vec![host_role, guest_role];
    dealt.sort();
    assert_eq!(dealt, vec![Role::Killer, Role::Villager]);

    let state = recv_until(&mut host, |m| matches!(m, ServerMessage::State { .. })).await;
    assert!(matches!(
        state,
        ServerMessage::State {
            phase: Phase::Night,
            ..
        }
    ));

    let (killer, victim_id) = if host_role == Role::Killer {
        (&mut host, guest_id)
    } else {
        (&mut guest, host_id)
    };
    send_line(killer, &format!("/kill {}", victim_id)).await;
    recv_until(killer, |m| matches!(m, ServerMessage::ActionAck { .. })).await;

    send_line(&mut host, "/end").await;

    let eliminated =
        recv_until(&mut host, |m| matches!(m, ServerMessage::Eliminate { .. })).await;
    assert!(matches!(
        eliminated,
        ServerMessage::Eliminate { id, role: Some(Role::Villager), .. } if id == victim_id
    ));

    let over = recv_until(&mut host, |m| matches!(m, ServerMessage::GameOver { .. })).await;
    assert_eq!(
        over,
        ServerMessage::GameOver {
            winner: Winner::Evil
        }
    );

    let revealed =
        recv_until(&mut host, |m| matches!(m, ServerMessage::RolesRevealed { .. })).await;
    assert!(matches!(revealed, ServerMessage::RolesRevealed { roles } if roles.len() == 2));

    let state = recv_until(&mut host, |m| matches!(m, ServerMessage::State { .. })).await;
    match state {
        ServerMessage::State { phase, logs, .. } => {
            assert_eq!(phase, Phase::Ended);
            assert!(logs[0].ends_with("was killed at night."));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn only_host_may_start_and_room_must_be_full() {
    let addr = spawn_server(duel_config()).await;

    let mut host = connect(addr).await;
    recv_id(&mut host).await;

    send_line(&mut host, "/start").await;
    assert_eq!(recv_error(&mut host).await, "Need 2 players, have 1");

    let mut guest = connect(addr).await;
    recv_id(&mut guest).await;
    send_line(&mut guest, "/start").await;
    assert_eq!(recv_error(&mut guest).await, "Only the host can do that");
}

#[tokio::test]
async fn host_leaving_lobby_promotes_next_session() {
    let addr = spawn_server(duel_config()).await;

    let mut first = connect(addr).await;
    recv_id(&mut first).await;
    let mut second = connect(addr).await;
    recv_id(&mut second).await;
    let mut third = connect(addr).await;
    recv_id(&mut third).await;

    first.close(None).await.unwrap();
    let update = recv_until(&mut second, |m| {
        matches!(m, ServerMessage::LobbyUpdate { players } if players.len() == 2)
    })
    .await;
    assert!(matches!(update, ServerMessage::LobbyUpdate { .. }));

    send_line(&mut second, "/start").await;
    recv_role(&mut second).await;
    recv_role(&mut third).await;
}

#[tokio::test]
async fn late_joiner_is_refused_after_start() {
    let addr = spawn_server(duel_config()).await;

    let mut host = connect(addr).await;
    recv_id(&mut host).await;
    let mut guest = connect(addr).await;
    recv_id(&mut guest).await;
    send_line(&mut host, "/start").await;
    recv_role(&mut host).await;

    let mut late = connect(addr).await;
    assert_eq!(recv_error(&mut late).await, "Game already started");
}

#[tokio::test]
async fn undecodable_frames_are_dropped_without_closing() {
    let addr = spawn_server(duel_config()).await;

    let mut socket = connect(addr).await;
    recv_id(&mut socket).await;

    socket
        .send(Message::Text("{\"type\":\"teleport\"}".to_string()))
        .await
        .unwrap();
    socket
        .send(Message::Text("not json at all".to_string()))
        .await
        .unwrap();
    send_line(&mut socket, "still here").await;

    let chat = recv_until(&mut socket, |m| matches!(m, ServerMessage::Chat { .. })).await;
    assert_eq!(
        chat,
        ServerMessage::Chat {
            from: "Player1".to_string(),
            text: "still here".to_string()
        }
    );
}
