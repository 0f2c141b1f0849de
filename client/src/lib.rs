//! # Nightfall Client Library
//!
//! Terminal client for the Nightfall server. It reads typed commands from
//! stdin, sends them as JSON over a WebSocket, and prints every server
//! message as a line of text.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Turns a line such as `/kill 4` or `/guess 7 evil` into a
//! `ClientMessage`. Anything without a leading slash is chat.
//!
//! ### Game Module (`game`)
//! A local view of the match rebuilt from server messages: own id, own
//! role and counters, current phase, the player roster and which event
//! log lines have already been shown.
//!
//! ### Display Module (`display`)
//! Renders each `ServerMessage` as human-readable lines.
//!
//! ### Network Module (`network`)
//! Owns the WebSocket and multiplexes stdin and server frames.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("ws://127.0.0.1:6789").await?;
//!     client.run(Some("Ann".to_string())).await?;
//!     Ok(())
//! }
//! ```

pub mod display;
pub mod game;
pub mod input;
pub mod network;
