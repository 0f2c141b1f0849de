//! # Nightfall Server Library
//!
//! Authoritative server for a ten-player social deduction match. Players
//! connect over WebSocket, receive a secret role, and the host drives the
//! match through night, discussion and voting until one side wins.
//!
//! ## Architecture Design
//!
//! ### Single Dispatch Loop
//! [`network::Server`] owns the [`game::Room`] by value. Connection tasks
//! only read frames and forward them over a channel; the loop applies them
//! to the room one at a time, so no two handlers ever interleave
//! mutations.
//!
//! ### Transport-Free Room
//! The room returns [`outbound::Outbound`] notifications instead of
//! writing to sockets. That keeps the whole rule set testable without a
//! network and lets the loop fan messages out, logging (never failing on)
//! a send to a closed connection.
//!
//! ### Injectable Randomness
//! Role dealing and tie-breaks draw from [`rng::RandomSource`], so tests
//! can script exact outcomes.
//!
//! ## Module Organization
//!
//! - `session`: sequential ids, host tracking, per-role counters
//! - `roles`: dealing the configured role pool at game start
//! - `actions`: validation table and buffering for night/discussion actions
//! - `resolution`: night (kill, heal, seer) and discussion (guess) outcomes
//! - `vote`: open ballot tally with random tie-break
//! - `win`: win condition evaluator
//! - `game`: the room and its phase machine
//! - `network`: WebSocket listener and dispatch loop
//! - `config`, `error`, `outbound`, `rng`: supporting types
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Default: all interfaces, port 6789, ten players
//!     let mut server = Server::bind(ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod outbound;
pub mod resolution;
pub mod rng;
pub mod roles;
pub mod session;
pub mod vote;
pub mod win;
