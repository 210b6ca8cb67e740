//! cityrank - City donation leaderboard service
//!
//! Keeps per-city donation aggregates, a dense 1..N ranking over them and an
//! append-only activity trail, and serves leaderboard and statistics queries.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `storage`: aggregate store and activity log (in-memory and SeaORM backends)
//! - `ranking`: ranking index and the engine orchestrating writes and reads
//! - `api`: HTTP services and middleware
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod ranking;
pub mod runtime;
pub mod storage;
pub mod system;
