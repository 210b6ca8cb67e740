//! System-level modules
//!
//! - Logging initialization
//! - Execution mode routing (server, cli)

pub mod logging;
