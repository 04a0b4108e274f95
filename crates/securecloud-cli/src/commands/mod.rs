//! Subcommand implementations.

pub mod alerts;
pub mod auth;
pub mod dashboard;
pub mod firewall;
pub mod network;
pub mod system;
pub mod threats;
pub mod users;
pub mod watch;
