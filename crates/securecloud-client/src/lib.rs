//! securecloud-client - Session and live-update client for SecureCloud.
//!
//! # Components
//!
//! - [`TokenManager`]: owns the session tokens and refreshes them single-flight
//! - [`Gateway`]: authenticated REST calls with one refresh-and-retry on 401
//! - [`RealtimeChannel`]: WebSocket connection with bounded reconnection
//! - [`EventRouter`]: turns realtime events into user notifications
//! - [`SecureCloud`]: wires the above together and exposes the REST resources
//!
//! # Logging
//!
//! The crate logs through `tracing`. Token values are never logged.

pub mod api;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod realtime;
mod session;

pub use auth::{LogoutReason, SessionEvent, TokenManager};
pub use config::{ClientConfig, REQUEST_TIMEOUT, ReconnectPolicy};
pub use gateway::{Gateway, HttpClient};
pub use realtime::{
    ChannelEvent, ChannelEventStream, ConnectionState, EventRouter, RealtimeChannel, Routed,
};
pub use session::SecureCloud;

pub use securecloud_core::{Error, Result};
