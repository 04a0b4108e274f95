//! securecloud-core - Core types for the SecureCloud session client.
//!
//! This crate holds everything the session layer agrees on without doing any
//! I/O: validated endpoint URLs, token newtypes, the error taxonomy, the
//! key-value storage seam, realtime event types and REST resource models.

pub mod credentials;
pub mod error;
pub mod events;
pub mod models;
pub mod storage;
pub mod tokens;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use events::{EventAction, EventKind, Frame, InboundEvent, Notification, Severity};
pub use storage::{ACCESS_TOKEN_KEY, MemoryStore, REFRESH_TOKEN_KEY, TokenStore};
pub use tokens::{AccessToken, RefreshToken};
pub use types::{ApiUrl, RealtimeUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
