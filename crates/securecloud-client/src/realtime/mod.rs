//! Realtime live-update channel.
//!
//! Frames are JSON text messages of the form `{ "event": .., "data": .. }`.
//! The access token is passed as the `token` query parameter when dialing.
//!
//! - [`state`]: the connection state machine
//! - [`router`]: maps events to notifications
//! - [`RealtimeChannel`]: drives the socket and fans out [`ChannelEvent`]s

mod channel;
mod connection;
pub mod router;
pub mod state;

pub use channel::{ChannelEvent, ChannelEventStream, RealtimeChannel};
pub use router::{EventRouter, Routed};
pub use state::{ConnectionFsm, ConnectionState, Signal, Step};
