//! Realtime event types.
//!
//! This module defines what travels over the realtime channel and what the
//! event router hands to the UI layer. Routing itself lives in the client
//! crate.

mod frame;
mod inbound;
mod notification;

pub use frame::{Frame, names};
pub use inbound::{EventAction, EventKind, InboundEvent};
pub use notification::{Notification, NotificationAction, NotificationPayload, Severity};
