//! Wire frame for the realtime channel.

use serde::{Deserialize, Serialize};

/// Event names used on the realtime channel.
pub mod names {
    pub const MESSAGE: &str = "message";
    pub const NOTIFICATION: &str = "notification";
    pub const ALERT_CREATED: &str = "alert:created";
    pub const ALERT_UPDATED: &str = "alert:updated";
    pub const ALERT_RESOLVED: &str = "alert:resolved";
    pub const THREAT_DETECTED: &str = "threat:detected";
    pub const THREAT_UPDATED: &str = "threat:updated";
    pub const SYSTEM_HEALTH: &str = "system:health";
    pub const SYSTEM_SERVICE_DOWN: &str = "system:service_down";
    pub const SYSTEM_SERVICE_UP: &str = "system:service_up";
    pub const STATS_UPDATE: &str = "stats:update";
}

/// One named event, sent as a single JSON text frame in either direction.
///
/// ```json
/// { "event": "alert:created", "data": { "title": "Port scan", "severity": "high" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name.
    pub event: String,

    /// Event payload. Absent payloads decode as `null`.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Frame {
    /// Create a new frame.
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Decode a frame from a text message.
    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Encode the frame as a text message.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
