//! Typed `message` envelopes.

use serde::{Deserialize, Serialize};

/// Kind of an inbound event, taken from its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Alert,
    Threat,
    Notification,
    Stats,
    System,
    /// Any type this client does not know about.
    #[serde(untagged)]
    Other(String),
}

/// Action carried by alert and threat events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Create,
    Update,
    Delete,
    #[serde(untagged)]
    Other(String),
}

/// An event delivered inside a `message` frame.
///
/// Transient: consumed by the router as soon as it arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Selects the handler.
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Sub-selector for alert and threat events.
    #[serde(default)]
    pub action: Option<EventAction>,

    /// Handler-specific payload.
    #[serde(default, alias = "payload")]
    pub data: serde_json::Value,

    /// Server timestamp, kept verbatim.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl InboundEvent {
    /// Returns a string field of the payload, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_kind_and_action() {
        let event: InboundEvent = serde_json::from_value(json!({
            "type": "alert",
            "action": "create",
            "data": {"title": "X"},
            "timestamp": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(event.kind, EventKind::Alert);
        assert_eq!(event.action, Some(EventAction::Create));
        assert_eq!(event.field("title"), Some("X"));
        assert_eq!(event.field("description"), None);
    }

    #[test]
    fn unknown_kind_and_action_are_preserved() {
        let event: InboundEvent = serde_json::from_value(json!({
            "type": "audit",
            "action": "archive"
        }))
        .unwrap();

        assert_eq!(event.kind, EventKind::Other("audit".to_string()));
        assert_eq!(event.action, Some(EventAction::Other("archive".to_string())));
        assert!(event.data.is_null());
        assert!(event.timestamp.is_none());
    }

    #[test]
    fn accepts_payload_alias() {
        let event: InboundEvent = serde_json::from_value(json!({
            "type": "stats",
            "payload": {"totalAlerts": 3}
        }))
        .unwrap();

        assert_eq!(event.kind, EventKind::Stats);
        assert_eq!(event.data["totalAlerts"], 3);
    }
}
