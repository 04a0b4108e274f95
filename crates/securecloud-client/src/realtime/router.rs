//! Maps inbound realtime events to user-facing notifications.
//!
//! The router holds no state and performs no I/O. Every event yields at most
//! one [`Notification`] and, for stats events, a refetch signal. Events it
//! cannot handle are logged and dropped.

use serde_json::Value;
use tracing::{debug, warn};

use securecloud_core::events::{
    EventAction, EventKind, Frame, InboundEvent, Notification, NotificationPayload, names,
};

const UNTITLED: &str = "(untitled)";

/// Result of routing one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routed {
    /// Notification to show, if any.
    pub notification: Option<Notification>,
    /// Dashboard data should be refetched.
    pub refresh_stats: bool,
}

impl Routed {
    fn none() -> Self {
        Self::default()
    }

    fn notify(notification: Notification) -> Self {
        Self {
            notification: Some(notification),
            refresh_stats: false,
        }
    }

    fn refetch() -> Self {
        Self {
            notification: None,
            refresh_stats: true,
        }
    }
}

/// Stateless event router.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRouter;

impl EventRouter {
    pub fn new() -> Self {
        Self
    }

    /// Route a frame received on the channel.
    ///
    /// `message` frames carry an [`InboundEvent`]; named frames such as
    /// `alert:created` carry the resource directly.
    pub fn route_frame(&self, frame: &Frame) -> Routed {
        let data = &frame.data;

        match frame.event.as_str() {
            names::MESSAGE => match serde_json::from_value::<InboundEvent>(data.clone()) {
                Ok(event) => self.route(&event),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed message event");
                    Routed::none()
                }
            },
            names::NOTIFICATION => notification_from(data),
            names::ALERT_CREATED => {
                let title = match text(data, "severity") {
                    Some(severity) => format!("New {} alert: {}", severity, title(data)),
                    None => format!("New alert: {}", title(data)),
                };
                Routed::notify(
                    Notification::warning(title).with_description(text(data, "description")),
                )
            }
            names::ALERT_RESOLVED => Routed::notify(Notification::success(format!(
                "Alert resolved: {}",
                title(data)
            ))),
            names::THREAT_DETECTED => Routed::notify(
                Notification::error(format!("Threat detected: {}", name(data)))
                    .with_description(text(data, "description")),
            ),
            names::SYSTEM_HEALTH => system_health(data),
            names::SYSTEM_SERVICE_DOWN => Routed::notify(Notification::error(format!(
                "Service down: {}",
                service(data)
            ))),
            names::SYSTEM_SERVICE_UP => Routed::notify(Notification::success(format!(
                "Service restored: {}",
                service(data)
            ))),
            names::STATS_UPDATE => Routed::refetch(),
            names::ALERT_UPDATED | names::THREAT_UPDATED => Routed::none(),
            other => {
                debug!(event = other, "Ignoring unhandled realtime event");
                Routed::none()
            }
        }
    }

    /// Route a typed `message` event by its kind and action.
    pub fn route(&self, event: &InboundEvent) -> Routed {
        match &event.kind {
            EventKind::Alert => self.route_alert(event),
            EventKind::Threat => self.route_threat(event),
            EventKind::Notification => notification_from(&event.data),
            EventKind::Stats => Routed::refetch(),
            EventKind::System => system_health(&event.data),
            EventKind::Other(kind) => {
                debug!(kind = %kind, "Unknown event type");
                Routed::none()
            }
        }
    }

    fn route_alert(&self, event: &InboundEvent) -> Routed {
        let data = &event.data;
        match &event.action {
            Some(EventAction::Create) => Routed::notify(
                Notification::warning(format!("New alert: {}", title(data)))
                    .with_description(text(data, "description")),
            ),
            Some(EventAction::Update) => Routed::none(),
            Some(EventAction::Delete) => {
                Routed::notify(Notification::info(format!("Alert deleted: {}", title(data))))
            }
            other => {
                debug!(action = ?other, "Unknown alert action");
                Routed::none()
            }
        }
    }

    fn route_threat(&self, event: &InboundEvent) -> Routed {
        let data = &event.data;
        match &event.action {
            Some(EventAction::Create) => {
                let description = text(data, "severity").map(|s| format!("Severity: {}", s));
                Routed::notify(
                    Notification::error(format!("Threat detected: {}", name(data)))
                        .with_description(description),
                )
            }
            Some(EventAction::Update | EventAction::Delete) => Routed::none(),
            other => {
                debug!(action = ?other, "Unknown threat action");
                Routed::none()
            }
        }
    }
}

fn notification_from(data: &Value) -> Routed {
    match serde_json::from_value::<NotificationPayload>(data.clone()) {
        Ok(payload) => Routed::notify(payload.into()),
        Err(e) => {
            warn!(error = %e, "Dropping malformed notification");
            Routed::none()
        }
    }
}

fn system_health(data: &Value) -> Routed {
    match text(data, "status") {
        Some("critical") => Routed::notify(
            Notification::error("System health critical!").with_description(text(data, "message")),
        ),
        Some("degraded") => Routed::notify(
            Notification::warning("System performance degraded")
                .with_description(text(data, "message")),
        ),
        _ => Routed::none(),
    }
}

fn text<'a>(data: &'a Value, field: &str) -> Option<&'a str> {
    data.get(field).and_then(Value::as_str)
}

fn title(data: &Value) -> &str {
    text(data, "title").unwrap_or(UNTITLED)
}

fn name(data: &Value) -> &str {
    text(data, "name").or_else(|| text(data, "title")).unwrap_or(UNTITLED)
}

fn service(data: &Value) -> &str {
    text(data, "service")
        .or_else(|| text(data, "name"))
        .unwrap_or("unknown service")
}

#[cfg(test)]
mod tests {
    use super::*;
    use securecloud_core::events::Severity;
    use serde_json::json;

    fn message(value: Value) -> Routed {
        EventRouter::new().route_frame(&Frame::new(names::MESSAGE, value))
    }

    fn named(event: &str, data: Value) -> Routed {
        EventRouter::new().route_frame(&Frame::new(event, data))
    }

    #[test]
    fn alert_create_yields_one_warning() {
        let routed = message(json!({"type": "alert", "action": "create", "data": {"title": "X"}}));

        let notification = routed.notification.unwrap();
        assert_eq!(notification.severity, Severity::Warning);
        assert!(notification.title.contains('X'));
        assert!(notification.description.is_none());
        assert!(!routed.refresh_stats);
    }

    #[test]
    fn alert_create_without_payload_does_not_fail() {
        let routed = message(json!({"type": "alert", "action": "create"}));
        let notification = routed.notification.unwrap();
        assert_eq!(notification.title, "New alert: (untitled)");
    }

    #[test]
    fn alert_update_is_silent_and_delete_is_info() {
        assert_eq!(
            message(json!({"type": "alert", "action": "update", "data": {"title": "X"}})),
            Routed::default()
        );

        let routed = message(json!({"type": "alert", "action": "delete", "data": {"title": "X"}}));
        assert_eq!(routed.notification.unwrap().severity, Severity::Info);
    }

    #[test]
    fn threat_create_is_error_with_severity() {
        let routed = message(json!({
            "type": "threat",
            "action": "create",
            "data": {"name": "Botnet C2", "severity": "critical"}
        }));

        let notification = routed.notification.unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.title, "Threat detected: Botnet C2");
        assert_eq!(notification.description.as_deref(), Some("Severity: critical"));
    }

    #[test]
    fn stats_event_requests_refetch_only() {
        let routed = message(json!({"type": "stats", "data": {}}));
        assert!(routed.refresh_stats);
        assert!(routed.notification.is_none());

        assert!(named(names::STATS_UPDATE, Value::Null).refresh_stats);
    }

    #[test]
    fn system_status_maps_to_severity() {
        let critical = message(json!({"type": "system", "data": {"status": "critical", "message": "db down"}}));
        let n = critical.notification.unwrap();
        assert_eq!(n.severity, Severity::Error);
        assert_eq!(n.description.as_deref(), Some("db down"));

        let degraded = message(json!({"type": "system", "data": {"status": "degraded"}}));
        assert_eq!(degraded.notification.unwrap().severity, Severity::Warning);

        let healthy = message(json!({"type": "system", "data": {"status": "healthy"}}));
        assert!(healthy.notification.is_none());
    }

    #[test]
    fn notification_event_uses_payload() {
        let routed = message(json!({
            "type": "notification",
            "data": {"type": "success", "title": "Export ready", "message": "alerts.csv"}
        }));
        let n = routed.notification.unwrap();
        assert_eq!(n.severity, Severity::Success);
        assert_eq!(n.title, "Export ready");
        assert_eq!(n.description.as_deref(), Some("alerts.csv"));
    }

    #[test]
    fn unknown_type_and_action_are_dropped() {
        assert_eq!(message(json!({"type": "audit", "data": {}})), Routed::default());
        assert_eq!(
            message(json!({"type": "alert", "action": "archive"})),
            Routed::default()
        );
        assert_eq!(message(json!({"type": "alert"})), Routed::default());
        assert_eq!(message(json!("not an object")), Routed::default());
        assert_eq!(named("audit:created", json!({})), Routed::default());
    }

    #[test]
    fn named_alert_events() {
        let created = named(
            names::ALERT_CREATED,
            json!({"title": "Port scan", "severity": "high"}),
        );
        let n = created.notification.unwrap();
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(n.title, "New high alert: Port scan");

        let resolved = named(names::ALERT_RESOLVED, json!({"title": "Port scan"}));
        let n = resolved.notification.unwrap();
        assert_eq!(n.severity, Severity::Success);
        assert_eq!(n.title, "Alert resolved: Port scan");

        assert_eq!(named(names::ALERT_UPDATED, json!({"title": "x"})), Routed::default());
    }

    #[test]
    fn named_system_events() {
        let down = named(names::SYSTEM_SERVICE_DOWN, json!({"service": "ingest"}));
        assert_eq!(down.notification.unwrap().title, "Service down: ingest");

        let up = named(names::SYSTEM_SERVICE_UP, json!({"service": "ingest"}));
        let n = up.notification.unwrap();
        assert_eq!(n.severity, Severity::Success);
        assert_eq!(n.title, "Service restored: ingest");

        let health = named(names::SYSTEM_HEALTH, json!({"status": "critical"}));
        assert_eq!(health.notification.unwrap().title, "System health critical!");
    }
}
