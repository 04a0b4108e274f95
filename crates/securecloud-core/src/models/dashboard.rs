use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficTotals {
    pub inbound: u64,
    pub outbound: u64,
}

/// Headline numbers for the dashboard. Chart series stay as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_alerts: u64,
    pub critical_alerts: u64,
    pub active_threats: u64,
    pub blocked_connections: u64,
    #[serde(default)]
    pub network_traffic: TrafficTotals,
    #[serde(default)]
    pub alert_trends: Vec<serde_json::Value>,
    #[serde(default)]
    pub threat_distribution: Vec<serde_json::Value>,
    #[serde(default)]
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: String,
    #[serde(default)]
    pub severity: Option<super::AlertSeverity>,
    #[serde(default)]
    pub user: Option<String>,
}
