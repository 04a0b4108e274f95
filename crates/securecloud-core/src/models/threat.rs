use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AlertSeverity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatIndicator {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub confidence: f64,
}

/// A correlated threat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: AlertSeverity,
    pub confidence: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub occurrences: u64,
    #[serde(default)]
    pub source_ips: Vec<String>,
    #[serde(default)]
    pub target_ips: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub indicators: Vec<ThreatIndicator>,
    #[serde(default)]
    pub mitigations: Vec<String>,
}
