use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ip_address: String,
    #[serde(default)]
    pub mac_address: String,
    pub status: String,
    #[serde(default)]
    pub speed: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub monitoring: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub interface_id: String,
    pub timestamp: DateTime<Utc>,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: u64,
    pub packets_out: u64,
    #[serde(default)]
    pub errors_in: u64,
    #[serde(default)]
    pub errors_out: u64,
    #[serde(default)]
    pub dropped_in: u64,
    #[serde(default)]
    pub dropped_out: u64,
}
