use serde::{Serialize, Serializer};

use super::{AlertSeverity, AlertStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// List filters, sent as query parameters.
///
/// Multi-valued filters are joined with commas.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "join_severities")]
    pub severity: Vec<AlertSeverity>,
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty", serialize_with = "join")]
    pub kind: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "join_statuses")]
    pub status: Vec<AlertStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl FilterOptions {
    /// Filters for one page.
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }
}

fn join<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(","))
}

fn join_severities<S: Serializer>(
    values: &[AlertSeverity],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let joined = values.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",");
    serializer.serialize_str(&joined)
}

fn join_statuses<S: Serializer>(values: &[AlertStatus], serializer: S) -> Result<S::Ok, S::Error> {
    let joined = values.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",");
    serializer.serialize_str(&joined)
}
