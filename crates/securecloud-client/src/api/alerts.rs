use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument};

use securecloud_core::error::Error;
use securecloud_core::models::{Alert, AlertSeverity, AlertStatus, FilterOptions, Page};

use crate::gateway::Gateway;

use super::segment;

/// Partial alert update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// A new alert. The server assigns the id, timestamp and status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: AlertSeverity,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub source_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Pdf,
    Excel,
}

/// Inclusive export window, as ISO-8601 timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

/// What [`Alerts::export`] should produce.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub date_range: DateRange,
    pub include_fields: Vec<String>,
    pub filters: FilterOptions,
}

#[derive(Serialize)]
struct BulkUpdateRequest<'a> {
    ids: &'a [String],
    data: &'a AlertUpdate,
}

#[derive(Serialize)]
struct AssignRequest<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct ResolveRequest<'a> {
    resolution: &'a str,
}

/// `/alerts` endpoints.
pub struct Alerts<'a> {
    gateway: &'a Gateway,
}

impl<'a> Alerts<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// List alerts matching `filters`.
    #[instrument(skip(self))]
    pub async fn list(&self, filters: &FilterOptions) -> Result<Page<Alert>, Error> {
        self.gateway.get_with("alerts", filters).await
    }

    /// Fetch one alert.
    pub async fn get(&self, id: &str) -> Result<Alert, Error> {
        let id = segment("alert id", id)?;
        self.gateway.get(&format!("alerts/{}", id)).await
    }

    #[instrument(skip(self, alert), fields(title = %alert.title))]
    pub async fn create(&self, alert: &NewAlert) -> Result<Alert, Error> {
        self.gateway.post("alerts", alert).await
    }

    /// Apply a partial update.
    pub async fn update(&self, id: &str, update: &AlertUpdate) -> Result<Alert, Error> {
        let id = segment("alert id", id)?;
        self.gateway.put(&format!("alerts/{}", id), update).await
    }

    /// Delete an alert.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let id = segment("alert id", id)?;
        self.gateway.delete(&format!("alerts/{}", id)).await
    }

    /// Apply the same update to several alerts.
    #[instrument(skip(self, ids, update), fields(count = ids.len()))]
    pub async fn bulk_update(&self, ids: &[String], update: &AlertUpdate) -> Result<(), Error> {
        debug!("Bulk updating alerts");
        let request = self
            .gateway
            .request(Method::POST, "alerts/bulk-update")
            .json(&BulkUpdateRequest { ids, data: update });
        self.gateway.execute_no_content(request).await
    }

    /// Assign an alert to a user.
    pub async fn assign(&self, id: &str, user_id: &str) -> Result<Alert, Error> {
        let id = segment("alert id", id)?;
        let user_id = segment("user id", user_id)?;
        self.gateway
            .post(&format!("alerts/{}/assign", id), &AssignRequest { user_id })
            .await
    }

    /// Resolve an alert with a free-text resolution.
    #[instrument(skip(self, resolution))]
    pub async fn resolve(&self, id: &str, resolution: &str) -> Result<Alert, Error> {
        let id = segment("alert id", id)?;
        self.gateway
            .post(&format!("alerts/{}/resolve", id), &ResolveRequest { resolution })
            .await
    }

    /// Export alerts as a file in the requested format.
    ///
    /// The body is returned as-is; it is not an API envelope.
    #[instrument(skip(self, options), fields(format = ?options.format))]
    pub async fn export(&self, options: &ExportOptions) -> Result<Vec<u8>, Error> {
        let request = self
            .gateway
            .request(Method::POST, "alerts/export")
            .json(options);
        self.gateway.execute_bytes(request).await
    }
}
