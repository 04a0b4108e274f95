use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument};

use securecloud_core::error::Error;
use securecloud_core::models::{FilterOptions, Page, SystemHealth};

use crate::gateway::Gateway;

use super::{TimeRangeQuery, segment};

/// `/system` endpoints.
pub struct System<'a> {
    gateway: &'a Gateway,
}

impl<'a> System<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn health(&self) -> Result<SystemHealth, Error> {
        self.gateway.get("system/health").await
    }

    /// Resource usage over `time_range`. The shape is server-defined.
    pub async fn metrics(&self, time_range: Option<&str>) -> Result<Value, Error> {
        self.gateway
            .get_with("system/metrics", &TimeRangeQuery { time_range })
            .await
    }

    pub async fn logs(&self, filters: &FilterOptions) -> Result<Page<Value>, Error> {
        self.gateway.get_with("system/logs", filters).await
    }

    #[instrument(skip(self))]
    pub async fn restart_service(&self, name: &str) -> Result<(), Error> {
        let name = segment("service name", name)?;
        info!("Requesting service restart");
        let request = self
            .gateway
            .request(Method::POST, &format!("system/services/{}/restart", name));
        self.gateway.execute_no_content(request).await
    }
}
