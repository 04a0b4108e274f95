use reqwest::Method;
use serde_json::Value;

use securecloud_core::error::Error;
use securecloud_core::models::{FilterOptions, NetworkInterface, NetworkStats, Page};

use crate::gateway::Gateway;

use super::{TimeRangeQuery, segment};

/// `/network` endpoints.
pub struct Network<'a> {
    gateway: &'a Gateway,
}

impl<'a> Network<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn interfaces(&self) -> Result<Vec<NetworkInterface>, Error> {
        self.gateway.get("network/interfaces").await
    }

    pub async fn interface(&self, id: &str) -> Result<NetworkInterface, Error> {
        let id = segment("interface id", id)?;
        self.gateway.get(&format!("network/interfaces/{}", id)).await
    }

    pub async fn start_monitoring(&self, id: &str) -> Result<(), Error> {
        self.monitoring(id, "start").await
    }

    pub async fn stop_monitoring(&self, id: &str) -> Result<(), Error> {
        self.monitoring(id, "stop").await
    }

    /// Counters for one interface over `time_range` (server default if unset).
    pub async fn stats(
        &self,
        id: &str,
        time_range: Option<&str>,
    ) -> Result<Vec<NetworkStats>, Error> {
        let id = segment("interface id", id)?;
        self.gateway
            .get_with(
                &format!("network/interfaces/{}/stats", id),
                &TimeRangeQuery { time_range },
            )
            .await
    }

    /// Aggregate traffic over `time_range`. The shape is server-defined.
    pub async fn traffic(&self, time_range: Option<&str>) -> Result<Value, Error> {
        self.gateway
            .get_with("network/traffic", &TimeRangeQuery { time_range })
            .await
    }

    pub async fn packets(&self, filters: &FilterOptions) -> Result<Page<Value>, Error> {
        self.gateway.get_with("network/packets", filters).await
    }

    async fn monitoring(&self, id: &str, verb: &str) -> Result<(), Error> {
        let id = segment("interface id", id)?;
        let request = self
            .gateway
            .request(Method::POST, &format!("network/interfaces/{}/{}", id, verb));
        self.gateway.execute_no_content(request).await
    }
}
