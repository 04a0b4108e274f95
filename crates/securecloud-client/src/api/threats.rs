use securecloud_core::error::Error;
use securecloud_core::models::{FilterOptions, Page, Threat};

use crate::gateway::Gateway;

use super::{LimitQuery, segment};

/// `/threats` endpoints.
pub struct Threats<'a> {
    gateway: &'a Gateway,
}

impl<'a> Threats<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, filters: &FilterOptions) -> Result<Page<Threat>, Error> {
        self.gateway.get_with("threats", filters).await
    }

    pub async fn get(&self, id: &str) -> Result<Threat, Error> {
        let id = segment("threat id", id)?;
        self.gateway.get(&format!("threats/{}", id)).await
    }

    /// Most active threats, highest first.
    pub async fn top(&self, limit: u32) -> Result<Vec<Threat>, Error> {
        self.gateway
            .get_with("threats/top", &LimitQuery { limit })
            .await
    }

    /// Timeline entries for a threat. The entry shape is server-defined.
    pub async fn timeline(&self, id: &str) -> Result<Vec<serde_json::Value>, Error> {
        let id = segment("threat id", id)?;
        self.gateway.get(&format!("threats/{}/timeline", id)).await
    }
}
