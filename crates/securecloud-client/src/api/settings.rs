use serde_json::Value;

use securecloud_core::error::Error;

use crate::gateway::Gateway;

/// `/settings` endpoints. The document is opaque to the client.
pub struct Settings<'a> {
    gateway: &'a Gateway,
}

impl<'a> Settings<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn get(&self) -> Result<Value, Error> {
        self.gateway.get("settings").await
    }

    /// Replace the settings document and return the stored version.
    pub async fn update(&self, settings: &Value) -> Result<Value, Error> {
        self.gateway.put("settings", settings).await
    }
}
