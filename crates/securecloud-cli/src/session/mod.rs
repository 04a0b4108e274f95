//! Client construction and persisted session state.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};

use securecloud_client::{ClientConfig, SecureCloud};
use securecloud_core::{ApiUrl, RealtimeUrl};

use crate::cli::EndpointArgs;

use self::storage::FileStore;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    endpoint: EndpointArgs,
    pub json: bool,
}

impl Context {
    pub fn new(endpoint: EndpointArgs, json: bool) -> Self {
        Self { endpoint, json }
    }

    /// Build a client over the persisted session.
    pub fn client(&self) -> Result<SecureCloud> {
        let api_url = ApiUrl::new(&self.endpoint.api_url).context("Invalid API URL")?;
        let realtime_url = RealtimeUrl::new(&self.endpoint.ws_url).context("Invalid WebSocket URL")?;
        let store = FileStore::open_default().context("Failed to open session store")?;

        SecureCloud::new(ClientConfig::new(api_url, realtime_url), Arc::new(store))
            .context("Failed to create client")
    }

    /// Like [`client`](Self::client), but fails without a stored session.
    pub fn session(&self) -> Result<SecureCloud> {
        let client = self.client()?;
        if !client.is_authenticated() {
            bail!("No active session. Run 'securecloud auth login' first.");
        }
        Ok(client)
    }
}
