use std::net::IpAddr;

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use securecloud_core::error::{Error, InvalidInputError};
use securecloud_core::models::{BlockedConnection, FilterOptions, FirewallRule, Page};

use crate::gateway::Gateway;

use super::segment;

#[derive(Serialize)]
struct ToggleRequest {
    enabled: bool,
}

#[derive(Serialize)]
struct ReorderRequest<'a> {
    rule_ids: &'a [String],
}

#[derive(Serialize)]
struct UnblockRequest<'a> {
    ip: &'a str,
}

/// `/firewall` endpoints.
pub struct Firewall<'a> {
    gateway: &'a Gateway,
}

impl<'a> Firewall<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn rules(&self, filters: &FilterOptions) -> Result<Page<FirewallRule>, Error> {
        self.gateway.get_with("firewall/rules", filters).await
    }

    pub async fn rule(&self, id: &str) -> Result<FirewallRule, Error> {
        let id = segment("rule id", id)?;
        self.gateway.get(&format!("firewall/rules/{}", id)).await
    }

    /// Create a rule. The server assigns the id.
    #[instrument(skip(self, rule), fields(name = %rule.name))]
    pub async fn create(&self, rule: &FirewallRule) -> Result<FirewallRule, Error> {
        self.gateway.post("firewall/rules", rule).await
    }

    pub async fn update(&self, id: &str, rule: &FirewallRule) -> Result<FirewallRule, Error> {
        let id = segment("rule id", id)?;
        self.gateway.put(&format!("firewall/rules/{}", id), rule).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let id = segment("rule id", id)?;
        self.gateway.delete(&format!("firewall/rules/{}", id)).await
    }

    /// Enable or disable a rule.
    #[instrument(skip(self))]
    pub async fn toggle(&self, id: &str, enabled: bool) -> Result<FirewallRule, Error> {
        let id = segment("rule id", id)?;
        self.gateway
            .patch(&format!("firewall/rules/{}/toggle", id), &ToggleRequest { enabled })
            .await
    }

    /// Set evaluation order to `rule_ids`.
    pub async fn reorder(&self, rule_ids: &[String]) -> Result<(), Error> {
        let request = self
            .gateway
            .request(Method::POST, "firewall/rules/reorder")
            .json(&ReorderRequest { rule_ids });
        self.gateway.execute_no_content(request).await
    }

    pub async fn blocked(&self, filters: &FilterOptions) -> Result<Page<BlockedConnection>, Error> {
        self.gateway.get_with("firewall/blocked", filters).await
    }

    /// Remove an address from the block list.
    #[instrument(skip(self))]
    pub async fn unblock(&self, ip: &str) -> Result<(), Error> {
        let ip: IpAddr = ip.trim().parse().map_err(|_| InvalidInputError::Other {
            message: format!("not an IP address: {}", ip),
        })?;
        let ip = ip.to_string();
        let request = self
            .gateway
            .request(Method::POST, "firewall/unblock")
            .json(&UnblockRequest { ip: &ip });
        self.gateway.execute_no_content(request).await
    }
}
