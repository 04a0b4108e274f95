use serde_json::Value;

use securecloud_core::error::Error;
use securecloud_core::models::{Activity, DashboardStats};

use crate::gateway::Gateway;

use super::{LimitQuery, TimeRangeQuery};

/// `/dashboard` endpoints.
pub struct Dashboard<'a> {
    gateway: &'a Gateway,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Headline counters. Refetch these on a stats-changed signal.
    pub async fn stats(&self, time_range: Option<&str>) -> Result<DashboardStats, Error> {
        self.gateway
            .get_with("dashboard/stats", &TimeRangeQuery { time_range })
            .await
    }

    pub async fn alert_trends(&self, time_range: Option<&str>) -> Result<Vec<Value>, Error> {
        self.gateway
            .get_with("dashboard/alert-trends", &TimeRangeQuery { time_range })
            .await
    }

    pub async fn threat_distribution(&self) -> Result<Vec<Value>, Error> {
        self.gateway.get("dashboard/threat-distribution").await
    }

    pub async fn network_metrics(&self, time_range: Option<&str>) -> Result<Value, Error> {
        self.gateway
            .get_with("dashboard/network-metrics", &TimeRangeQuery { time_range })
            .await
    }

    pub async fn recent_activity(&self, limit: u32) -> Result<Vec<Activity>, Error> {
        self.gateway
            .get_with("dashboard/recent-activity", &LimitQuery { limit })
            .await
    }
}
