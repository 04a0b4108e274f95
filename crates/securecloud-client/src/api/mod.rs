//! Namespaced REST resources.
//!
//! Each namespace borrows the [`Gateway`](crate::Gateway) and returns the
//! envelope `data` of its endpoints. Obtain them from
//! [`SecureCloud`](crate::SecureCloud), e.g. `client.alerts().list(..)`.

mod alerts;
mod dashboard;
mod firewall;
mod network;
mod settings;
mod system;
mod threats;
mod users;

pub use alerts::{
    AlertUpdate, Alerts, DateRange, ExportFormat, ExportOptions, NewAlert,
};
pub use dashboard::Dashboard;
pub use firewall::Firewall;
pub use network::Network;
pub use settings::Settings;
pub use system::System;
pub use threats::Threats;
pub use users::{NewUser, UserUpdate, Users};

use serde::Serialize;

use securecloud_core::error::{Error, InvalidInputError};

/// Validate an identifier used as a path segment.
pub(crate) fn segment<'a>(field: &'static str, value: &'a str) -> Result<&'a str, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InvalidInputError::Empty { field }.into());
    }
    if value == "." || value == ".." || value.contains(['/', '?', '#', '%']) {
        return Err(InvalidInputError::Other {
            message: format!("{} contains reserved characters: {}", field, value),
        }
        .into());
    }
    Ok(value)
}

/// `time_range` query parameter.
#[derive(Debug, Serialize)]
pub(crate) struct TimeRangeQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<&'a str>,
}

/// `limit` query parameter.
#[derive(Debug, Serialize)]
pub(crate) struct LimitQuery {
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_trims_and_accepts_ids() {
        assert_eq!(segment("alert id", " a-1 ").unwrap(), "a-1");
    }

    #[test]
    fn segment_rejects_empty_and_reserved() {
        assert!(matches!(
            segment("alert id", "  "),
            Err(Error::InvalidInput(InvalidInputError::Empty { field: "alert id" }))
        ));
        assert!(segment("alert id", "../users").is_err());
        assert!(segment("alert id", "a?x=1").is_err());
    }

    #[test]
    fn segment_rejects_dot_segments_and_escapes() {
        assert!(segment("alert id", ".").is_err());
        assert!(segment("alert id", " .. ").is_err());
        assert!(segment("alert id", "%2e%2e").is_err());
        assert!(segment("alert id", "a%2Fb").is_err());
        assert_eq!(segment("alert id", "v1.2").unwrap(), "v1.2");
    }

    #[test]
    fn absent_time_range_is_omitted() {
        let query = serde_json::to_value(TimeRangeQuery { time_range: None }).unwrap();
        assert_eq!(query, serde_json::json!({}));
    }
}
