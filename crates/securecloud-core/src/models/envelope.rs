//! Response envelopes.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every REST response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_decodes_camel_case() {
        let page: Page<u32> = serde_json::from_value(json!({
            "data": [1, 2],
            "total": 12,
            "page": 1,
            "pageSize": 2,
            "totalPages": 6
        }))
        .unwrap();

        assert_eq!(page.data, vec![1, 2]);
        assert!(page.has_next());
    }

    #[test]
    fn envelope_optional_fields_default() {
        let resp: ApiResponse<bool> =
            serde_json::from_value(json!({"success": true, "data": true})).unwrap();
        assert!(resp.data);
        assert!(resp.message.is_none());
        assert!(resp.timestamp.is_none());
    }
}
