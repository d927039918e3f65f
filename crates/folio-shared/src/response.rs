//! The response envelope every backend endpoint uses.

use serde::{Deserialize, Serialize};

/// `{ success, data?, message?, error? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Best human-readable reason carried by the envelope.
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_without_data() {
        let body = r#"{"success":false,"error":"Post not found"}"#;
        let parsed: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(!parsed.success);
        assert!(parsed.data.is_none());
        assert_eq!(parsed.reason(), Some("Post not found"));
    }

    #[test]
    fn test_message_is_used_when_error_is_absent() {
        let body = r#"{"success":false,"message":"Forbidden"}"#;
        let parsed: ApiResponse<()> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.reason(), Some("Forbidden"));
    }
}
