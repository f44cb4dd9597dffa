use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalized outcome of one proxied call.
///
/// Validation and network failures are carried in the same shape with
/// `status == 0` and `error` set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResult {
    pub status: u16,
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProxyResult {
    pub fn failure(status_text: &str, error: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: status_text.to_string(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn missing_url() -> Self {
        Self::failure("Invalid URL", "Missing required field: url")
    }

    pub fn invalid_url(raw: &str) -> Self {
        Self::failure("Invalid URL", format!("Invalid URL: {}", raw))
    }

    /// `scheme` is rendered with a trailing colon, e.g. `ftp:`.
    pub fn invalid_protocol(scheme: &str) -> Self {
        Self::failure(
            "Invalid Protocol",
            format!("Only HTTP and HTTPS are supported, got: {}:", scheme),
        )
    }

    pub fn invalid_method(raw: &str) -> Self {
        Self::failure("Invalid Method", format!("Invalid HTTP method: {}", raw))
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::failure("Network Error", message)
    }

    pub fn is_error(&self) -> bool {
        self.status == 0 || self.error.is_some()
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_serialization() {
        let result = ProxyResult::invalid_url("not-a-url");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], 0);
        assert_eq!(json["statusText"], "Invalid URL");
        assert_eq!(json["error"], "Invalid URL: not-a-url");
        assert_eq!(json["latencyMs"], 0);
        assert_eq!(json["size"], 0);
        assert_eq!(json["body"], "");
    }

    #[test]
    fn test_error_field_omitted_on_success() {
        let result = ProxyResult {
            status: 200,
            status_text: "OK".to_string(),
            ..ProxyResult::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert!(result.is_success());
        assert!(!result.is_error());
    }

    #[test]
    fn test_invalid_protocol_message() {
        let result = ProxyResult::invalid_protocol("ftp");
        assert_eq!(result.status_text, "Invalid Protocol");
        assert_eq!(
            result.error.as_deref(),
            Some("Only HTTP and HTTPS are supported, got: ftp:")
        );
    }
}
