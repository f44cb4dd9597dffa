use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Payload accepted by the proxy endpoint.
///
/// Every field is optional on the wire so that validation happens inside the
/// executor and always yields a `ProxyResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ProxyRequest {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            method: Some(method.to_string()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    /// Upper-cased method, `GET` when absent or blank.
    pub fn method_or_default(&self) -> String {
        match self.method.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_uppercase(),
            _ => "GET".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_defaults_to_get() {
        let req = ProxyRequest::default();
        assert_eq!(req.method_or_default(), "GET");

        let req = ProxyRequest::new("  ", "http://x");
        assert_eq!(req.method_or_default(), "GET");

        let req = ProxyRequest::new("post", "http://x");
        assert_eq!(req.method_or_default(), "POST");
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let req: ProxyRequest = serde_json::from_str(r#"{"url":"http://x"}"#).unwrap();
        assert_eq!(req.url.as_deref(), Some("http://x"));
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }
}
