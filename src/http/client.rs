use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::Result;
use crate::http::request::ProxyRequest;
use crate::http::response::ProxyResult;
use crate::http::types::allows_body;

/// Executes outbound requests on behalf of a client and normalizes the outcome.
#[derive(Clone)]
pub struct ProxyClient {
    inner: reqwest::Client,
}

impl ProxyClient {
    /// Client without a request timeout: the target's own behaviour bounds the call.
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            inner: builder.build()?,
        })
    }

    /// Perform exactly one outbound call. Never fails: every problem is
    /// reported through the returned envelope.
    pub async fn execute(&self, request: ProxyRequest) -> ProxyResult {
        let Some(raw_url) = request.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return ProxyResult::missing_url();
        };

        let url = match url::Url::parse(raw_url.trim()) {
            Ok(url) => url,
            Err(_) => return ProxyResult::invalid_url(raw_url),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return ProxyResult::invalid_protocol(url.scheme());
        }

        let method_name = request.method_or_default();
        let method = match reqwest::Method::from_bytes(method_name.as_bytes()) {
            Ok(method) => method,
            Err(_) => return ProxyResult::invalid_method(&method_name),
        };

        let mut req = self.inner.request(method, url);
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body
            && !body.is_empty()
            && allows_body(&method_name)
        {
            req = req.body(body);
        }

        let start = Instant::now();
        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(method = %method_name, url = raw_url, "proxy call failed: {}", e);
                return ProxyResult::network_error(error_chain(&e));
            }
        };
        let latency_ms = round_millis(start.elapsed());

        let status = response.status();
        let headers = flatten_headers(response.headers());
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ProxyResult::network_error(error_chain(&e)),
        };

        debug!(
            method = %method_name,
            url = raw_url,
            status = status.as_u16(),
            latency_ms,
            "proxy call completed"
        );

        ProxyResult {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            size: body.len() as u64,
            body,
            latency_ms,
            error: None,
        }
    }
}

/// Name → value; a repeated header keeps its last value.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.insert(name.as_str().to_string(), value);
    }
    map
}

fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// reqwest's top-level message hides the cause (DNS, refused, TLS...).
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
