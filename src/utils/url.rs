use crate::http::HttpMethod;
use crate::{AbyssError, Result};

/// Add a scheme when the user typed none: plain `http` for local hosts,
/// `https` for everything else.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return trimmed.to_string();
    }

    if trimmed.starts_with("localhost")
        || trimmed.starts_with("127.0.0.1")
        || trimmed.contains(".local")
    {
        format!("http://{}", trimmed)
    } else {
        format!("https://{}", trimmed)
    }
}

/// Checks run before a request ever reaches the proxy.
pub fn validate_url(raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(AbyssError::InvalidUrl("URL is required".to_string()));
    }

    let parsed = url::Url::parse(&normalize_url(raw))
        .map_err(|_| AbyssError::InvalidUrl("Invalid URL format".to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AbyssError::InvalidUrl(
            "Only HTTP and HTTPS protocols are supported".to_string(),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AbyssError::InvalidUrl("Enter a valid domain".to_string()));
    }
    Ok(())
}

/// Short tab label: the last two path segments, else the host.
///
/// `GET https://api.test/v1/users/42` → `GET /users/42`,
/// `GET https://example.com/` → `GET example.com`.
pub fn derive_tab_name(url: &str, method: HttpMethod) -> String {
    let Ok(parsed) = url::Url::parse(url) else {
        return format!("{} Request", method);
    };

    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let short = segments[segments.len().saturating_sub(2)..].join("/");

    if short.is_empty() {
        format!("{} {}", method, parsed.host_str().unwrap_or_default())
    } else {
        format!("{} /{}", method, short)
    }
}
