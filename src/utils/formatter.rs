use crate::http::ProxyResult;
use colored::*;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

/// Renders a `ProxyResult` for the terminal.
pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self, result: &ProxyResult) -> String {
        let mut output = vec![self.status_line(result)];

        if let Some(error) = &result.error {
            output.push(self.paint(&format!("Error: {}", error), |s| s.red().to_string()));
            return output.join("\n");
        }

        let timing = format!(
            "Time: {}ms  Size: {}",
            result.latency_ms,
            format_bytes(result.size)
        );
        output.push(self.paint(&timing, |s| s.cyan().to_string()));

        match self.format {
            ResponseFormat::Compact => self.push_compact_body(result, &mut output),
            ResponseFormat::Verbose => {
                self.push_headers(result, &mut output);
                self.push_verbose_body(result, &mut output);
            }
        }

        output.join("\n")
    }

    fn status_line(&self, result: &ProxyResult) -> String {
        let line = if result.status == 0 {
            result.status_text.clone()
        } else {
            format!("HTTP {} {}", result.status, result.status_text)
        };
        if !self.color {
            return line;
        }
        let colored = if result.is_success() {
            line.green()
        } else if result.is_redirect() {
            line.blue()
        } else if result.is_client_error() {
            line.yellow()
        } else {
            line.red()
        };
        match self.format {
            ResponseFormat::Verbose => colored.bold().to_string(),
            ResponseFormat::Compact => colored.to_string(),
        }
    }

    fn push_compact_body(&self, result: &ProxyResult, output: &mut Vec<String>) {
        if result.body.is_empty() {
            return;
        }
        if result.body.len() < 200 {
            output.push(try_format_json(&result.body).unwrap_or_else(|| result.body.clone()));
        } else {
            output.push(format!("Body: {}", format_bytes(result.size)));
        }
    }

    fn push_headers(&self, result: &ProxyResult, output: &mut Vec<String>) {
        if result.headers.is_empty() {
            return;
        }
        output.push(String::new());
        output.push(self.paint("Headers:", |s| s.blue().bold().to_string()));
        for (key, value) in &result.headers {
            if self.color {
                output.push(format!("   {}: {}", key.bold(), value));
            } else {
                output.push(format!("   {}: {}", key, value));
            }
        }
    }

    fn push_verbose_body(&self, result: &ProxyResult, output: &mut Vec<String>) {
        if result.body.is_empty() {
            return;
        }
        output.push(String::new());
        output.push(self.paint("Body:", |s| s.blue().bold().to_string()));
        output.push(try_format_json(&result.body).unwrap_or_else(|| result.body.clone()));
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }
}

/// Pretty JSON, or `None` when the body is not JSON.
fn try_format_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// `0 B`, `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    match bytes {
        0..KB => format!("{} B", bytes),
        KB..MB => format!("{:.1} KB", bytes as f64 / KB as f64),
        _ => format!("{:.1} MB", bytes as f64 / MB as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_result(body: &str) -> ProxyResult {
        let mut result = ProxyResult {
            status: 200,
            status_text: "OK".to_string(),
            body: body.to_string(),
            size: body.len() as u64,
            latency_ms: 12,
            ..ProxyResult::default()
        };
        result
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        result
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MB");
    }

    #[test]
    fn test_compact_plain() {
        let text = ResponseFormatter::new(ResponseFormat::Compact)
            .with_color(false)
            .format(&ok_result(r#"{"a":1}"#));
        assert!(text.starts_with("HTTP 200 OK"));
        assert!(text.contains("Time: 12ms"));
        assert!(text.contains("\"a\": 1"));
        assert!(!text.contains("Headers:"));
    }

    #[test]
    fn test_verbose_lists_headers() {
        let text = ResponseFormatter::new(ResponseFormat::Verbose)
            .with_color(false)
            .format(&ok_result("plain"));
        assert!(text.contains("Headers:"));
        assert!(text.contains("content-type: application/json"));
        assert!(text.contains("plain"));
    }

    #[test]
    fn test_error_envelope() {
        let text = ResponseFormatter::new(ResponseFormat::Verbose)
            .with_color(false)
            .format(&ProxyResult::invalid_url("nope"));
        assert_eq!(text, "Invalid URL\nError: Invalid URL: nope");
    }
}
