use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::utils::formatter::format_bytes;
use crate::workspace::HistoryEntry;

/// Table of history entries, newest first, as stored in the workspace.
pub fn history_table(entries: &[HistoryEntry], limit: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Time", "Method", "URL", "Status", "Latency", "Size"]);

    for entry in entries.iter().take(limit) {
        let status = &entry.response;
        let status_cell = if status.status == 0 {
            Cell::new(&status.status_text).fg(Color::Red)
        } else if status.status < 400 {
            Cell::new(status.status).fg(Color::Green)
        } else {
            Cell::new(status.status).fg(Color::Red)
        };

        let time = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(entry.id.chars().take(8).collect::<String>()),
            Cell::new(time),
            Cell::new(entry.method),
            Cell::new(&entry.url).add_attribute(Attribute::Dim),
            status_cell,
            Cell::new(format!("{}ms", status.latency_ms)),
            Cell::new(format_bytes(status.size)),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::ResponseSummary;

    fn entry(id: &str, status: u16) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            timestamp: 1_700_000_000_000,
            url: format!("https://example.com/{}", id),
            response: ResponseSummary {
                status,
                status_text: if status == 0 { "Network Error" } else { "OK" }.to_string(),
                latency_ms: 42,
                ..ResponseSummary::default()
            },
            ..HistoryEntry::default()
        }
    }

    #[test]
    fn test_history_table_respects_limit() {
        let entries = vec![entry("a", 200), entry("b", 0), entry("c", 404)];
        let table = history_table(&entries, 2);
        let rendered = table.to_string();
        assert!(rendered.contains("https://example.com/a"));
        assert!(rendered.contains("Network Error"));
        assert!(!rendered.contains("https://example.com/c"));
        assert!(rendered.contains("42ms"));
    }
}
