//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Format an optional timestamp as `YYYY-MM-DD HH:MM` UTC, or "N/A".
pub fn format_timestamp(at: Option<&DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}

/// Format a per-type count map as `domain=1, ip=2`, or "-" when empty.
pub fn format_counts(counts: &BTreeMap<String, u64>) -> String {
    if counts.is_empty() {
        return "-".to_string();
    }

    counts
        .iter()
        .map(|(kind, n)| format!("{}={}", kind, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncate `s` to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
