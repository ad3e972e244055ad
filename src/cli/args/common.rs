//! Common CLI types shared across commands

use chrono::{DateTime, NaiveDate, Utc};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format - human-readable tables and summaries (default)
    #[default]
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

/// Parse a date argument: RFC 3339, or `YYYY-MM-DD` read as midnight UTC.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD or RFC 3339)", s))
}
