/// Utility functions for formatting log output
use time::{format_description, Duration, OffsetDateTime};

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]")
        .expect("Failed to create format description");
    dt.format(&format).unwrap_or_else(|_| dt.to_string())
}

/// Describe how old the current snapshot is, for log lines during outages.
pub fn format_staleness(last_updated: Option<OffsetDateTime>) -> String {
    match last_updated {
        Some(at) => {
            let age: Duration = OffsetDateTime::now_utc() - at;
            format!("last good reading {}s ago", age.whole_seconds().max(0))
        }
        None => "no successful reading yet".to_string(),
    }
}
