//! Date/time display helpers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Date format used in file listings.
pub const LIST_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format used in the file detail view.
pub const DETAIL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an RFC 3339 timestamp (as reported by the object store) in a timezone.
///
/// Returns the input unchanged if either the timestamp or the timezone
/// cannot be parsed.
pub fn format_timestamp(timestamp: &str, timezone: &str, format: &str) -> String {
    let Ok(tz) = timezone.parse::<Tz>() else {
        return timestamp.to_string();
    };

    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.with_timezone(&Utc).with_timezone(&tz).format(format).to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Current time as an RFC 3339 string with millisecond precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
