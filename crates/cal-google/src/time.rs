//! Wall-clock timestamp conversion
//!
//! User-facing datetimes arrive as `YYYY-MM-DD HH:MM:SS` strings interpreted
//! in India Standard Time (UTC+05:30, no daylight saving). The remote APIs
//! take RFC 3339 UTC instants.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::error;

use crate::error::{GoogleError, Result};

/// Input format for user-facing datetime strings
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// IANA name sent to the calendar API alongside event times
pub const TIMEZONE_NAME: &str = "Asia/Kolkata";

/// Fixed IST offset: UTC+05:30, no DST rules
pub fn ist_offset() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST offset is in range")
}

/// Parse an IST wall-clock string into a UTC instant.
///
/// Fails with [`GoogleError::ParseTimestamp`] when the string does not match
/// `YYYY-MM-DD HH:MM:SS`; the failure is logged and propagated, never
/// substituted with a default.
pub fn parse_ist(date_string: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(date_string, DATETIME_FORMAT).map_err(|e| {
        error!("Error converting timestamp {:?}: {}", date_string, e);
        GoogleError::ParseTimestamp(format!("{:?}: {}", date_string, e))
    })?;

    // Fixed offset, so the local reading is never ambiguous
    let local = ist_offset()
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| GoogleError::ParseTimestamp(format!("{:?}: ambiguous local time", date_string)))?;

    Ok(local.with_timezone(&Utc))
}

/// Render a UTC instant back as an IST wall-clock string.
pub fn format_ist(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&ist_offset())
        .format(DATETIME_FORMAT)
        .to_string()
}

/// Midnight today in IST, as a UTC instant.
pub fn ist_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&ist_offset());
    let midnight = local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time");
    ist_offset()
        .from_local_datetime(&midnight)
        .single()
        .expect("fixed offset has no gaps")
        .with_timezone(&Utc)
}

/// Resolve an optional listing window to concrete UTC bounds.
///
/// Omitted start defaults to IST midnight of the current date; omitted end
/// defaults to start + 7 days.
pub fn resolve_window(
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = match start {
        Some(s) if !s.is_empty() => parse_ist(s)?,
        _ => ist_midnight(now),
    };

    let end = match end {
        Some(s) if !s.is_empty() => parse_ist(s)?,
        _ => start + Duration::days(7),
    };

    Ok((start, end))
}
