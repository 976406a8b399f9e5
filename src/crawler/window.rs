//! Recency window gate
//!
//! Decides whether an article timestamp falls inside the last `months`
//! calendar months relative to an explicit `now`. The same check decides
//! both inclusion and early termination of a harvest.

use chrono::{DateTime, Months, Utc};

use crate::error::{Error, Result};

/// Convert epoch milliseconds to a UTC datetime
///
/// # Errors
///
/// Returns `Error::InvalidInput` for negative or out-of-range timestamps
pub fn timestamp_to_datetime(timestamp_ms: i64) -> Result<DateTime<Utc>> {
    if timestamp_ms < 0 {
        return Err(Error::invalid_input(format!(
            "timestamp must be non-negative, got {timestamp_ms}"
        )));
    }

    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .ok_or_else(|| Error::invalid_input(format!("timestamp out of range: {timestamp_ms}")))
}

/// Earliest instant still inside the window
///
/// Uses calendar-month arithmetic: the day of month is clamped to the
/// length of the target month, so March 31 minus one month is the last day
/// of February. Time of day is preserved.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if `months` is zero or the subtraction
/// leaves the representable range
pub fn window_cutoff(now: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    if months == 0 {
        return Err(Error::invalid_input("window must span at least one month"));
    }

    now.checked_sub_months(Months::new(months))
        .ok_or_else(|| Error::invalid_input(format!("window of {months} months out of range")))
}

/// Check `cutoff <= timestamp <= now`, both ends inclusive
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use newsharvest::crawler::window::is_within_window;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
/// let feb_29 = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
///
/// assert!(is_within_window(feb_29.timestamp_millis(), now, 1).unwrap());
/// assert!(!is_within_window(feb_29.timestamp_millis() - 1, now, 1).unwrap());
/// ```
pub fn is_within_window(timestamp_ms: i64, now: DateTime<Utc>, months: u32) -> Result<bool> {
    let timestamp = timestamp_to_datetime(timestamp_ms)?;
    let cutoff = window_cutoff(now, months)?;

    Ok(cutoff <= timestamp && timestamp <= now)
}

/// Render a timestamp as a `YYYY-MM-DD` UTC date
pub fn normalized_date(timestamp_ms: i64) -> Result<String> {
    Ok(timestamp_to_datetime(timestamp_ms)?
        .format("%Y-%m-%d")
        .to_string())
}
