use chrono::{DateTime, Duration, Utc};

/// Get current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Timestamp in milliseconds for `days` days before now.
pub fn days_ago_ms(days: u32) -> i64 {
    (Utc::now() - Duration::days(i64::from(days))).timestamp_millis()
}

/// Convert a millisecond timestamp into a UTC datetime.
///
/// Out-of-range values clamp to the Unix epoch.
pub fn ms_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Render a millisecond timestamp as a `YYYY-MM-DD` calendar date (UTC).
pub fn format_date(ms: i64) -> String {
    ms_to_datetime(ms).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        // 2025-01-31T12:00:00Z
        assert_eq!(format_date(1_738_324_800_000), "2025-01-31");
    }

    #[test]
    fn test_days_ago_is_in_the_past() {
        assert!(days_ago_ms(7) < now_ms());
    }
}
