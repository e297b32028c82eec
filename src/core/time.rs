use chrono::{DateTime, Duration, Utc};

/// Display offset for absolute timestamps: IST (+05:30).
const IST_OFFSET_SECONDS: i64 = 5 * 3600 + 1800;

pub fn now_utc() -> DateTime<Utc> {
    if let Ok(value) = std::env::var("SENTINEL_FIXED_TIME") {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return dt.with_timezone(&Utc);
        }
    }
    Utc::now()
}

/// Render an RFC 3339 timestamp for display in IST. Callers print the result
/// directly, so malformed input degrades to a sentinel string instead of an
/// error.
pub fn format_timestamp(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => {
            let ist = dt.with_timezone(&Utc) + Duration::seconds(IST_OFFSET_SECONDS);
            ist.format("%d %b %Y, %I:%M:%S %p IST").to_string()
        }
        Err(_) => "Invalid date".to_string(),
    }
}

/// Render a "5 minutes ago"-style string relative to wall-clock now. Same
/// sentinel policy as `format_timestamp`.
pub fn format_relative_time(value: &str) -> String {
    let dt = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => return "Unknown time".to_string(),
    };
    let delta = now_utc().signed_duration_since(dt);
    if delta < Duration::zero() {
        format!("in {}", human_duration(-delta))
    } else {
        format!("{} ago", human_duration(delta))
    }
}

fn human_duration(d: Duration) -> String {
    let secs = d.num_seconds();
    if secs < 45 {
        "less than a minute".to_string()
    } else if secs < 90 {
        "a minute".to_string()
    } else if secs < 45 * 60 {
        format!("{} minutes", (secs + 30) / 60)
    } else if secs < 90 * 60 {
        "about an hour".to_string()
    } else if secs < 24 * 3600 {
        format!("about {} hours", (secs + 1800) / 3600)
    } else if secs < 48 * 3600 {
        "a day".to_string()
    } else {
        format!("{} days", secs / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_timestamp_applies_ist_offset() {
        let out = format_timestamp("2025-01-02T00:00:00Z");
        assert_eq!(out, "02 Jan 2025, 05:30:00 AM IST");
    }

    #[test]
    fn format_timestamp_rejects_garbage() {
        assert_eq!(format_timestamp("not-a-date"), "Invalid date");
        assert_eq!(format_timestamp(""), "Invalid date");
    }

    #[test]
    fn format_relative_time_rejects_garbage() {
        assert_eq!(format_relative_time("not-a-date"), "Unknown time");
    }

    #[test]
    fn format_relative_time_reports_minutes() {
        let five_ago = (Utc::now() - Duration::minutes(5)).to_rfc3339();
        assert_eq!(format_relative_time(&five_ago), "5 minutes ago");
    }

    #[test]
    fn human_duration_buckets() {
        assert_eq!(human_duration(Duration::seconds(10)), "less than a minute");
        assert_eq!(human_duration(Duration::seconds(60)), "a minute");
        assert_eq!(human_duration(Duration::minutes(10)), "10 minutes");
        assert_eq!(human_duration(Duration::hours(3)), "about 3 hours");
        assert_eq!(human_duration(Duration::days(3)), "3 days");
    }
}
