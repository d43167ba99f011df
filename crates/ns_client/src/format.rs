use chrono::{DateTime, Utc};

/// `Just now`, `5m ago`, `3h ago`, `2d ago`, then an absolute date after 30 days.
/// Timestamps in the future read as `Just now`.
pub fn relative_date(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(published) = published else {
        return String::new();
    };
    let minutes = (now - published).num_seconds() / 60;
    match minutes {
        m if m < 1 => "Just now".to_string(),
        m if m < 60 => format!("{}m ago", m),
        m if m < 60 * 24 => format!("{}h ago", m / 60),
        m if m < 60 * 24 * 30 => format!("{}d ago", m / (60 * 24)),
        _ => absolute_date(published),
    }
}

/// `5 Mar 2024`
pub fn absolute_date(date: DateTime<Utc>) -> String {
    date.format("%-d %b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_buckets() {
        let at = |d: Duration| relative_date(Some(now() - d), now());
        assert_eq!(at(Duration::seconds(30)), "Just now");
        assert_eq!(at(Duration::minutes(5)), "5m ago");
        assert_eq!(at(Duration::minutes(59)), "59m ago");
        assert_eq!(at(Duration::minutes(60)), "1h ago");
        assert_eq!(at(Duration::hours(23)), "23h ago");
        assert_eq!(at(Duration::hours(49)), "2d ago");
        assert_eq!(at(Duration::days(29)), "29d ago");
        assert_eq!(at(Duration::days(30)), "10 Apr 2024");
    }

    #[test]
    fn test_future_and_missing() {
        assert_eq!(relative_date(Some(now() + Duration::hours(2)), now()), "Just now");
        assert_eq!(relative_date(None, now()), "");
    }

    #[test]
    fn test_absolute_date_has_no_padding() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(absolute_date(date), "5 Mar 2024");
    }
}
