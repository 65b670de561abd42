use chrono::{DateTime, Duration, FixedOffset, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("valid JST offset")
}

/// Calendar-day window ending at `now_utc`. Five calendar days are enough to
/// span a weekend plus a holiday and still contain two trading-day rows.
pub fn lookback_window(now_utc: DateTime<Utc>, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    (now_utc - Duration::days(days), now_utc)
}

/// Timestamp suffix appended to every post body, rendered in JST.
pub fn format_post_timestamp(now_utc: DateTime<Utc>) -> String {
    now_utc
        .with_timezone(&jst())
        .format("%m月%d日 %H時%M分")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_timestamp_in_jst() {
        // 2026-08-06 23:30 UTC is 2026-08-07 08:30 JST.
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 23, 30, 0).unwrap();
        assert_eq!(format_post_timestamp(now), "08月07日 08時30分");
    }

    #[test]
    fn formats_timestamp_zero_padded() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 0, 5, 0).unwrap();
        assert_eq!(format_post_timestamp(now), "01月05日 09時05分");
    }

    #[test]
    fn lookback_window_spans_requested_days() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        let (start, end) = lookback_window(now, 5);
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(5));
    }
}
