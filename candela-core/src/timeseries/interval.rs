//! Interval durations and bucket alignment in millisecond UNIX time.

/// One minute in milliseconds.
const MINUTE_MS: i64 = 60_000;
/// One hour in milliseconds.
const HOUR_MS: i64 = 60 * MINUTE_MS;
/// One UTC day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;
/// Eight hours in milliseconds.
pub const H8_MS: i64 = 8 * HOUR_MS;

/// Duration of a named timeframe in milliseconds, or `None` for names the
/// pipeline does not know.
#[must_use]
pub fn interval_duration_ms(name: &str) -> Option<i64> {
    let ms = match name.to_ascii_lowercase().as_str() {
        "1m" => MINUTE_MS,
        "3m" => 3 * MINUTE_MS,
        "5m" => 5 * MINUTE_MS,
        "15m" => 15 * MINUTE_MS,
        "30m" => 30 * MINUTE_MS,
        "1h" => HOUR_MS,
        "2h" => 2 * HOUR_MS,
        "4h" => 4 * HOUR_MS,
        "6h" => 6 * HOUR_MS,
        "8h" => H8_MS,
        "12h" => 12 * HOUR_MS,
        "1d" => DAY_MS,
        "3d" => 3 * DAY_MS,
        "1w" => 7 * DAY_MS,
        _ => return None,
    };
    Some(ms)
}

/// Floor a timestamp to the start of its interval bucket.
#[must_use]
pub const fn normalize_to_open_time(timestamp: i64, interval_ms: i64) -> i64 {
    timestamp.div_euclid(interval_ms) * interval_ms
}

/// Align a timestamp to the UTC boundary grid of a target interval.
///
/// Daily targets land on UTC midnight. Eight-hour targets land on
/// 00:00/08:00/16:00 UTC, derived from the start of the UTC day rather than
/// an epoch-relative offset. Everything else is a plain floor to the
/// interval.
#[must_use]
pub const fn align_to_utc_boundary(timestamp: i64, target_interval_ms: i64) -> i64 {
    if target_interval_ms == DAY_MS {
        normalize_to_open_time(timestamp, DAY_MS)
    } else if target_interval_ms == H8_MS {
        let utc_day_start = normalize_to_open_time(timestamp, DAY_MS);
        let offset_in_day = timestamp - utc_day_start;
        utc_day_start + (offset_in_day / H8_MS) * H8_MS
    } else {
        normalize_to_open_time(timestamp, target_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_intervals_resolve() {
        assert_eq!(interval_duration_ms("4h"), Some(14_400_000));
        assert_eq!(interval_duration_ms("8H"), Some(28_800_000));
        assert_eq!(interval_duration_ms("1d"), Some(86_400_000));
        assert_eq!(interval_duration_ms("7h"), None);
        assert_eq!(interval_duration_ms(""), None);
    }

    #[test]
    fn daily_alignment_is_utc_midnight() {
        // 2024-01-15T13:37:00Z
        let ts = 1_705_325_820_000;
        let aligned = align_to_utc_boundary(ts, DAY_MS);
        assert_eq!(aligned % DAY_MS, 0);
        assert!(aligned <= ts && ts - aligned < DAY_MS);
    }

    #[test]
    fn eight_hour_alignment_falls_on_day_thirds() {
        let day = normalize_to_open_time(1_705_325_820_000, DAY_MS);
        for (offset, expected_slot) in [
            (0, 0),
            (H8_MS - 1, 0),
            (H8_MS, H8_MS),
            (2 * H8_MS + 123, 2 * H8_MS),
        ] {
            assert_eq!(
                align_to_utc_boundary(day + offset, H8_MS),
                day + expected_slot
            );
        }
    }
}
