use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time as fixed-width ISO-8601 with microseconds,
/// e.g. `2024-03-01T09:15:02.123456Z`. Lexicographic order equals time order.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_width_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 2).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-01T09:15:02.000000Z");
    }

    #[test]
    fn test_string_order_matches_time_order() {
        let earlier = format_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 9, 59, 59).unwrap());
        let later = format_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        assert!(earlier < later);
        assert!(now_timestamp() > later);
    }
}
