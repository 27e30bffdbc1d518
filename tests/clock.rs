#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Timelike, Utc};
    use fieldbook::libs::clock::{format_timestamp, is_storable, Clock, FixedClock, SystemClock};

    #[test]
    fn test_system_clock_strictly_increases() {
        let clock = SystemClock::new();
        let mut last = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_system_clock_has_microsecond_precision() {
        let now = SystemClock::new().now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_fixed_clock_ticks_one_microsecond() {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        let clock = FixedClock::at(start);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + TimeDelta::microseconds(1));

        clock.advance(TimeDelta::hours(1));
        assert_eq!(clock.now(), start + TimeDelta::hours(1) + TimeDelta::microseconds(2));
    }

    #[test]
    fn test_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(&whole), "2025-01-15T09:30:00.000000Z");

        let fractional = whole + TimeDelta::microseconds(42);
        assert_eq!(format_timestamp(&fractional), "2025-01-15T09:30:00.000042Z");
        assert_eq!(format_timestamp(&whole).len(), format_timestamp(&fractional).len());
        assert!(format_timestamp(&whole) < format_timestamp(&fractional));
    }

    #[test]
    fn test_storable_range_is_four_digit_years() {
        assert!(is_storable(&Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap()));
        assert!(is_storable(&Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()));
        assert!(!is_storable(&Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap()));
        assert!(!is_storable(&Utc.with_ymd_and_hms(-1, 12, 31, 0, 0, 0).unwrap()));
    }
}
