use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

/// Author-local clock position derived from a UTC timestamp and a fixed
/// hour offset. The offset is applied by hand, with an explicit day
/// carry, so a resolver fallback (offset only, no IANA zone) classifies
/// the same way as a configured teammate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    pub hour: u32,
    pub weekday: Weekday,
}

pub fn local_clock(at: DateTime<Utc>, tz_offset_hours: i32) -> LocalClock {
    let shifted = at.hour() as i32 + tz_offset_hours;
    let hour = shifted.rem_euclid(24) as u32;

    // Offsets stay within a day (±14h in practice), so the carry is at
    // most one day in either direction.
    let carry = if shifted < 0 {
        -1
    } else if shifted >= 24 {
        1
    } else {
        0
    };
    let weekday_index =
        (at.weekday().num_days_from_monday() as i32 + carry).rem_euclid(7) as u32;

    LocalClock {
        hour,
        weekday: weekday_from_index(weekday_index),
    }
}

/// Late-night window: 21:00 through 05:59 local.
pub fn is_late_night(hour: u32) -> bool {
    hour >= 21 || hour < 6
}

pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

fn weekday_from_index(index: u32) -> Weekday {
    match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn negative_offset_crosses_into_previous_day() {
        // Monday 02:00 UTC at UTC-8 is Sunday 18:00 local.
        let clock = local_clock(utc(2024, 3, 4, 2, 0), -8);
        assert_eq!(clock.hour, 18);
        assert_eq!(clock.weekday, Weekday::Sun);
    }

    #[test]
    fn positive_offset_crosses_into_next_day() {
        // Sunday 23:00 UTC at UTC+5 is Monday 04:00 local.
        let clock = local_clock(utc(2024, 3, 3, 23, 0), 5);
        assert_eq!(clock.hour, 4);
        assert_eq!(clock.weekday, Weekday::Mon);
    }

    #[test]
    fn zero_offset_is_identity() {
        let clock = local_clock(utc(2024, 3, 6, 13, 30), 0);
        assert_eq!(clock.hour, 13);
        assert_eq!(clock.weekday, Weekday::Wed);
    }

    #[test]
    fn late_night_window_wraps_midnight() {
        assert!(is_late_night(21));
        assert!(is_late_night(23));
        assert!(is_late_night(0));
        assert!(is_late_night(5));
        assert!(!is_late_night(6));
        assert!(!is_late_night(20));
        assert!(!is_late_night(12));
    }

    #[test]
    fn weekend_is_saturday_and_sunday() {
        assert!(is_weekend(Weekday::Sat));
        assert!(is_weekend(Weekday::Sun));
        assert!(!is_weekend(Weekday::Fri));
        assert!(!is_weekend(Weekday::Mon));
    }

    #[test]
    fn weekend_boundary_depends_on_local_day() {
        // Saturday 01:00 UTC at UTC-2 is still Friday 23:00 local:
        // late night, but not a weekend commit.
        let clock = local_clock(utc(2024, 3, 9, 1, 0), -2);
        assert_eq!(clock.weekday, Weekday::Fri);
        assert!(is_late_night(clock.hour));
        assert!(!is_weekend(clock.weekday));
    }
}
