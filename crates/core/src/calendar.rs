//! Fire season calendar
//!
//! Season rows are keyed by julian day. Day offset 0 is julian day 121 (May 1 in a common
//! year) and the last recorded offset is 152, julian day 273 (Sep 30).

/// First julian day recorded in a season.
pub const SEASON_START_JULIAN: u16 = 121;

/// Last julian day recorded in a season.
pub const SEASON_END_JULIAN: u16 = 273;

/// Number of day slots held per cell.
pub const SEASON_DAYS: usize = 154;

/// Cumulative days before each month, common year.
const MONTH_STARTS: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Cumulative days before each month, leap year.
const MONTH_STARTS_LEAP: [u16; 12] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// Gregorian leap-year test.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Convert a julian day to `(month, day_of_month)`, both 1-based.
///
/// Days past the end of the year land in December.
pub fn month_day(year: i32, julian_day: u16) -> (u8, u8) {
    let starts = if is_leap_year(year) {
        &MONTH_STARTS_LEAP
    } else {
        &MONTH_STARTS
    };
    let month = starts
        .iter()
        .rposition(|&start| julian_day > start)
        .unwrap_or(0);
    (month as u8 + 1, (julian_day - starts[month]) as u8)
}

/// Day offset from season start, or `None` when the julian day is not recorded.
pub fn season_offset(julian_day: i64) -> Option<usize> {
    if (i64::from(SEASON_START_JULIAN)..=i64::from(SEASON_END_JULIAN)).contains(&julian_day) {
        Some((julian_day - i64::from(SEASON_START_JULIAN)) as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_bounds_map_to_may_first_and_september_last() {
        assert_eq!(month_day(2019, SEASON_START_JULIAN), (5, 1));
        assert_eq!(month_day(2019, SEASON_END_JULIAN), (9, 30));
        // Leap years shift by one day
        assert_eq!(month_day(2020, SEASON_START_JULIAN), (4, 30));
        assert_eq!(month_day(2020, 122), (5, 1));
    }

    #[test]
    fn year_edges() {
        assert_eq!(month_day(2019, 1), (1, 1));
        assert_eq!(month_day(2019, 31), (1, 31));
        assert_eq!(month_day(2019, 32), (2, 1));
        assert_eq!(month_day(2019, 365), (12, 31));
        assert_eq!(month_day(2020, 366), (12, 31));
    }

    #[test]
    fn leap_rules() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2016));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2019));
    }

    #[test]
    fn offsets_cover_only_the_season() {
        assert_eq!(season_offset(120), None);
        assert_eq!(season_offset(121), Some(0));
        assert_eq!(season_offset(273), Some(152));
        assert_eq!(season_offset(274), None);
    }
}
