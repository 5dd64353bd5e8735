//! Calendar-month arithmetic on timezone-free dates.

use chrono::{Datelike, NaiveDate};

/// Add a number of months to a date, clamping the day to the month's max.
///
/// Always computed from the given anchor, so stepping an end-of-month date
/// recovers the original day once the target month is long enough
/// (Jan 31 + 1 = Feb 28, Jan 31 + 2 = Mar 31). `None` when the result falls
/// outside the representable date range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total_months =
        i64::from(date.year()) * 12 + i64::from(date.month()) - 1 + i64::from(months);
    let new_year = i32::try_from(total_months.div_euclid(12)).ok()?;
    let new_month = (total_months.rem_euclid(12) + 1) as u32;
    let day = date.day().min(days_in_month(new_year, new_month));
    NaiveDate::from_ymd_opt(new_year, new_month, day)
}

/// Number of days in a given month/year.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_add_zero_months_is_identity() {
        assert_eq!(add_months(d(2025, 3, 15), 0), Some(d(2025, 3, 15)));
    }

    #[test]
    fn test_end_of_month_clamps_then_recovers() {
        let anchor = d(2025, 1, 31);
        assert_eq!(add_months(anchor, 1), Some(d(2025, 2, 28)));
        assert_eq!(add_months(anchor, 2), Some(d(2025, 3, 31)));
        assert_eq!(add_months(anchor, 3), Some(d(2025, 4, 30)));
    }

    #[test]
    fn test_leap_february() {
        assert_eq!(add_months(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
        assert_eq!(add_months(d(2024, 1, 30), 1), Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_year_rollover() {
        assert_eq!(add_months(d(2025, 11, 15), 3), Some(d(2026, 2, 15)));
        assert_eq!(add_months(d(2025, 12, 31), 14), Some(d(2027, 2, 28)));
    }

    #[test]
    fn test_beyond_date_range_is_none() {
        assert_eq!(add_months(NaiveDate::MAX, 1), None);
        assert_eq!(add_months(d(2025, 1, 31), u32::MAX), None);
    }

    #[test]
    fn test_leap_year_rules() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2025));
    }
}
