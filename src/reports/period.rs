//! Calendar-month boundary arithmetic for reporting windows.

use chrono::{Datelike, Months, NaiveDate};

/// First and last calendar day of a month, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthBounds {
    /// Inclusive containment check. `NaiveDate` ordering matches the
    /// lexicographic ordering of zero-padded `YYYY-MM-DD` strings, so this
    /// is exactly the string-range filter the store applies on its side.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn first_of_month(reference: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    reference.with_day(1).unwrap_or(reference)
}

/// Bounds of the month `months_back` whole months before the reference
/// month. Anchors to day 1 before shifting, so a reference on the 31st never
/// lands on a day that does not exist in the target month. Year rollover is
/// plain calendar arithmetic (January minus one month is December of the
/// prior year).
pub fn shifted_month_bounds(reference: NaiveDate, months_back: u32) -> MonthBounds {
    let anchor = first_of_month(reference);
    let start = anchor
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(anchor);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start);
    MonthBounds { start, end }
}

/// Bounds of the reference date's own month.
pub fn month_bounds(reference: NaiveDate) -> MonthBounds {
    shifted_month_bounds(reference, 0)
}

/// First day of the oldest month in a rolling window of `window_months`
/// months ending at the reference month. A window of 1 starts at the current
/// month itself.
pub fn window_start(reference: NaiveDate, window_months: u32) -> NaiveDate {
    shifted_month_bounds(reference, window_months.saturating_sub(1)).start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn current_month_bounds_cover_whole_month() {
        let bounds = month_bounds(date(2026, 1, 15));
        assert_eq!(bounds.start, date(2026, 1, 1));
        assert_eq!(bounds.end, date(2026, 1, 31));
    }

    #[test]
    fn previous_month_rolls_over_year_boundary() {
        let bounds = shifted_month_bounds(date(2026, 1, 15), 1);
        assert_eq!(bounds.start, date(2025, 12, 1));
        assert_eq!(bounds.end, date(2025, 12, 31));
    }

    #[test]
    fn day_of_month_is_never_carried_into_shorter_months() {
        // Shifting from March 31st back one month must land in all of
        // February, not on a clamped or invalid day.
        let bounds = shifted_month_bounds(date(2026, 3, 31), 1);
        assert_eq!(bounds.start, date(2026, 2, 1));
        assert_eq!(bounds.end, date(2026, 2, 28));
    }

    #[test]
    fn leap_year_february_ends_on_the_29th() {
        let bounds = shifted_month_bounds(date(2028, 3, 15), 1);
        assert_eq!(bounds.end, date(2028, 2, 29));
    }

    #[test]
    fn window_start_is_first_day_of_oldest_month() {
        assert_eq!(window_start(date(2026, 8, 7), 6), date(2026, 3, 1));
        // Crossing the year boundary.
        assert_eq!(window_start(date(2026, 3, 10), 12), date(2025, 4, 1));
        // A one-month window is just the current month.
        assert_eq!(window_start(date(2026, 8, 7), 1), date(2026, 8, 1));
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let bounds = month_bounds(date(2026, 6, 10));
        assert!(bounds.contains(date(2026, 6, 1)));
        assert!(bounds.contains(date(2026, 6, 30)));
        assert!(!bounds.contains(date(2026, 5, 31)));
        assert!(!bounds.contains(date(2026, 7, 1)));
    }
}
