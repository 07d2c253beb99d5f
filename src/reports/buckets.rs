//! Grouping of dated rows into fixed calendar-month buckets.

use chrono::NaiveDate;

use super::period::{shifted_month_bounds, MonthBounds};
use crate::entities::{expense, sale};

/// Anything carrying a business date that can be sliced into month buckets.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for sale::Model {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for expense::Model {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// One calendar-month slice of a reporting window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    /// Short month name, e.g. "Jan"
    pub label: String,
    pub bounds: MonthBounds,
}

impl MonthBucket {
    /// Month name qualified with the year, e.g. "Jan 2026"
    pub fn label_with_year(&self) -> String {
        self.bounds.start.format("%b %Y").to_string()
    }

    /// Rows of `rows` whose date falls inside this bucket, in input order.
    pub fn slice<'a, T: Dated>(&self, rows: &'a [T]) -> Vec<&'a T> {
        rows.iter()
            .filter(|row| self.bounds.contains(row.date()))
            .collect()
    }
}

/// The `window_months` calendar months ending at the reference month,
/// oldest first. Buckets tile the window exactly: no gaps, no overlaps.
pub fn month_buckets(reference: NaiveDate, window_months: u32) -> Vec<MonthBucket> {
    (0..window_months)
        .rev()
        .map(|months_back| {
            let bounds = shifted_month_bounds(reference, months_back);
            MonthBucket {
                label: bounds.start.format("%b").to_string(),
                bounds,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn buckets_are_oldest_first_with_short_labels() {
        let buckets = month_buckets(date(2026, 2, 10), 6);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!(buckets[0].bounds.start, date(2025, 9, 1));
        assert_eq!(buckets[5].bounds.end, date(2026, 2, 28));
    }

    #[test]
    fn buckets_tile_the_window_without_gaps_or_overlaps() {
        let buckets = month_buckets(date(2026, 8, 31), 12);
        for pair in buckets.windows(2) {
            let next_day = pair[0].bounds.end.checked_add_days(Days::new(1)).unwrap();
            assert_eq!(next_day, pair[1].bounds.start);
        }
    }

    #[test]
    fn year_qualified_label() {
        let buckets = month_buckets(date(2026, 1, 5), 2);
        assert_eq!(buckets[0].label_with_year(), "Dec 2025");
        assert_eq!(buckets[1].label_with_year(), "Jan 2026");
    }
}
