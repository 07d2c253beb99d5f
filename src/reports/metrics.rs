//! Sum reduction and derived-metric formulas.
//!
//! The zero-denominator guards here are product-visible: the UI shows "0%"
//! where a naive division would produce NaN or Infinity, so every function
//! returns a finite value for every input.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Sums the amount the accessor yields for each row; absent amounts
/// contribute zero. Decimal addition is exact, so the result does not depend
/// on iteration order.
pub fn sum_by<T, F>(rows: &[T], amount: F) -> Decimal
where
    F: Fn(&T) -> Option<Decimal>,
{
    rows.iter()
        .fold(Decimal::ZERO, |acc, row| acc + amount(row).unwrap_or_default())
}

fn as_percent(ratio: Decimal) -> f64 {
    (ratio * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

/// Profit as a percentage of revenue; zero when there is no revenue.
pub fn profit_margin(revenue: Decimal, profit: Decimal) -> f64 {
    if revenue > Decimal::ZERO {
        as_percent(profit / revenue)
    } else {
        0.0
    }
}

/// Period-over-period change for strictly non-negative series (revenue,
/// expenses). Zero when the previous period had nothing to compare against.
pub fn percent_change(current: Decimal, previous: Decimal) -> f64 {
    if previous > Decimal::ZERO {
        as_percent((current - previous) / previous)
    } else {
        0.0
    }
}

/// Period-over-period change for series that can be negative (profit). The
/// denominator is `|previous|` so that moving from a loss toward break-even
/// reads as a positive change instead of flipping sign.
pub fn signed_percent_change(current: Decimal, previous: Decimal) -> f64 {
    if previous != Decimal::ZERO {
        as_percent((current - previous) / previous.abs())
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sum_treats_missing_amounts_as_zero() {
        let rows = vec![Some(dec!(10.50)), None, Some(dec!(4.25))];
        assert_eq!(sum_by(&rows, |r| *r), dec!(14.75));
    }

    #[test]
    fn sum_of_empty_list_is_zero() {
        let rows: Vec<Option<Decimal>> = Vec::new();
        assert_eq!(sum_by(&rows, |r| *r), Decimal::ZERO);
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        assert_eq!(profit_margin(Decimal::ZERO, dec!(250)), 0.0);
        assert_eq!(profit_margin(Decimal::ZERO, dec!(-250)), 0.0);
    }

    #[test]
    fn margin_of_profitable_month() {
        assert_eq!(profit_margin(dec!(100), dec!(80)), 80.0);
    }

    #[test]
    fn percent_change_guards_zero_previous() {
        assert_eq!(percent_change(dec!(500), Decimal::ZERO), 0.0);
    }

    #[test]
    fn percent_change_of_growing_revenue() {
        assert_eq!(percent_change(dec!(150), dec!(100)), 50.0);
        assert_eq!(percent_change(dec!(75), dec!(100)), -25.0);
    }

    #[test]
    fn profit_change_uses_absolute_previous() {
        // A shrinking loss is an improvement: -100 -> -50 is +50%.
        assert_eq!(signed_percent_change(dec!(-50), dec!(-100)), 50.0);
        // A growing loss is a deterioration.
        assert_eq!(signed_percent_change(dec!(-150), dec!(-100)), -50.0);
        // Crossing from loss to profit stays positive.
        assert_eq!(signed_percent_change(dec!(100), dec!(-100)), 200.0);
    }

    #[test]
    fn profit_change_guards_zero_previous() {
        assert_eq!(signed_percent_change(dec!(42), Decimal::ZERO), 0.0);
    }
}
