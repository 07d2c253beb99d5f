//! Property-based tests for the aggregation core.
//!
//! These verify the invariants the dashboard relies on across a wide range
//! of generated inputs: finite derived metrics, conservation of sums under
//! bucketing and category grouping, and feed-merge bounds.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use negocio_api::entities::{category, category::CategoryKind, expense, sale};
use negocio_api::reports::{
    expenses_by_category, merge_recent, month_buckets, percent_change, profit_margin,
    signed_percent_change, sum_by, UNCATEGORIZED_LABEL,
};

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn sale_row(on: NaiveDate, amount: Decimal) -> sale::Model {
    sale::Model {
        id: Uuid::new_v4(),
        date: on,
        total_amount: amount,
        total_cost: Decimal::ZERO,
        profit: amount,
        channel: None,
        payment_method: None,
        customer_name: None,
        notes: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        updated_at: None,
    }
}

fn expense_row(amount: Decimal, category_id: Option<Uuid>, second: u32) -> expense::Model {
    expense::Model {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        amount,
        category_id,
        supplier: None,
        description: None,
        payment_method: None,
        receipt_url: None,
        is_recurring: false,
        tax_amount: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, second).unwrap(),
        updated_at: None,
    }
}

// A date inside the 12-month window ending August 2026. Days stop at 28 so
// every generated (month, day) pair exists.
fn window_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u32..12, 1u32..=28).prop_map(|(months_back, day)| {
        let reference = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        let start = negocio_api::reports::shifted_month_bounds(reference, months_back).start;
        start.with_day(day).unwrap_or(start)
    })
}

proptest! {
    #[test]
    fn derived_metrics_are_always_finite(
        current in -1_000_000_00i64..1_000_000_00,
        previous in -1_000_000_00i64..1_000_000_00,
    ) {
        let current = cents(current);
        let previous = cents(previous);
        prop_assert!(profit_margin(previous, current).is_finite());
        prop_assert!(percent_change(current, previous).is_finite());
        prop_assert!(signed_percent_change(current, previous).is_finite());
    }

    #[test]
    fn margin_is_zero_whenever_revenue_is_not_positive(
        revenue in -1_000_000_00i64..=0,
        profit in -1_000_000_00i64..1_000_000_00,
    ) {
        prop_assert_eq!(profit_margin(cents(revenue), cents(profit)), 0.0);
    }

    #[test]
    fn profit_change_sign_tracks_the_difference(
        current in -1_000_000i64..1_000_000,
        previous in -1_000_000i64..1_000_000,
    ) {
        prop_assume!(previous != 0);
        let change = signed_percent_change(Decimal::from(current), Decimal::from(previous));
        let diff = current - previous;
        if diff > 0 {
            prop_assert!(change > 0.0);
        } else if diff < 0 {
            prop_assert!(change < 0.0);
        } else {
            prop_assert_eq!(change, 0.0);
        }
    }

    #[test]
    fn bucketed_sums_conserve_the_total(
        rows in prop::collection::vec((window_date_strategy(), 0i64..1_000_000), 0..60),
    ) {
        let sales: Vec<sale::Model> = rows
            .iter()
            .map(|(date, amount)| sale_row(*date, cents(*amount)))
            .collect();

        let reference = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        let buckets = month_buckets(reference, 12);

        let bucketed: Decimal = buckets
            .iter()
            .map(|bucket| sum_by(&bucket.slice(&sales), |s| Some(s.total_amount)))
            .sum();
        let total: Decimal = sum_by(&sales, |s| Some(s.total_amount));

        prop_assert_eq!(bucketed, total);

        // And each row lands in exactly one bucket.
        for sale in &sales {
            let holding = buckets.iter().filter(|b| b.bounds.contains(sale.date)).count();
            prop_assert_eq!(holding, 1);
        }
    }

    #[test]
    fn category_grouping_conserves_the_total(
        rows in prop::collection::vec((0u8..4, 0i64..1_000_000), 0..40),
    ) {
        // Three known categories plus the uncategorized sentinel.
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let categories: HashMap<Uuid, category::Model> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                (*id, category::Model {
                    id: *id,
                    name: format!("Category {}", i),
                    kind: CategoryKind::Expense,
                    color: None,
                    is_system: false,
                    created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                })
            })
            .collect();

        let expenses: Vec<expense::Model> = rows
            .iter()
            .enumerate()
            .map(|(i, (slot, amount))| {
                let category_id = ids.get(*slot as usize).copied();
                expense_row(cents(*amount), category_id, i as u32 % 60)
            })
            .collect();

        let slices = expenses_by_category(&expenses, &categories);

        let grouped: Decimal = slices.iter().map(|s| s.amount).sum();
        let total: Decimal = expenses.iter().map(|e| e.amount).sum();
        prop_assert_eq!(grouped, total);

        // Every uncategorized peso is accounted for under the sentinel.
        let uncategorized_total: Decimal = expenses
            .iter()
            .filter(|e| e.category_id.is_none())
            .map(|e| e.amount)
            .sum();
        let sentinel = slices.iter().find(|s| s.category == UNCATEGORIZED_LABEL);
        match sentinel {
            Some(slice) => prop_assert_eq!(slice.amount, uncategorized_total),
            None => prop_assert_eq!(uncategorized_total, Decimal::ZERO),
        }
    }

    #[test]
    fn merged_feed_is_bounded_sorted_and_complete(
        sale_count in 0usize..6,
        expense_count in 0usize..6,
    ) {
        let sales: Vec<sale::Model> = (0..sale_count)
            .map(|i| {
                let mut s = sale_row(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(), cents(100));
                s.created_at = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, i as u32).unwrap();
                s
            })
            .collect();
        let expenses: Vec<(expense::Model, Option<category::Model>)> = (0..expense_count)
            .map(|i| (expense_row(cents(50), None, 30 + i as u32), None))
            .collect();

        let feed = merge_recent(&sales, &expenses, 5);

        prop_assert_eq!(feed.len(), (sale_count + expense_count).min(5));
        for pair in feed.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}
