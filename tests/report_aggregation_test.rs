//! End-to-end tests of the aggregation pipeline over in-memory row sets:
//! fetched rows in, view models out, no database involved.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use negocio_api::entities::{category, category::CategoryKind, expense, product, sale, sale_item};
use negocio_api::services::dashboard::{build_dashboard, DashboardSource};
use negocio_api::services::reports::{build_report, ReportSource};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sale(on: NaiveDate, amount: Decimal, cost: Decimal, minute: u32) -> sale::Model {
    sale::Model {
        id: Uuid::new_v4(),
        date: on,
        total_amount: amount,
        total_cost: cost,
        profit: amount - cost,
        channel: Some("Store".to_string()),
        payment_method: None,
        customer_name: None,
        notes: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap(),
        updated_at: None,
    }
}

fn expense(on: NaiveDate, amount: Decimal, category_id: Option<Uuid>, minute: u32) -> expense::Model {
    expense::Model {
        id: Uuid::new_v4(),
        date: on,
        amount,
        category_id,
        supplier: None,
        description: None,
        payment_method: None,
        receipt_url: None,
        is_recurring: false,
        tax_amount: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap(),
        updated_at: None,
    }
}

fn category(id: Uuid, name: &str, color: Option<&str>) -> category::Model {
    category::Model {
        id,
        name: name.to_string(),
        kind: CategoryKind::Expense,
        color: color.map(str::to_string),
        is_system: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn product(id: Uuid, name: &str) -> product::Model {
    product::Model {
        id,
        name: name.to_string(),
        sku: None,
        cost_price: dec!(1),
        sale_price: dec!(2),
        category_id: None,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        updated_at: None,
    }
}

fn item(product_id: Uuid, quantity: Decimal, unit_price: Decimal, unit_cost: Decimal) -> sale_item::Model {
    sale_item::Model {
        id: Uuid::new_v4(),
        sale_id: Uuid::new_v4(),
        product_id,
        quantity,
        unit_price,
        unit_cost,
        discount: Decimal::ZERO,
        subtotal: quantity * unit_price,
    }
}

#[test]
fn one_month_window_example_from_january() {
    // One sale and one categorized expense in January 2026.
    let rent_id = Uuid::new_v4();
    let source = DashboardSource {
        sales: vec![sale(date(2026, 1, 5), dec!(100), dec!(40), 0)],
        expenses: vec![expense(date(2026, 1, 10), dec!(20), Some(rent_id), 1)],
        categories: HashMap::from([(rent_id, category(rent_id, "Rent", None))]),
        ..Default::default()
    };

    let view = build_dashboard(date(2026, 1, 20), &source);

    let january = view.monthly_data.last().unwrap();
    assert_eq!(january.month, "Jan");
    assert_eq!(january.revenue, dec!(100));
    assert_eq!(january.expenses, dec!(20));
    assert_eq!(january.profit, dec!(80));
    assert_eq!(view.stats.profit_margin, 80.0);

    assert_eq!(view.expenses_by_category.len(), 1);
    assert_eq!(view.expenses_by_category[0].category, "Rent");
}

#[test]
fn zero_previous_revenue_never_produces_infinity() {
    // Previous month empty, current month 500: the delta is the guarded 0.
    let source = DashboardSource {
        sales: vec![sale(date(2026, 1, 5), dec!(500), dec!(100), 0)],
        ..Default::default()
    };

    let view = build_dashboard(date(2026, 1, 20), &source);

    assert_eq!(view.stats.revenue_change, 0.0);
    assert!(view.stats.revenue_change.is_finite());
    assert!(view.stats.profit_change.is_finite());
    assert!(view.stats.profit_margin.is_finite());
}

#[test]
fn bucketed_sums_equal_the_unbucketed_total() {
    // Rows spread over the whole 6-month window, including both boundary
    // days of the oldest and newest months.
    let sales = vec![
        sale(date(2025, 8, 1), dec!(10), dec!(1), 0),
        sale(date(2025, 9, 30), dec!(20), dec!(2), 1),
        sale(date(2025, 11, 15), dec!(30), dec!(3), 2),
        sale(date(2026, 1, 1), dec!(40), dec!(4), 3),
        sale(date(2026, 1, 31), dec!(50), dec!(5), 4),
    ];
    let source = DashboardSource {
        sales,
        ..Default::default()
    };

    let view = build_dashboard(date(2026, 1, 31), &source);

    let bucketed: Decimal = view.monthly_data.iter().map(|m| m.revenue).sum();
    let total: Decimal = source.sales.iter().map(|s| s.total_amount).sum();
    assert_eq!(bucketed, total);
}

#[test]
fn dashboard_and_report_agree_on_the_current_month() {
    let rent_id = Uuid::new_v4();
    let sales = vec![
        sale(date(2025, 12, 12), dec!(700), dec!(300), 0),
        sale(date(2026, 1, 5), dec!(1000), dec!(400), 1),
    ];
    let expenses = vec![
        expense(date(2025, 12, 20), dec!(100), Some(rent_id), 2),
        expense(date(2026, 1, 10), dec!(250), Some(rent_id), 3),
    ];
    let categories = HashMap::from([(rent_id, category(rent_id, "Rent", Some("#EF4444")))]);

    let dashboard = build_dashboard(
        date(2026, 1, 20),
        &DashboardSource {
            sales: sales.clone(),
            expenses: expenses.clone(),
            categories: categories.clone(),
            ..Default::default()
        },
    );
    let report = build_report(
        date(2026, 1, 20),
        &ReportSource {
            sales,
            expenses,
            categories,
            ..Default::default()
        },
    );

    let report_january = report.months.last().unwrap();
    assert_eq!(report_january.month, "Jan 2026");
    assert_eq!(report_january.revenue, dashboard.stats.total_revenue);
    assert_eq!(
        report_january.operating_expenses,
        dashboard.stats.total_expenses
    );

    // The report's P&L identities.
    assert_eq!(report_january.gross_profit, dec!(600));
    assert_eq!(report_january.net_profit, dec!(350));
    assert_eq!(report_january.cash_out, dec!(650));
    assert_eq!(
        report_january.net_cash_flow,
        report_january.cash_in - report_january.cash_out
    );

    // Both breakdowns aggregate the same current-month slice; the report's
    // is additionally ranked by amount.
    assert_eq!(report.expense_breakdown.len(), 1);
    assert_eq!(
        report.expense_breakdown[0].amount,
        dashboard.expenses_by_category[0].amount
    );
}

#[test]
fn top_products_are_a_prefix_of_the_full_ranking() {
    // Seven products with distinct revenues; the dashboard's top five must
    // be the first five of the report's full ranking.
    let ids: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
    let products: HashMap<Uuid, product::Model> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, product(*id, &format!("Product {}", i))))
        .collect();
    let items: Vec<sale_item::Model> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| item(*id, dec!(1), Decimal::from((i as u32 + 1) * 10), dec!(2)))
        .collect();

    let dashboard = build_dashboard(
        date(2026, 1, 20),
        &DashboardSource {
            month_items: items.clone(),
            products: products.clone(),
            ..Default::default()
        },
    );
    let report = build_report(
        date(2026, 1, 20),
        &ReportSource {
            sale_items: items,
            products,
            ..Default::default()
        },
    );

    assert_eq!(dashboard.top_products.len(), 5);
    assert_eq!(report.products.len(), 7);
    for (top, full) in dashboard.top_products.iter().zip(report.products.iter()) {
        assert_eq!(top.id, full.id);
        assert_eq!(top.revenue, full.revenue);
    }
    // Highest revenue first.
    assert_eq!(report.products[0].revenue, dec!(70));
}

#[test]
fn recent_feed_takes_the_newest_five_across_both_sources() {
    let sales: Vec<sale::Model> = (0..5)
        .map(|i| sale(date(2026, 1, 10), dec!(100), dec!(40), 10 + i))
        .collect();
    let expenses: Vec<(expense::Model, Option<category::Model>)> = (0..5)
        .map(|i| (expense(date(2026, 1, 10), dec!(50), None, 13 + i), None))
        .collect();

    let view = build_dashboard(
        date(2026, 1, 20),
        &DashboardSource {
            recent_sales: sales,
            recent_expenses: expenses,
            ..Default::default()
        },
    );

    assert_eq!(view.recent_transactions.len(), 5);
    for pair in view.recent_transactions.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}
