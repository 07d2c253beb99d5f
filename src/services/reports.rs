use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{category, expense, product, sale, sale_item},
    reports::{breakdown, metrics, month_buckets, month_bounds, period, CategorySlice},
};

/// Months covered by the P&L and cash-flow tables
const REPORT_WINDOW_MONTHS: u32 = 12;

/// One month of the profit & loss / cash-flow report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyReportRow {
    /// Month with year, e.g. "Jan 2026"
    pub month: String,
    /// Short month name for chart axes, e.g. "Jan"
    pub month_short: String,
    pub revenue: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    pub operating_expenses: Decimal,
    pub net_profit: Decimal,
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub net_cash_flow: Decimal,
}

/// All-time sales performance of one product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPerformance {
    pub id: Uuid,
    pub name: String,
    pub total_sold: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin: f64,
}

/// Everything the reports page renders
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportView {
    pub months: Vec<MonthlyReportRow>,
    pub products: Vec<ProductPerformance>,
    /// Current-month expenses by category, largest first
    pub expense_breakdown: Vec<CategorySlice>,
}

/// Row sets one report render works from
#[derive(Debug, Default)]
pub struct ReportSource {
    /// Sales of the report window, oldest first
    pub sales: Vec<sale::Model>,
    /// Expenses of the report window, oldest first
    pub expenses: Vec<expense::Model>,
    /// Every sale line item on record (product performance is all-time)
    pub sale_items: Vec<sale_item::Model>,
    pub products: HashMap<Uuid, product::Model>,
    pub categories: HashMap<Uuid, category::Model>,
}

/// Service assembling the financial report view model
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Builds the 12-month financial report. Like the dashboard, store reads
    /// degrade to empty row sets rather than failing the render.
    #[instrument(skip(self))]
    pub async fn get_report(&self) -> ReportView {
        let today = Utc::now().date_naive();
        let source = self.fetch(today).await;
        build_report(today, &source)
    }

    async fn fetch(&self, today: NaiveDate) -> ReportSource {
        let window_start = period::window_start(today, REPORT_WINDOW_MONTHS);

        let (sales, expenses, sale_items, products, categories) = tokio::join!(
            self.sales_since(window_start),
            self.expenses_since(window_start),
            self.all_sale_items(),
            self.product_index(),
            self.category_index(),
        );

        ReportSource {
            sales,
            expenses,
            sale_items,
            products,
            categories,
        }
    }

    async fn sales_since(&self, start: NaiveDate) -> Vec<sale::Model> {
        sale::Entity::find()
            .filter(sale::Column::Date.gte(start))
            .order_by_asc(sale::Column::Date)
            .all(&*self.db)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "sales query failed; report will render without sales");
                Vec::new()
            })
    }

    async fn expenses_since(&self, start: NaiveDate) -> Vec<expense::Model> {
        expense::Entity::find()
            .filter(expense::Column::Date.gte(start))
            .order_by_asc(expense::Column::Date)
            .all(&*self.db)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "expenses query failed; report will render without expenses");
                Vec::new()
            })
    }

    async fn all_sale_items(&self) -> Vec<sale_item::Model> {
        sale_item::Entity::find()
            .all(&*self.db)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "sale items query failed; report will render without product stats");
                Vec::new()
            })
    }

    async fn product_index(&self) -> HashMap<Uuid, product::Model> {
        product::Entity::find()
            .all(&*self.db)
            .await
            .map(|rows| rows.into_iter().map(|p| (p.id, p)).collect())
            .unwrap_or_else(|err| {
                warn!(error = %err, "products query failed; product names will be unavailable");
                HashMap::new()
            })
    }

    async fn category_index(&self) -> HashMap<Uuid, category::Model> {
        category::Entity::find()
            .all(&*self.db)
            .await
            .map(|rows| rows.into_iter().map(|c| (c.id, c)).collect())
            .unwrap_or_else(|err| {
                warn!(error = %err, "categories query failed; expenses will show as uncategorized");
                HashMap::new()
            })
    }
}

/// Pure composition of the report view from fetched rows
pub fn build_report(today: NaiveDate, source: &ReportSource) -> ReportView {
    let months = month_buckets(today, REPORT_WINDOW_MONTHS)
        .into_iter()
        .map(|bucket| {
            let sales = bucket.slice(&source.sales);
            let expenses = bucket.slice(&source.expenses);

            let revenue = metrics::sum_by(&sales, |s| Some(s.total_amount));
            let cost_of_goods = metrics::sum_by(&sales, |s| Some(s.total_cost));
            let gross_profit = revenue - cost_of_goods;
            let operating_expenses = metrics::sum_by(&expenses, |e| Some(e.amount));
            let net_profit = gross_profit - operating_expenses;

            MonthlyReportRow {
                month: bucket.label_with_year(),
                month_short: bucket.label,
                revenue,
                cost_of_goods,
                gross_profit,
                operating_expenses,
                net_profit,
                cash_in: revenue,
                cash_out: operating_expenses + cost_of_goods,
                net_cash_flow: revenue - operating_expenses - cost_of_goods,
            }
        })
        .collect();

    let products = breakdown::product_totals(&source.sale_items, &source.products)
        .into_iter()
        .map(|totals| ProductPerformance {
            margin: metrics::profit_margin(totals.revenue, totals.profit),
            id: totals.id,
            name: totals.name,
            total_sold: totals.total_sold,
            revenue: totals.revenue,
            cost: totals.cost,
            profit: totals.profit,
        })
        .collect();

    // P&L breakdown is the current month only, ranked by spend. The stable
    // sort keeps first-encounter order between equal amounts.
    let current = month_bounds(today);
    let current_expenses = source.expenses.iter().filter(|e| current.contains(e.date));
    let mut expense_breakdown = breakdown::expenses_by_category(current_expenses, &source.categories);
    expense_breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));

    ReportView {
        months,
        products,
        expense_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use crate::entities::category::CategoryKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(on: NaiveDate, amount: Decimal, cost: Decimal) -> sale::Model {
        sale::Model {
            id: Uuid::new_v4(),
            date: on,
            total_amount: amount,
            total_cost: cost,
            profit: amount - cost,
            channel: None,
            payment_method: None,
            customer_name: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn expense(on: NaiveDate, amount: Decimal, category_id: Option<Uuid>) -> expense::Model {
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
            created_at: Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn category(id: Uuid, name: &str) -> category::Model {
        category::Model {
            id,
            name: name.to_string(),
            kind: CategoryKind::Expense,
            color: None,
            is_system: false,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn derived_pnl_and_cash_flow_columns_are_consistent() {
        let source = ReportSource {
            sales: vec![sale(date(2026, 1, 5), dec!(1000), dec!(400))],
            expenses: vec![expense(date(2026, 1, 10), dec!(250), None)],
            ..Default::default()
        };

        let view = build_report(date(2026, 1, 20), &source);

        assert_eq!(view.months.len(), 12);
        let january = view.months.last().unwrap();
        assert_eq!(january.month, "Jan 2026");
        assert_eq!(january.month_short, "Jan");
        assert_eq!(january.revenue, dec!(1000));
        assert_eq!(january.cost_of_goods, dec!(400));
        assert_eq!(january.gross_profit, dec!(600));
        assert_eq!(january.operating_expenses, dec!(250));
        assert_eq!(january.net_profit, dec!(350));
        assert_eq!(january.cash_in, dec!(1000));
        assert_eq!(january.cash_out, dec!(650));
        assert_eq!(january.net_cash_flow, dec!(350));
    }

    #[test]
    fn product_margin_is_percent_of_revenue_with_zero_guard() {
        let bread = Uuid::new_v4();
        let freebie = Uuid::new_v4();
        let mut products = HashMap::new();
        for (id, name) in [(bread, "Bread"), (freebie, "Sample")] {
            products.insert(
                id,
                product::Model {
                    id,
                    name: name.to_string(),
                    sku: None,
                    cost_price: Decimal::ZERO,
                    sale_price: Decimal::ZERO,
                    category_id: None,
                    is_active: true,
                    created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                    updated_at: None,
                },
            );
        }
        let item = |product_id, unit_cost, subtotal| sale_item::Model {
            id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            product_id,
            quantity: dec!(1),
            unit_price: Decimal::ZERO,
            unit_cost,
            discount: Decimal::ZERO,
            subtotal,
        };
        let source = ReportSource {
            sale_items: vec![
                item(bread, dec!(6), dec!(10)),
                // Given away: zero revenue must not divide by zero.
                item(freebie, dec!(2), dec!(0)),
            ],
            products,
            ..Default::default()
        };

        let view = build_report(date(2026, 1, 20), &source);

        let bread_row = view.products.iter().find(|p| p.name == "Bread").unwrap();
        assert_eq!(bread_row.margin, 40.0);
        let freebie_row = view.products.iter().find(|p| p.name == "Sample").unwrap();
        assert_eq!(freebie_row.margin, 0.0);
        // Ranked by revenue.
        assert_eq!(view.products[0].name, "Bread");
    }

    #[test]
    fn expense_breakdown_covers_current_month_only_and_ranks_by_amount() {
        let rent = Uuid::new_v4();
        let flour = Uuid::new_v4();
        let source = ReportSource {
            expenses: vec![
                // Previous month; must not appear.
                expense(date(2025, 12, 28), dec!(999), Some(rent)),
                expense(date(2026, 1, 3), dec!(40), Some(flour)),
                expense(date(2026, 1, 9), dec!(120), Some(rent)),
            ],
            categories: HashMap::from([
                (rent, category(rent, "Rent")),
                (flour, category(flour, "Flour")),
            ]),
            ..Default::default()
        };

        let view = build_report(date(2026, 1, 20), &source);

        let names: Vec<&str> = view
            .expense_breakdown
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(names, ["Rent", "Flour"]);
        assert_eq!(view.expense_breakdown[0].amount, dec!(120));
    }

    #[test]
    fn empty_source_yields_twelve_zero_months() {
        let view = build_report(date(2026, 6, 15), &ReportSource::default());
        assert_eq!(view.months.len(), 12);
        assert!(view.months.iter().all(|m| m.revenue == Decimal::ZERO
            && m.net_profit == Decimal::ZERO
            && m.net_cash_flow == Decimal::ZERO));
        assert!(view.products.is_empty());
        assert!(view.expense_breakdown.is_empty());
    }
}
