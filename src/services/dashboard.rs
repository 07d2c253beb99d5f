use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{category, expense, product, sale, sale_item},
    reports::{
        activity, breakdown, metrics, month_buckets, month_bounds, period, ActivityEntry,
        CategorySlice, MonthBounds, RECENT_ACTIVITY_LIMIT,
    },
};

/// Months of history shown in the dashboard revenue chart
const DASHBOARD_WINDOW_MONTHS: u32 = 6;
/// Products listed in the dashboard top-seller panel
const TOP_PRODUCT_LIMIT: usize = 5;

/// Headline figures for the current month with month-over-month deltas
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub profit: Decimal,
    pub profit_margin: f64,
    pub revenue_change: f64,
    pub expenses_change: f64,
    pub profit_change: f64,
}

/// One month of the dashboard revenue/expense chart
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyPoint {
    pub month: String,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

/// Top-seller panel row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub total_sold: Decimal,
    pub revenue: Decimal,
    pub profit: Decimal,
}

/// Everything the dashboard page renders
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub monthly_data: Vec<MonthlyPoint>,
    pub expenses_by_category: Vec<CategorySlice>,
    pub top_products: Vec<TopProduct>,
    pub recent_transactions: Vec<ActivityEntry>,
}

/// Row sets one dashboard render works from. Fetched in a single concurrent
/// batch; any failed query leaves its field empty so the render still
/// completes.
#[derive(Debug, Default)]
pub struct DashboardSource {
    /// Sales of the whole chart window, oldest first
    pub sales: Vec<sale::Model>,
    /// Expenses of the whole chart window, oldest first
    pub expenses: Vec<expense::Model>,
    /// Line items belonging to current-month sales
    pub month_items: Vec<sale_item::Model>,
    pub products: HashMap<Uuid, product::Model>,
    pub categories: HashMap<Uuid, category::Model>,
    pub recent_sales: Vec<sale::Model>,
    pub recent_expenses: Vec<(expense::Model, Option<category::Model>)>,
}

/// Service assembling the dashboard view model
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Builds the dashboard for the current calendar month. Store reads are
    /// best-effort: a failing query degrades to an empty row set instead of
    /// failing the render.
    #[instrument(skip(self))]
    pub async fn get_dashboard(&self) -> DashboardView {
        let today = Utc::now().date_naive();
        let source = self.fetch(today).await;
        build_dashboard(today, &source)
    }

    async fn fetch(&self, today: NaiveDate) -> DashboardSource {
        let window_start = period::window_start(today, DASHBOARD_WINDOW_MONTHS);
        let current = month_bounds(today);

        let (sales, expenses, month_items, products, categories, recent_sales, recent_expenses) =
            tokio::join!(
                self.sales_since(window_start),
                self.expenses_since(window_start),
                self.sale_items_between(current),
                self.product_index(),
                self.category_index(),
                self.recent_sales(),
                self.recent_expenses(),
            );

        DashboardSource {
            sales,
            expenses,
            month_items,
            products,
            categories,
            recent_sales,
            recent_expenses,
        }
    }

    async fn sales_since(&self, start: NaiveDate) -> Vec<sale::Model> {
        sale::Entity::find()
            .filter(sale::Column::Date.gte(start))
            .order_by_asc(sale::Column::Date)
            .all(&*self.db)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "sales query failed; rendering dashboard without sales");
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
                warn!(error = %err, "expenses query failed; rendering dashboard without expenses");
                Vec::new()
            })
    }

    async fn sale_items_between(&self, bounds: MonthBounds) -> Vec<sale_item::Model> {
        sale_item::Entity::find()
            .join(JoinType::InnerJoin, sale_item::Relation::Sale.def())
            .filter(sale::Column::Date.between(bounds.start, bounds.end))
            .all(&*self.db)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "sale items query failed; rendering dashboard without top products");
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

    async fn recent_sales(&self) -> Vec<sale::Model> {
        sale::Entity::find()
            .order_by_desc(sale::Column::CreatedAt)
            .limit(RECENT_ACTIVITY_LIMIT as u64)
            .all(&*self.db)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "recent sales query failed; feed will omit sales");
                Vec::new()
            })
    }

    async fn recent_expenses(&self) -> Vec<(expense::Model, Option<category::Model>)> {
        expense::Entity::find()
            .find_also_related(category::Entity)
            .order_by_desc(expense::Column::CreatedAt)
            .limit(RECENT_ACTIVITY_LIMIT as u64)
            .all(&*self.db)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "recent expenses query failed; feed will omit expenses");
                Vec::new()
            })
    }
}

/// Pure composition of the dashboard view from fetched rows. Split from the
/// fetch so the month math and metric formulas are testable without a store.
pub fn build_dashboard(today: NaiveDate, source: &DashboardSource) -> DashboardView {
    let current = month_bounds(today);
    let previous = period::shifted_month_bounds(today, 1);

    let current_sales: Vec<&sale::Model> = source
        .sales
        .iter()
        .filter(|s| current.contains(s.date))
        .collect();
    let previous_sales: Vec<&sale::Model> = source
        .sales
        .iter()
        .filter(|s| previous.contains(s.date))
        .collect();
    let current_expenses: Vec<&expense::Model> = source
        .expenses
        .iter()
        .filter(|e| current.contains(e.date))
        .collect();
    let previous_expenses: Vec<&expense::Model> = source
        .expenses
        .iter()
        .filter(|e| previous.contains(e.date))
        .collect();

    let total_revenue = metrics::sum_by(&current_sales, |s| Some(s.total_amount));
    let total_expenses = metrics::sum_by(&current_expenses, |e| Some(e.amount));
    let profit = total_revenue - total_expenses;

    let previous_revenue = metrics::sum_by(&previous_sales, |s| Some(s.total_amount));
    let previous_expense_total = metrics::sum_by(&previous_expenses, |e| Some(e.amount));
    let previous_profit = previous_revenue - previous_expense_total;

    let stats = DashboardStats {
        total_revenue,
        total_expenses,
        profit,
        profit_margin: metrics::profit_margin(total_revenue, profit),
        revenue_change: metrics::percent_change(total_revenue, previous_revenue),
        expenses_change: metrics::percent_change(total_expenses, previous_expense_total),
        profit_change: metrics::signed_percent_change(profit, previous_profit),
    };

    let monthly_data = month_buckets(today, DASHBOARD_WINDOW_MONTHS)
        .into_iter()
        .map(|bucket| {
            let revenue = metrics::sum_by(&bucket.slice(&source.sales), |s| Some(s.total_amount));
            let expenses = metrics::sum_by(&bucket.slice(&source.expenses), |e| Some(e.amount));
            MonthlyPoint {
                month: bucket.label,
                revenue,
                expenses,
                profit: revenue - expenses,
            }
        })
        .collect();

    // Pie chart keeps first-encounter order.
    let expenses_by_category =
        breakdown::expenses_by_category(current_expenses.iter().copied(), &source.categories);

    let top_products = breakdown::product_totals(&source.month_items, &source.products)
        .into_iter()
        .take(TOP_PRODUCT_LIMIT)
        .map(|totals| TopProduct {
            id: totals.id,
            name: totals.name,
            total_sold: totals.total_sold,
            revenue: totals.revenue,
            profit: totals.profit,
        })
        .collect();

    let recent_transactions = activity::merge_recent(
        &source.recent_sales,
        &source.recent_expenses,
        RECENT_ACTIVITY_LIMIT,
    );

    DashboardView {
        stats,
        monthly_data,
        expenses_by_category,
        top_products,
        recent_transactions,
    }
}
