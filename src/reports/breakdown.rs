//! Per-category and per-product accumulation of expenses and sale line items.
//!
//! Both aggregations resolve relations through an id index built by the
//! caller, so they are independent of how the store returns nested rows.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{category, expense, product, sale_item};

/// Display label for expenses with no category relation
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// Display color for categories without one of their own
pub const DEFAULT_CATEGORY_COLOR: &str = "#888888";

/// One slice of an expense-by-category breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategorySlice {
    pub category: String,
    pub amount: Decimal,
    pub color: String,
}

/// Accumulated sales figures for a single product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductTotals {
    pub id: Uuid,
    pub name: String,
    pub total_sold: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// Sums expense amounts per resolved category name, in first-encounter
/// order. Expenses whose category is missing (or whose category row is gone)
/// accumulate under the "Uncategorized" sentinel; a category without a color
/// falls back to the default gray. The slice color is the one seen when the
/// slice was first created.
///
/// The dashboard pie chart consumes this order as-is; the P&L report sorts a
/// copy descending by amount at its call site.
pub fn expenses_by_category<'a, I>(
    expenses: I,
    categories: &HashMap<Uuid, category::Model>,
) -> Vec<CategorySlice>
where
    I: IntoIterator<Item = &'a expense::Model>,
{
    let mut slices: Vec<CategorySlice> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for expense in expenses {
        let (name, color) = match expense.category_id.and_then(|id| categories.get(&id)) {
            Some(cat) => (
                cat.name.clone(),
                cat.color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            ),
            None => (
                UNCATEGORIZED_LABEL.to_string(),
                DEFAULT_CATEGORY_COLOR.to_string(),
            ),
        };

        if let Some(&at) = by_name.get(&name) {
            slices[at].amount += expense.amount;
        } else {
            by_name.insert(name.clone(), slices.len());
            slices.push(CategorySlice {
                category: name,
                amount: expense.amount,
                color,
            });
        }
    }

    slices
}

/// Accumulates sold quantity, revenue, cost and profit per product and
/// returns the list ranked by revenue, highest first. Line items whose
/// product row no longer exists are skipped. The sort is stable, so products
/// with equal revenue keep their first-encounter order and any top-K
/// truncation preserves the full ranking's relative order.
pub fn product_totals<'a, I>(
    items: I,
    products: &HashMap<Uuid, product::Model>,
) -> Vec<ProductTotals>
where
    I: IntoIterator<Item = &'a sale_item::Model>,
{
    let mut ranked: Vec<ProductTotals> = Vec::new();
    let mut by_id: HashMap<Uuid, usize> = HashMap::new();

    for item in items {
        let Some(product) = products.get(&item.product_id) else {
            continue;
        };

        let at = *by_id.entry(item.product_id).or_insert_with(|| {
            ranked.push(ProductTotals {
                id: item.product_id,
                name: product.name.clone(),
                total_sold: Decimal::ZERO,
                revenue: Decimal::ZERO,
                cost: Decimal::ZERO,
                profit: Decimal::ZERO,
            });
            ranked.len() - 1
        });

        let line_cost = item.unit_cost * item.quantity;
        let entry = &mut ranked[at];
        entry.total_sold += item.quantity;
        entry.revenue += item.subtotal;
        entry.cost += line_cost;
        entry.profit += item.subtotal - line_cost;
    }

    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked
}
