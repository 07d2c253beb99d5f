//! Merging of recent sales and expenses into one chronological feed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{category, expense, sale};

/// How many merged entries the dashboard feed keeps
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Discriminant of a merged feed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Sale,
    Expense,
}

/// One row of the recent-transactions feed. `description` and `amount` are
/// derived for display and not stored anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub description: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Concatenates the two feeds, sorts newest first by creation time and keeps
/// the top `limit`. A full sort rather than a two-pointer merge: the inputs
/// are each capped at the limit anyway, and the store's presort is not a
/// contract this function relies on.
pub fn merge_recent(
    sales: &[sale::Model],
    expenses: &[(expense::Model, Option<category::Model>)],
    limit: usize,
) -> Vec<ActivityEntry> {
    let mut feed: Vec<ActivityEntry> = Vec::with_capacity(sales.len() + expenses.len());

    for sale in sales {
        feed.push(ActivityEntry {
            id: sale.id,
            kind: ActivityKind::Sale,
            description: sale
                .customer_name
                .clone()
                .unwrap_or_else(|| "Sale".to_string()),
            amount: sale.total_amount,
            created_at: sale.created_at,
        });
    }

    for (expense, category) in expenses {
        let description = expense
            .supplier
            .clone()
            .or_else(|| category.as_ref().map(|c| c.name.clone()))
            .unwrap_or_else(|| "Expense".to_string());
        feed.push(ActivityEntry {
            id: expense.id,
            kind: ActivityKind::Expense,
            description,
            amount: expense.amount,
            created_at: expense.created_at,
        });
    }

    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    feed.truncate(limit);
    feed
}
