use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{category, expense, PaymentMethod},
    errors::ServiceError,
};

/// An expense being recorded
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category_id: Option<Uuid>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub receipt_url: Option<String>,
    pub is_recurring: bool,
    pub tax_amount: Option<Decimal>,
}

/// Partial update of an expense; absent fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct UpdateExpense {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub category_id: Option<Option<Uuid>>,
    pub supplier: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub payment_method: Option<Option<PaymentMethod>>,
    pub receipt_url: Option<Option<String>>,
    pub is_recurring: Option<bool>,
    pub tax_amount: Option<Option<Decimal>>,
}

fn check_amounts(amount: Decimal, tax_amount: Option<Decimal>) -> Result<(), ServiceError> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Expense amount cannot be negative".to_string(),
        ));
    }
    if tax_amount.is_some_and(|tax| tax < Decimal::ZERO) {
        return Err(ServiceError::ValidationError(
            "Tax amount cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Service for recording and browsing expenses
pub struct ExpenseService {
    db: Arc<DbPool>,
}

impl ExpenseService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Records an expense
    #[instrument(skip(self, input))]
    pub async fn create_expense(&self, input: NewExpense) -> Result<expense::Model, ServiceError> {
        check_amounts(input.amount, input.tax_amount)?;

        let model = expense::ActiveModel {
            id: Set(Uuid::new_v4()),
            date: Set(input.date),
            amount: Set(input.amount),
            category_id: Set(input.category_id),
            supplier: Set(input.supplier),
            description: Set(input.description),
            payment_method: Set(input.payment_method),
            receipt_url: Set(input.receipt_url),
            is_recurring: Set(input.is_recurring),
            tax_amount: Set(input.tax_amount),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(expense_id = %model.id, amount = %model.amount, "Expense recorded");
        Ok(model)
    }

    /// Applies a partial update to an expense
    #[instrument(skip(self, changes))]
    pub async fn update_expense(
        &self,
        id: Uuid,
        changes: UpdateExpense,
    ) -> Result<expense::Model, ServiceError> {
        let existing = expense::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Expense with ID {} not found", id)))?;

        let amount = changes.amount.unwrap_or(existing.amount);
        let tax_amount = changes.tax_amount.unwrap_or(existing.tax_amount);
        check_amounts(amount, tax_amount)?;

        let mut model: expense::ActiveModel = existing.into();
        if let Some(date) = changes.date {
            model.date = Set(date);
        }
        if let Some(amount) = changes.amount {
            model.amount = Set(amount);
        }
        if let Some(category_id) = changes.category_id {
            model.category_id = Set(category_id);
        }
        if let Some(supplier) = changes.supplier {
            model.supplier = Set(supplier);
        }
        if let Some(description) = changes.description {
            model.description = Set(description);
        }
        if let Some(payment_method) = changes.payment_method {
            model.payment_method = Set(payment_method);
        }
        if let Some(receipt_url) = changes.receipt_url {
            model.receipt_url = Set(receipt_url);
        }
        if let Some(is_recurring) = changes.is_recurring {
            model.is_recurring = Set(is_recurring);
        }
        if let Some(tax_amount) = changes.tax_amount {
            model.tax_amount = Set(tax_amount);
        }
        model.updated_at = Set(Some(Utc::now()));

        let updated = model
            .update(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(expense_id = %updated.id, "Expense updated");
        Ok(updated)
    }

    /// Lists expenses newest first with their category rows
    #[instrument(skip(self))]
    pub async fn list_expenses(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<(expense::Model, Option<category::Model>)>, u64), ServiceError> {
        let paginator = expense::Entity::find()
            .find_also_related(category::Entity)
            .order_by_desc(expense::Column::Date)
            .order_by_desc(expense::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((rows, total))
    }

    /// Deletes an expense
    #[instrument(skip(self))]
    pub async fn delete_expense(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = expense::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Expense with ID {} not found", id)))?;

        expense::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(expense_id = %id, "Expense deleted");
        Ok(())
    }
}
