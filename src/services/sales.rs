use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{sale, sale_item, PaymentMethod},
    errors::ServiceError,
};

/// Line item of a sale being recorded
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    pub discount: Decimal,
}

/// A sale being recorded. Totals are not accepted from the caller; they are
/// derived from the items here so the stored invariants always hold.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub date: NaiveDate,
    pub channel: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<NewSaleItem>,
}

/// A sale together with its line items
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleWithItems {
    pub sale: sale::Model,
    pub items: Vec<sale_item::Model>,
}

/// Service for recording and browsing sales
pub struct SalesService {
    db: Arc<DbPool>,
}

impl SalesService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Records a sale and its items in one transaction
    #[instrument(skip(self, input))]
    pub async fn create_sale(&self, input: NewSale) -> Result<SaleWithItems, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "A sale needs at least one item".to_string(),
            ));
        }

        let mut total_amount = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        for item in &input.items {
            if item.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Item quantity must be positive".to_string(),
                ));
            }
            if item.unit_price < Decimal::ZERO
                || item.unit_cost < Decimal::ZERO
                || item.discount < Decimal::ZERO
            {
                return Err(ServiceError::ValidationError(
                    "Item prices and discounts cannot be negative".to_string(),
                ));
            }
            let line_total = item.quantity * item.unit_price;
            if item.discount > line_total {
                return Err(ServiceError::ValidationError(
                    "Item discount cannot exceed the line total".to_string(),
                ));
            }
            total_amount += line_total - item.discount;
            total_cost += item.unit_cost * item.quantity;
        }

        let sale_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to open transaction for sale");
            ServiceError::DatabaseError(e)
        })?;

        let sale_model = sale::ActiveModel {
            id: Set(sale_id),
            date: Set(input.date),
            total_amount: Set(total_amount),
            total_cost: Set(total_cost),
            profit: Set(total_amount - total_cost),
            channel: Set(input.channel),
            payment_method: Set(input.payment_method),
            customer_name: Set(input.customer_name),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert sale");
            ServiceError::DatabaseError(e)
        })?;

        let item_models: Vec<sale_item::ActiveModel> = input
            .items
            .iter()
            .map(|item| sale_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                unit_cost: Set(item.unit_cost),
                discount: Set(item.discount),
                subtotal: Set(item.quantity * item.unit_price - item.discount),
            })
            .collect();

        sale_item::Entity::insert_many(item_models)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to insert sale items");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        let items = self.items_of(sale_id).await?;
        info!(sale_id = %sale_id, total = %total_amount, items = items.len(), "Sale recorded");

        Ok(SaleWithItems {
            sale: sale_model,
            items,
        })
    }

    /// Lists sales newest first, items included
    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<SaleWithItems>, u64), ServiceError> {
        let db = &*self.db;

        let paginator = sale::Entity::find()
            .order_by_desc(sale::Column::Date)
            .order_by_desc(sale::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let sales = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let mut items_by_sale: HashMap<Uuid, Vec<sale_item::Model>> = HashMap::new();
        if !ids.is_empty() {
            let items = sale_item::Entity::find()
                .filter(sale_item::Column::SaleId.is_in(ids))
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            for item in items {
                items_by_sale.entry(item.sale_id).or_default().push(item);
            }
        }

        let with_items = sales
            .into_iter()
            .map(|sale| {
                let items = items_by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect();

        Ok((with_items, total))
    }

    /// Gets a sale with its items
    #[instrument(skip(self))]
    pub async fn get_sale(&self, id: Uuid) -> Result<Option<SaleWithItems>, ServiceError> {
        let sale = sale::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        match sale {
            Some(sale) => {
                let items = self.items_of(sale.id).await?;
                Ok(Some(SaleWithItems { sale, items }))
            }
            None => Ok(None),
        }
    }

    /// Deletes a sale and its items in one transaction
    #[instrument(skip(self))]
    pub async fn delete_sale(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = sale::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale with ID {} not found", id)))?;

        let txn = self.db.begin().await.map_err(ServiceError::DatabaseError)?;

        sale_item::Entity::delete_many()
            .filter(sale_item::Column::SaleId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        sale::Entity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(sale_id = %id, "Sale deleted");
        Ok(())
    }

    async fn items_of(&self, sale_id: Uuid) -> Result<Vec<sale_item::Model>, ServiceError> {
        sale_item::Entity::find()
            .filter(sale_item::Column::SaleId.eq(sale_id))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
