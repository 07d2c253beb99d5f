use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{db::DbPool, entities::product, errors::ServiceError};

/// A product being added to the catalog
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub category_id: Option<Uuid>,
}

/// Partial update of a product; absent fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub sku: Option<Option<String>>,
    pub cost_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub category_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

fn check_prices(cost_price: Decimal, sale_price: Decimal) -> Result<(), ServiceError> {
    if cost_price < Decimal::ZERO || sale_price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Product prices cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Service for managing the product catalog
pub struct ProductService {
    db: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Adds a product to the catalog
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        check_prices(input.cost_price, input.sale_price)?;

        if let Some(sku) = input.sku.as_deref() {
            let existing = product::Entity::find()
                .filter(product::Column::Sku.eq(sku))
                .one(&*self.db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if existing.is_some() {
                return Err(ServiceError::ValidationError(format!(
                    "Product with SKU '{}' already exists",
                    sku
                )));
            }
        }

        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            sku: Set(input.sku),
            cost_price: Set(input.cost_price),
            sale_price: Set(input.sale_price),
            category_id: Set(input.category_id),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(product_id = %model.id, name = %model.name, "Product created");
        Ok(model)
    }

    /// Applies a partial update to a product
    #[instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        id: Uuid,
        changes: UpdateProduct,
    ) -> Result<product::Model, ServiceError> {
        let existing = product::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {} not found", id)))?;

        let cost_price = changes.cost_price.unwrap_or(existing.cost_price);
        let sale_price = changes.sale_price.unwrap_or(existing.sale_price);
        check_prices(cost_price, sale_price)?;

        let mut model: product::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            model.name = Set(name);
        }
        if let Some(sku) = changes.sku {
            model.sku = Set(sku);
        }
        if let Some(cost_price) = changes.cost_price {
            model.cost_price = Set(cost_price);
        }
        if let Some(sale_price) = changes.sale_price {
            model.sale_price = Set(sale_price);
        }
        if let Some(category_id) = changes.category_id {
            model.category_id = Set(category_id);
        }
        if let Some(is_active) = changes.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Some(Utc::now()));

        let updated = model
            .update(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(product_id = %updated.id, "Product updated");
        Ok(updated)
    }

    /// Lists products alphabetically, optionally only active ones or those
    /// matching a name/SKU search
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        limit: u64,
        is_active: Option<bool>,
        search: Option<String>,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut query = product::Entity::find();

        if let Some(is_active) = is_active {
            query = query.filter(product::Column::IsActive.eq(is_active));
        }
        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            let term = term.trim().to_string();
            query = query.filter(
                product::Column::Name
                    .contains(&term)
                    .or(product::Column::Sku.contains(&term)),
            );
        }

        let paginator = query
            .order_by_asc(product::Column::Name)
            .paginate(&*self.db, limit);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let products = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((products, total))
    }

    /// Deletes a product that has no recorded sales
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        use crate::entities::sale_item;

        let existing = product::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {} not found", id)))?;

        let references = sale_item::Entity::find()
            .filter(sale_item::Column::ProductId.eq(id))
            .count(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if references > 0 {
            return Err(ServiceError::Conflict(
                "Product has recorded sales; deactivate it instead".to_string(),
            ));
        }

        product::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
