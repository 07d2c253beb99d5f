use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::category::{self, CategoryKind},
    errors::ServiceError,
};

/// A category being created
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub kind: CategoryKind,
    pub color: Option<String>,
}

/// Partial update of a category; absent fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub color: Option<Option<String>>,
}

/// Service for managing expense/product categories
pub struct CategoryService {
    db: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a category
    #[instrument(skip(self, input))]
    pub async fn create_category(
        &self,
        input: NewCategory,
    ) -> Result<category::Model, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        let existing = category::Entity::find()
            .filter(category::Column::Name.eq(&name))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Category '{}' already exists",
                name
            )));
        }

        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            kind: Set(input.kind),
            color: Set(input.color),
            is_system: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(category_id = %model.id, name = %model.name, "Category created");
        Ok(model)
    }

    /// Applies a partial update to a category. System categories are frozen.
    #[instrument(skip(self, changes))]
    pub async fn update_category(
        &self,
        id: Uuid,
        changes: UpdateCategory,
    ) -> Result<category::Model, ServiceError> {
        let existing = self.require(id).await?;
        if existing.is_system {
            return Err(ServiceError::InvalidOperation(
                "System categories cannot be modified".to_string(),
            ));
        }

        let mut model: category::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Category name cannot be empty".to_string(),
                ));
            }
            model.name = Set(name);
        }
        if let Some(kind) = changes.kind {
            model.kind = Set(kind);
        }
        if let Some(color) = changes.color {
            model.color = Set(color);
        }

        let updated = model
            .update(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(category_id = %updated.id, "Category updated");
        Ok(updated)
    }

    /// Lists categories by name. A kind filter also includes `Both`
    /// categories, which belong to either picker.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        kind: Option<CategoryKind>,
    ) -> Result<Vec<category::Model>, ServiceError> {
        let mut query = category::Entity::find();

        match kind {
            Some(CategoryKind::Both) | None => {}
            Some(kind) => {
                query = query
                    .filter(category::Column::Kind.is_in([kind, CategoryKind::Both]));
            }
        }

        query
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Deletes a category. System categories are protected.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.require(id).await?;
        if existing.is_system {
            return Err(ServiceError::InvalidOperation(
                "System categories cannot be deleted".to_string(),
            ));
        }

        category::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    async fn require(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Category with ID {} not found", id)))
    }
}
