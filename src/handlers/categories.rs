use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::category::{self, CategoryKind},
    services::categories::{NewCategory, UpdateCategory},
    ApiResponse, ApiResult, AppState,
};

/// Build the categories Router scoped under `/api/v1/categories`.
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", axum::routing::put(update_category).delete(delete_category))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters"))]
    pub name: String,
    pub kind: CategoryKind,
    pub color: Option<String>,
}

/// Query parameters for the category list
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryListQuery {
    /// Restrict to categories usable for this kind (includes `both`)
    pub kind: Option<CategoryKind>,
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category created", body = ApiResponse<category::Model>),
        (status = 400, description = "Invalid category payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<category::Model> {
    request.validate()?;

    let created = state
        .services
        .categories
        .create_category(NewCategory {
            name: request.name,
            kind: request.kind,
            color: request.color,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

/// Replace a category's fields. System categories reject changes.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<category::Model>),
        (status = 400, description = "Category is protected", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<category::Model> {
    request.validate()?;

    let updated = state
        .services
        .categories
        .update_category(
            id,
            UpdateCategory {
                name: Some(request.name),
                kind: Some(request.kind),
                color: Some(request.color),
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// List categories, optionally filtered by kind
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories retrieved", body = ApiResponse<Vec<category::Model>>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> ApiResult<Vec<category::Model>> {
    let categories = state.services.categories.list_categories(query.kind).await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// Delete a category. System categories are protected.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Category is protected", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.categories.delete_category(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}
