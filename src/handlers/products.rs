use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::product,
    services::products::{NewProduct, UpdateProduct},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

/// Build the products Router scoped under `/api/v1/products`.
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", axum::routing::put(update_product).delete(delete_product))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name must be between 1 and 255 characters"))]
    pub name: String,
    pub sku: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name must be between 1 and 255 characters"))]
    pub name: String,
    pub sku: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
}

/// Query parameters for the product list
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    /// Only active or only retired products when set
    pub is_active: Option<bool>,
    /// Name or SKU fragment
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

/// Add a product to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid product payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<product::Model> {
    request.validate()?;

    let created = state
        .services
        .products
        .create_product(NewProduct {
            name: request.name,
            sku: request.sku,
            cost_price: request.cost_price,
            sale_price: request.sale_price,
            category_id: request.category_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

/// Replace a product's fields
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<product::Model>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<product::Model> {
    request.validate()?;

    let updated = state
        .services
        .products
        .update_product(
            id,
            UpdateProduct {
                name: Some(request.name),
                sku: Some(request.sku),
                cost_price: Some(request.cost_price),
                sale_price: Some(request.sale_price),
                category_id: Some(request.category_id),
                is_active: Some(request.is_active),
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// List catalog products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<PaginatedResponse<product::Model>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    let limit = state.config.resolve_page_size(query.limit);
    let page = query.page.max(1);

    let (items, total) = state
        .services
        .products
        .list_products(page, limit, query.is_active, query.search)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

/// Delete a product without recorded sales
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product has recorded sales", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.products.delete_product(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}
