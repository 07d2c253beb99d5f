use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::PaymentMethod,
    errors::ServiceError,
    services::sales::{NewSale, NewSaleItem, SaleWithItems},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

/// Build the sales Router scoped under `/api/v1/sales`.
pub fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/:id", get(get_sale).delete(delete_sale))
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateSaleItemRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    #[serde(default)]
    pub discount: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSaleRequest {
    pub date: NaiveDate,
    pub channel: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A sale needs at least one item"))]
    pub items: Vec<CreateSaleItemRequest>,
}

/// Record a sale with its line items
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 200, description = "Sale recorded", body = ApiResponse<SaleWithItems>),
        (status = 400, description = "Invalid sale payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    Json(request): Json<CreateSaleRequest>,
) -> ApiResult<SaleWithItems> {
    request.validate()?;

    let input = NewSale {
        date: request.date,
        channel: request.channel,
        payment_method: request.payment_method,
        customer_name: request.customer_name,
        notes: request.notes,
        items: request
            .items
            .into_iter()
            .map(|item| NewSaleItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                unit_cost: item.unit_cost,
                discount: item.discount,
            })
            .collect(),
    };

    let created = state.services.sales.create_sale(input).await?;
    Ok(Json(ApiResponse::success(created)))
}

/// List sales, newest first
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(ListQuery),
    responses(
        (status = 200, description = "Sales retrieved", body = ApiResponse<PaginatedResponse<SaleWithItems>>)
    ),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<SaleWithItems>> {
    let limit = state.config.resolve_page_size(query.limit);
    let page = query.page.max(1);

    let (items, total) = state.services.sales.list_sales(page, limit).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

/// Get a sale with its items
#[utoipa::path(
    get,
    path = "/api/v1/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale retrieved", body = ApiResponse<SaleWithItems>),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SaleWithItems> {
    let sale = state
        .services
        .sales
        .get_sale(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Sale with ID {} not found", id)))?;
    Ok(Json(ApiResponse::success(sale)))
}

/// Delete a sale and its items
#[utoipa::path(
    delete,
    path = "/api/v1/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.sales.delete_sale(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}
