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
    entities::{category, expense, PaymentMethod},
    services::expenses::{NewExpense, UpdateExpense},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

/// Build the expenses Router scoped under `/api/v1/expenses`.
pub fn expenses_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/:id", axum::routing::put(update_expense).delete(delete_expense))
}

/// Expense row joined with its category for table rendering
#[derive(Debug, Serialize, ToSchema)]
pub struct ExpenseWithCategory {
    #[serde(flatten)]
    pub expense: expense::Model,
    pub category: Option<category::Model>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExpenseRequest {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category_id: Option<Uuid>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub tax_amount: Option<Decimal>,
}

/// Record an expense
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = ExpenseRequest,
    responses(
        (status = 200, description = "Expense recorded", body = ApiResponse<expense::Model>),
        (status = 400, description = "Invalid expense payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<ExpenseRequest>,
) -> ApiResult<expense::Model> {
    request.validate()?;

    let created = state
        .services
        .expenses
        .create_expense(NewExpense {
            date: request.date,
            amount: request.amount,
            category_id: request.category_id,
            supplier: request.supplier,
            description: request.description,
            payment_method: request.payment_method,
            receipt_url: request.receipt_url,
            is_recurring: request.is_recurring,
            tax_amount: request.tax_amount,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

/// Replace an expense's fields
#[utoipa::path(
    put,
    path = "/api/v1/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    request_body = ExpenseRequest,
    responses(
        (status = 200, description = "Expense updated", body = ApiResponse<expense::Model>),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ExpenseRequest>,
) -> ApiResult<expense::Model> {
    request.validate()?;

    // The form submits the whole record, so every field is replaced.
    let updated = state
        .services
        .expenses
        .update_expense(
            id,
            UpdateExpense {
                date: Some(request.date),
                amount: Some(request.amount),
                category_id: Some(request.category_id),
                supplier: Some(request.supplier),
                description: Some(request.description),
                payment_method: Some(request.payment_method),
                receipt_url: Some(request.receipt_url),
                is_recurring: Some(request.is_recurring),
                tax_amount: Some(request.tax_amount),
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// List expenses, newest first, with categories
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    params(ListQuery),
    responses(
        (status = 200, description = "Expenses retrieved", body = ApiResponse<PaginatedResponse<ExpenseWithCategory>>)
    ),
    tag = "Expenses"
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<ExpenseWithCategory>> {
    let limit = state.config.resolve_page_size(query.limit);
    let page = query.page.max(1);

    let (rows, total) = state.services.expenses.list_expenses(page, limit).await?;
    let items = rows
        .into_iter()
        .map(|(expense, category)| ExpenseWithCategory { expense, category })
        .collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.expenses.delete_expense(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}
