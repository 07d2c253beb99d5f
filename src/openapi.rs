use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "negocio API",
        version = "0.1.0",
        description = r#"
# negocio small-business API

Backend for a small-business management dashboard: record sales and expenses,
maintain the product catalog and categories, scan supplier receipts, and pull
the aggregated dashboard and financial reports.

## Error Handling

Failing endpoints return a consistent error body with the HTTP status
category, a human-readable message and a timestamp.

## Pagination

List endpoints accept `page` and `limit` query parameters; `limit` is capped
by server configuration.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "Dashboard", description = "Aggregated dashboard view"),
        (name = "Reports", description = "P&L, cash-flow and product reports"),
        (name = "Sales", description = "Sale recording and browsing"),
        (name = "Expenses", description = "Expense recording and browsing"),
        (name = "Products", description = "Product catalog"),
        (name = "Categories", description = "Expense and product categories"),
        (name = "Receipts", description = "AI receipt scanning")
    ),
    paths(
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::reports::get_report,
        crate::handlers::sales::list_sales,
        crate::handlers::sales::get_sale,
        crate::handlers::sales::create_sale,
        crate::handlers::sales::delete_sale,
        crate::handlers::expenses::list_expenses,
        crate::handlers::expenses::create_expense,
        crate::handlers::expenses::update_expense,
        crate::handlers::expenses::delete_expense,
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::receipts::scan_receipt,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Entities
            crate::entities::PaymentMethod,
            crate::entities::sale::Model,
            crate::entities::sale_item::Model,
            crate::entities::expense::Model,
            crate::entities::category::Model,
            crate::entities::category::CategoryKind,
            crate::entities::product::Model,

            // Request types
            crate::handlers::sales::CreateSaleRequest,
            crate::handlers::sales::CreateSaleItemRequest,
            crate::handlers::expenses::ExpenseRequest,
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,
            crate::handlers::categories::CategoryRequest,
            crate::handlers::receipts::ScanReceiptRequest,

            // View models
            crate::services::dashboard::DashboardView,
            crate::services::dashboard::DashboardStats,
            crate::services::dashboard::MonthlyPoint,
            crate::services::dashboard::TopProduct,
            crate::services::reports::ReportView,
            crate::services::reports::MonthlyReportRow,
            crate::services::reports::ProductPerformance,
            crate::services::sales::SaleWithItems,
            crate::handlers::expenses::ExpenseWithCategory,
            crate::reports::CategorySlice,
            crate::reports::ActivityEntry,
            crate::reports::ActivityKind,
            crate::services::receipt_scan::ScanResult,
            crate::services::receipt_scan::ScannedItem,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_reporting_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("negocio API"));
        assert!(json.contains("/api/v1/dashboard"));
        assert!(json.contains("/api/v1/reports"));
        assert!(json.contains("/api/v1/receipts/scan"));
    }
}
