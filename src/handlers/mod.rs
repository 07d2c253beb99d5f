pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod products;
pub mod receipts;
pub mod reports;
pub mod sales;

use std::sync::Arc;

use crate::{config::AppConfig, db::DbPool};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub dashboard: Arc<crate::services::dashboard::DashboardService>,
    pub reports: Arc<crate::services::reports::ReportService>,
    pub sales: Arc<crate::services::sales::SalesService>,
    pub expenses: Arc<crate::services::expenses::ExpenseService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub categories: Arc<crate::services::categories::CategoryService>,
    pub receipt_scan: Arc<crate::services::receipt_scan::ReceiptScanService>,
}

impl AppServices {
    /// Builds the service container shared by all handlers
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            dashboard: Arc::new(crate::services::dashboard::DashboardService::new(
                db_pool.clone(),
            )),
            reports: Arc::new(crate::services::reports::ReportService::new(db_pool.clone())),
            sales: Arc::new(crate::services::sales::SalesService::new(db_pool.clone())),
            expenses: Arc::new(crate::services::expenses::ExpenseService::new(
                db_pool.clone(),
            )),
            products: Arc::new(crate::services::products::ProductService::new(
                db_pool.clone(),
            )),
            categories: Arc::new(crate::services::categories::CategoryService::new(db_pool)),
            receipt_scan: Arc::new(crate::services::receipt_scan::ReceiptScanService::new(
                config,
            )),
        }
    }
}
