pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod products;
pub mod receipt_scan;
pub mod reports;
pub mod sales;
