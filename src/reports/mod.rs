//! Pure, in-memory aggregation over already-fetched rows.
//!
//! Everything in this module is synchronous and side-effect free: the service
//! layer fetches row sets from the database and feeds them through these
//! functions to build the dashboard and report view models. Nothing here
//! touches the store or mutates its inputs.

pub mod activity;
pub mod breakdown;
pub mod buckets;
pub mod metrics;
pub mod period;

pub use activity::{merge_recent, ActivityEntry, ActivityKind, RECENT_ACTIVITY_LIMIT};
pub use breakdown::{
    expenses_by_category, product_totals, CategorySlice, ProductTotals, DEFAULT_CATEGORY_COLOR,
    UNCATEGORIZED_LABEL,
};
pub use buckets::{month_buckets, Dated, MonthBucket};
pub use metrics::{percent_change, profit_margin, signed_percent_change, sum_by};
pub use period::{month_bounds, shifted_month_bounds, window_start, MonthBounds};
