//! Dashboard module
//!
//! Provides an overview page showing income, expenses and balances per month,
//! quarter or year, along with the expenses for each category.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod tables;
mod transaction;

pub use aggregation::UNCATEGORIZED_LABEL;
pub use handlers::get_dashboard_page;
