//! Downloads of the user's transactions and categories as CSV files.

mod handlers;
mod writer;

pub use handlers::{
    export_categories_csv, export_filtered_transactions_csv, export_transactions_csv,
    get_export_page,
};
