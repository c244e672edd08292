//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, `Amount` and `TransactionBuilder` for creating transactions
//! - Database functions for storing, filtering, and paging transactions
//! - View handlers for transaction-related web pages

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod filter;
mod form;
mod list;

pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use db::{
    PageWindow, TransactionRow, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, get_transaction_owner, get_transaction_rows,
    update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{Amount, Transaction, TransactionBuilder, TransactionId, TransactionType};
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use filter::{CategoryFilter, TransactionFilter, TransactionsQuery};
pub use list::get_transactions_page;
