//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, `TransactionBuilder` and `TransactionUpdate`
//! - The `TransactionStore` trait with SQLite and in-memory implementations
//! - Route handlers for the transaction REST API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod memory_store;
mod query_endpoint;
mod sqlite_store;
mod state;
mod store;

pub use core::{
    Transaction, TransactionBuilder, TransactionUpdate, create_transaction_table,
    map_transaction_row,
};
pub use create_endpoint::{ImportRequest, create_transaction_endpoint, import_transactions_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use memory_store::InMemoryTransactionStore;
pub use query_endpoint::{
    SearchRequest, get_categories_endpoint, get_transaction_endpoint,
    list_account_transactions_endpoint, list_transactions_endpoint, search_transactions_endpoint,
};
pub use sqlite_store::SQLiteTransactionStore;
pub use state::TransactionState;
pub use store::TransactionStore;
