//! Route handlers for reading transactions.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    Error,
    database_id::{AccountId, TransactionId},
    filter::{TransactionFilter, TransactionFilterQuery, matches_search},
};

use super::{Transaction, TransactionState, TransactionStore};

/// A route handler that responds with the transactions matching the filter in the query string.
///
/// Transactions are sorted newest first.
pub async fn list_transactions_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Query(query): Query<TransactionFilterQuery>,
) -> Result<Json<Vec<Transaction>>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let filter = TransactionFilter::try_from(query)?;
    let transactions = state.transaction_store.list()?;

    Ok(Json(filter.apply(&transactions)))
}

/// A route handler that responds with the transactions of one account, newest first.
///
/// An account without transactions, or one that does not exist, gives an empty list.
pub async fn list_account_transactions_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Vec<Transaction>>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let filter = TransactionFilter {
        account_id: Some(account_id),
        ..Default::default()
    };

    Ok(Json(filter.apply(&state.transaction_store.list()?)))
}

/// A route handler that responds with a single transaction.
pub async fn get_transaction_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    state.transaction_store.get(transaction_id).map(Json)
}

/// A route handler that responds with the categories in use, sorted alphabetically.
pub async fn get_categories_endpoint<T>(
    State(state): State<TransactionState<T>>,
) -> Result<Json<Vec<String>>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    state.transaction_store.categories().map(Json)
}

/// The body of a transaction search request.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    /// Text to look for in the payee, description or category.
    pub query: String,
}

/// A route handler that responds with the transactions whose payee, description
/// or category contains the search text, ignoring case.
pub async fn search_transactions_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<Transaction>>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let matches = state
        .transaction_store
        .list()?
        .into_iter()
        .filter(|transaction| matches_search(transaction, &request.query))
        .collect();

    Ok(Json(matches))
}
