//! Route handlers for storing new transactions.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{Error, database_id::AccountId, import::ImportedTransaction};

use super::{TransactionBuilder, TransactionState, TransactionStore};

/// A route handler for creating a transaction, responds with the stored transaction.
pub async fn create_transaction_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<Response, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let transaction = state.transaction_store.create(builder)?;
    tracing::info!(
        "Created transaction {} in account {}",
        transaction.id,
        transaction.account_id
    );

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// The body of an import request, usually the transactions from an import preview.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    /// The account every transaction is stored in.
    pub account_id: AccountId,
    /// The normalized transactions to store.
    pub transactions: Vec<ImportedTransaction>,
}

/// A route handler for storing a batch of imported transactions in one account.
///
/// Responds with the stored transactions in request order. Either every
/// transaction is stored or none are.
pub async fn import_transactions_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Json(request): Json<ImportRequest>,
) -> Result<Response, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    if request.transactions.is_empty() {
        return Err(Error::NoRecordsFound);
    }

    let start_time = std::time::Instant::now();
    let account_id = request.account_id;
    let builders = request
        .transactions
        .into_iter()
        .map(|imported| TransactionBuilder::from_imported(account_id, imported))
        .collect();

    let transactions = state.transaction_store.import(builders)?;

    tracing::info!(
        "Imported {} transactions into account {account_id} in {}ms",
        transactions.len(),
        start_time.elapsed().as_millis()
    );

    Ok((StatusCode::CREATED, Json(transactions)).into_response())
}
