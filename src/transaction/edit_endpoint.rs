use axum::{
    Json,
    extract::{Path, State},
};

use crate::{Error, database_id::TransactionId};

use super::{Transaction, TransactionState, TransactionStore, TransactionUpdate};

/// A route handler for changing some fields of a transaction, responds with the
/// updated transaction.
///
/// Fields missing from the request body are left unchanged.
pub async fn edit_transaction_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Path(transaction_id): Path<TransactionId>,
    Json(update): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let transaction = state
        .transaction_store
        .update(transaction_id, update)
        .inspect_err(|error| {
            tracing::debug!("Could not update transaction {transaction_id}: {error}")
        })?;

    Ok(Json(transaction))
}
