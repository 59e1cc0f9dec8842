use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{Error, database_id::TransactionId};

use super::{TransactionState, TransactionStore};

/// A route handler for deleting a transaction, responds with no content.
pub async fn delete_transaction_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    state.transaction_store.delete(transaction_id)?;
    tracing::info!("Deleted transaction {transaction_id}");

    Ok(StatusCode::NO_CONTENT)
}
