use axum::extract::FromRef;

use crate::AppState;

/// The state needed by the transaction route handlers.
#[derive(Debug, Clone)]
pub struct TransactionState<T> {
    /// The store for managing transactions.
    pub transaction_store: T,
}

impl<T: Clone> FromRef<AppState<T>> for TransactionState<T> {
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}
