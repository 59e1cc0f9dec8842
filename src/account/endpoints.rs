//! Route handlers for managing accounts and summarizing their balances.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::AccountId};

use super::core::{
    Account, AccountUpdate, NewAccount, create_account, delete_account, get_account,
    get_net_worth, get_total_balance, list_accounts, update_account,
};

/// The state needed to manage accounts.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<T: Clone> FromRef<AppState<T>> for AccountState {
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

impl AccountState {
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

/// A route handler that responds with every account.
pub async fn list_accounts_endpoint(
    State(state): State<AccountState>,
) -> Result<Json<Vec<Account>>, Error> {
    list_accounts(&*state.lock()?).map(Json)
}

/// A route handler that responds with a single account.
pub async fn get_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, Error> {
    get_account(account_id, &*state.lock()?).map(Json)
}

/// A route handler for creating an account, responds with the new account.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Json(new_account): Json<NewAccount>,
) -> Result<Response, Error> {
    let account = create_account(new_account, &*state.lock()?)?;
    tracing::info!("Created account {} \"{}\"", account.id, account.name);

    Ok((StatusCode::CREATED, Json(account)).into_response())
}

/// A route handler for changing the details of an account, responds with the updated account.
pub async fn update_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<Account>, Error> {
    let account = update_account(account_id, update, &*state.lock()?)?;
    tracing::info!("Updated account {account_id}");

    Ok(Json(account))
}

/// A route handler that responds with the sum of all account balances.
pub async fn get_total_balance_endpoint(
    State(state): State<AccountState>,
) -> Result<Json<f64>, Error> {
    get_total_balance(&*state.lock()?).map(Json)
}

/// A route handler that responds with assets minus liabilities.
pub async fn get_net_worth_endpoint(State(state): State<AccountState>) -> Result<Json<f64>, Error> {
    get_net_worth(&*state.lock()?).map(Json)
}

/// A route handler for deleting an account and all of its transactions.
pub async fn delete_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
) -> Result<StatusCode, Error> {
    delete_account(account_id, &*state.lock()?)?;
    tracing::info!("Deleted account {account_id}");

    Ok(StatusCode::NO_CONTENT)
}
