//! WealthTrackr is a personal finance tracker.
//!
//! This library provides a JSON REST API for accounts and transactions, plus the
//! pipeline that turns uploaded CSV and JSON files into normalized transactions
//! and filters transaction lists for display or export.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod account;
mod app_state;
mod database_id;
mod db;
pub mod endpoints;
mod export;
mod filter;
mod import;
mod logging;
mod routing;
mod transaction;

pub use account::{
    Account, AccountUpdate, NewAccount, create_account, get_account, get_net_worth,
    get_total_balance, list_accounts, update_account,
};
pub use app_state::AppState;
pub use database_id::{AccountId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use export::{ExportFormat, export_url};
pub use filter::{TransactionFilter, TransactionFilterQuery};
pub use import::{
    ImportBatch, ImportFormat, ImportPreview, ImportedTransaction, PREVIEW_LENGTH, ingest,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    InMemoryTransactionStore, SQLiteTransactionStore, Transaction, TransactionBuilder,
    TransactionStore, TransactionUpdate,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The uploaded file does not have a `.csv` or `.json` extension.
    ///
    /// Also used when an export is requested in a format other than CSV or JSON.
    #[error("unsupported format \"{0}\", expected CSV or JSON")]
    UnsupportedFormat(String),

    /// The file could not be parsed, e.g. malformed JSON or a JSON document
    /// that is not an array.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// The file parsed fine but did not contain any transactions.
    ///
    /// This is a softer failure than [Error::InvalidFormat], the client should
    /// show it as a warning.
    #[error("no transactions were found in the file")]
    NoRecordsFound,

    /// The uploaded file could not be read as text.
    #[error("could not read the file: {0}")]
    ReadFailure(String),

    /// The request body is larger than the server accepts.
    #[error("the request is larger than the {0} byte limit")]
    PayloadTooLarge(usize),

    /// An imported record has no amount.
    ///
    /// Records are numbered from one in the order they appear in the file.
    #[error("record {0} is missing an amount")]
    MissingAmount(usize),

    /// An imported record has an amount that is not a finite number.
    #[error("record {0} has an invalid amount \"{1}\"")]
    InvalidAmount(usize, String),

    /// A filter query parameter could not be parsed.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The account ID used to create or import transactions did not match a valid account.
    #[error("the account ID {0} does not refer to a valid account")]
    InvalidAccount(AccountId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The export file could not be written.
    #[error("could not write the export file: {0}")]
    ExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// A machine readable name for the error, e.g. "no_records_found".
    error: &'static str,
    /// A message that can be shown to the user.
    message: String,
}

impl Error {
    /// The machine readable name of the error sent to clients.
    fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::InvalidFormat(_) => "invalid_format",
            Error::NoRecordsFound => "no_records_found",
            Error::ReadFailure(_) => "read_failure",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::MissingAmount(_) => "missing_amount",
            Error::InvalidAmount(_, _) => "invalid_amount",
            Error::InvalidFilter(_) => "invalid_filter",
            Error::InvalidAccount(_) => "invalid_account",
            Error::NotFound
            | Error::UpdateMissingAccount
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::DeleteMissingAccount => "not_found",
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_)
            | Error::ExportError(_) => "internal_error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::UnsupportedFormat(_)
            | Error::InvalidFormat(_)
            | Error::ReadFailure(_)
            | Error::MissingAmount(_)
            | Error::InvalidAmount(_, _)
            | Error::InvalidFilter(_)
            | Error::InvalidAccount(_) => StatusCode::BAD_REQUEST,
            Error::NoRecordsFound => StatusCode::UNPROCESSABLE_ENTITY,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound
            | Error::UpdateMissingAccount
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::DeleteMissingAccount => StatusCode::NOT_FOUND,
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_)
            | Error::ExportError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: self.kind(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
