//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, transaction::TransactionStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<T> {
    /// The database connection, used directly for accounts.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The store for managing [transactions](crate::Transaction).
    pub transaction_store: T,
}

impl<T> AppState<T>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    /// Create a new [AppState] for a SQLite database connection and a transaction store.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Arc<Mutex<Connection>>, transaction_store: T) -> Result<Self, Error> {
        {
            let connection = db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;
            initialize(&connection)?;
        }

        Ok(Self {
            db_connection,
            transaction_store,
        })
    }
}
