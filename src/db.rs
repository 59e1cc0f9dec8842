//! Sets up the application's SQLite database.

use rusqlite::Connection;

use crate::{account::create_account_table, transaction::create_transaction_table};

/// Create the all of the database tables for the application.
///
/// Foreign key enforcement is switched on for `connection`, the transaction
/// table relies on it to reject unknown accounts and to cascade deletes.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_account_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
