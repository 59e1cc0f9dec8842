//! Implements a SQLite backed transaction store.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, params};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    account::refresh_account_balance,
    database_id::{AccountId, TransactionId},
    transaction::{
        Transaction, TransactionBuilder, TransactionStore, TransactionUpdate,
        core::{SELECT_TRANSACTION, map_transaction_row},
    },
};

/// Stores transactions in a SQLite database.
///
/// Transactions reference an account, so the account table must be set up in
/// the database, see [crate::initialize_db]. Account balances are refreshed
/// after every change.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

/// Map foreign key failures to [Error::InvalidAccount].
fn map_insert_error(error: rusqlite::Error, account_id: AccountId) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidAccount(account_id),
        error => error.into(),
    }
}

fn insert_transaction(
    builder: TransactionBuilder,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    let builder = builder.with_defaults();
    let account_id = builder.account_id;

    connection
        .execute(
            "INSERT INTO \"transaction\" \
            (account_id, date, amount, payee, category, description, is_reconciled, created_at, updated_at) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                builder.account_id,
                builder.date.to_offset(UtcOffset::UTC),
                builder.amount,
                builder.payee,
                builder.category,
                builder.description,
                builder.is_reconciled,
                now,
            ],
        )
        .map_err(|error| map_insert_error(error, account_id))?;

    Ok(connection.last_insert_rowid())
}

fn select_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE \"transaction\".id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(Error::from)
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAccount] if the account ID does not refer to a real account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = self.lock()?;
        let tx = connection.unchecked_transaction()?;
        let account_id = builder.account_id;

        let id = insert_transaction(builder, OffsetDateTime::now_utc(), &tx)?;
        refresh_account_balance(account_id, &tx)?;
        let transaction = select_transaction(id, &tx)?;

        tx.commit()?;

        Ok(transaction)
    }

    /// Import many transactions inside a single SQL transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAccount] if any account ID does not refer to a real account,
    /// - or [Error::SqlError] if there is some other SQL error.
    ///
    /// Nothing is stored if an error is returned.
    fn import(&self, builders: Vec<TransactionBuilder>) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;
        let tx = connection.unchecked_transaction()?;
        let now = OffsetDateTime::now_utc();

        let mut account_ids = BTreeSet::new();
        let mut ids = Vec::with_capacity(builders.len());

        for builder in builders {
            account_ids.insert(builder.account_id);
            ids.push(insert_transaction(builder, now, &tx)?);
        }

        for account_id in account_ids {
            refresh_account_balance(account_id, &tx)?;
        }

        let imported = ids
            .into_iter()
            .map(|id| select_transaction(id, &tx))
            .collect::<Result<Vec<_>, _>>()?;

        tx.commit()?;

        Ok(imported)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        select_transaction(id, &*self.lock()?)
    }

    fn list(&self) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        // Sort by date, and then ID to keep transaction order stable after updates
        let query = format!("{SELECT_TRANSACTION} ORDER BY date DESC, \"transaction\".id ASC");

        connection
            .prepare(&query)?
            .query_map([], map_transaction_row)?
            .map(|transaction_result| transaction_result.map_err(Error::SqlError))
            .collect()
    }

    /// Update a transaction and the balances of the accounts it moved between.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid transaction,
    /// - [Error::InvalidAccount] if the new account ID does not refer to a real account,
    /// - or [Error::SqlError] there is some other SQL error.
    fn update(&self, id: TransactionId, update: TransactionUpdate) -> Result<Transaction, Error> {
        let connection = self.lock()?;
        let tx = connection.unchecked_transaction()?;

        let mut transaction = select_transaction(id, &tx).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingTransaction,
            error => error,
        })?;
        let previous_account_id = transaction.account_id;
        update.apply_to(&mut transaction, OffsetDateTime::now_utc());

        tx.execute(
            "UPDATE \"transaction\" \
            SET account_id = ?1, date = ?2, amount = ?3, payee = ?4, category = ?5, \
                description = ?6, is_reconciled = ?7, updated_at = ?8 \
            WHERE id = ?9",
            params![
                transaction.account_id,
                transaction.date.to_offset(UtcOffset::UTC),
                transaction.amount,
                transaction.payee,
                transaction.category,
                transaction.description,
                transaction.is_reconciled,
                transaction.updated_at,
                id,
            ],
        )
        .map_err(|error| map_insert_error(error, transaction.account_id))?;

        refresh_account_balance(transaction.account_id, &tx)?;
        if previous_account_id != transaction.account_id {
            refresh_account_balance(previous_account_id, &tx)?;
        }

        let updated = select_transaction(id, &tx)?;
        tx.commit()?;

        Ok(updated)
    }

    /// Delete a transaction and refresh the balance of its account.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let connection = self.lock()?;
        let tx = connection.unchecked_transaction()?;

        let account_id: AccountId = tx
            .query_row(
                "DELETE FROM \"transaction\" WHERE id = :id RETURNING account_id",
                &[(":id", &id)],
                |row| row.get(0),
            )
            .map_err(|error| match Error::from(error) {
                Error::NotFound => Error::DeleteMissingTransaction,
                error => error,
            })?;

        refresh_account_balance(account_id, &tx)?;
        tx.commit()?;

        Ok(())
    }

    fn categories(&self) -> Result<Vec<String>, Error> {
        let connection = self.lock()?;

        connection
            .prepare(
                "SELECT DISTINCT category FROM \"transaction\" \
                WHERE TRIM(category) != '' ORDER BY category ASC",
            )?
            .query_map([], |row| row.get(0))?
            .map(|category_result| category_result.map_err(Error::SqlError))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        account::{NewAccount, create_account, get_account},
        db::initialize,
        transaction::{Transaction, TransactionStore, TransactionUpdate},
    };

    use super::SQLiteTransactionStore;

    fn get_test_store() -> (SQLiteTransactionStore, Arc<Mutex<Connection>>) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_account(
            NewAccount::new("Checking Account", "checking", "ACME Bank"),
            &connection,
        )
        .unwrap();
        create_account(
            NewAccount::new("Savings Account", "savings", "ACME Bank"),
            &connection,
        )
        .unwrap();
        let connection = Arc::new(Mutex::new(connection));

        (SQLiteTransactionStore::new(connection.clone()), connection)
    }

    fn get_balance(account_id: i64, connection: &Arc<Mutex<Connection>>) -> f64 {
        get_account(account_id, &connection.lock().unwrap())
            .unwrap()
            .balance
    }

    #[test]
    fn create_succeeds() {
        let (store, connection) = get_test_store();
        let date = datetime!(2025-04-15 0:00 UTC);

        let transaction = store
            .create(
                Transaction::build(1, -45.67, date)
                    .payee("Grocery Store")
                    .category("Groceries"),
            )
            .expect("Could not create transaction");

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.amount, -45.67);
        assert_eq!(transaction.date, date);
        assert_eq!(
            transaction.account_name,
            Some("Checking Account".to_owned())
        );
        assert_eq!(get_balance(1, &connection), -45.67);
    }

    #[test]
    fn blank_text_is_stored_as_defaults() {
        let (store, _) = get_test_store();

        let created = store
            .create(Transaction::build(1, -1.0, datetime!(2025-04-15 0:00 UTC)).payee(" "))
            .unwrap();
        let updated = store
            .update(
                created.id,
                TransactionUpdate {
                    category: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.get(created.id), Ok(updated.clone()));
        assert_eq!(updated.payee, "Unknown");
        assert_eq!(updated.category, "Uncategorized");
        assert_eq!(updated.description, "Imported transaction");
    }

    #[test]
    fn create_fails_on_invalid_account() {
        let (store, _) = get_test_store();

        let result = store.create(Transaction::build(42, 1.0, datetime!(2025-04-15 0:00 UTC)));

        assert_eq!(result, Err(Error::InvalidAccount(42)));
    }

    #[test]
    fn import_is_all_or_nothing() {
        let (store, _) = get_test_store();
        let date = datetime!(2025-04-15 0:00 UTC);

        let result = store.import(vec![
            Transaction::build(1, -1.0, date),
            Transaction::build(99, -2.0, date),
        ]);

        assert_eq!(result, Err(Error::InvalidAccount(99)));
        assert_eq!(store.list(), Ok(vec![]));
    }

    #[test]
    fn import_refreshes_balance() {
        let (store, connection) = get_test_store();
        let date = datetime!(2025-04-15 0:00 UTC);

        let imported = store
            .import(vec![
                Transaction::build(2, 1000.0, date),
                Transaction::build(2, -250.0, date),
            ])
            .expect("Could not import transactions");

        assert_eq!(imported.len(), 2);
        assert_eq!(get_balance(2, &connection), 750.0);
    }

    #[test]
    fn list_orders_newest_first_then_by_id() {
        let (store, _) = get_test_store();
        let older = datetime!(2025-04-14 0:00 UTC);
        let newer = datetime!(2025-04-15 0:00 UTC);
        store.create(Transaction::build(1, 1.0, older)).unwrap();
        store.create(Transaction::build(1, 2.0, newer)).unwrap();
        store.create(Transaction::build(1, 3.0, newer)).unwrap();

        let ids: Vec<i64> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn update_moves_balance_between_accounts() {
        let (store, connection) = get_test_store();
        let transaction = store
            .create(Transaction::build(1, -30.0, datetime!(2025-04-15 0:00 UTC)))
            .unwrap();

        let updated = store
            .update(
                transaction.id,
                TransactionUpdate {
                    account_id: Some(2),
                    is_reconciled: Some(true),
                    ..Default::default()
                },
            )
            .expect("Could not update transaction");

        assert_eq!(updated.account_id, 2);
        assert!(updated.is_reconciled);
        assert_eq!(get_balance(1, &connection), 0.0);
        assert_eq!(get_balance(2, &connection), -30.0);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (store, _) = get_test_store();

        let result = store.update(5, TransactionUpdate::default());

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let (store, connection) = get_test_store();
        let transaction = store
            .create(Transaction::build(1, -12.0, datetime!(2025-04-15 0:00 UTC)))
            .unwrap();

        store.delete(transaction.id).expect("Could not delete");

        assert_eq!(store.get(transaction.id), Err(Error::NotFound));
        assert_eq!(get_balance(1, &connection), 0.0);
        assert_eq!(store.delete(transaction.id), Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let (store, _) = get_test_store();
        let date = datetime!(2025-04-15 0:00 UTC);
        for category in ["Utilities", "Groceries", "Utilities", ""] {
            store
                .create(Transaction::build(1, -1.0, date).category(category))
                .unwrap();
        }

        assert_eq!(
            store.categories(),
            Ok(vec![
                "Groceries".to_owned(),
                "Uncategorized".to_owned(),
                "Utilities".to_owned()
            ])
        );
    }

    #[test]
    fn deleting_account_cascades() {
        let (store, connection) = get_test_store();
        store
            .create(Transaction::build(1, -1.0, datetime!(2025-04-15 0:00 UTC)))
            .unwrap();

        connection
            .lock()
            .unwrap()
            .execute("DELETE FROM account WHERE id = 1", ())
            .unwrap();

        assert_eq!(store.list(), Ok(vec![]));
    }
}
