//! Defines the account model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::AccountId};

/// A bank account, credit card or other place where money is held.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The display name of the account, e.g. "Checking Account".
    pub name: String,
    /// The kind of account, e.g. "checking", "savings" or "credit".
    #[serde(rename = "type")]
    pub account_type: String,
    /// The bank or other institution that holds the account.
    pub institution: String,
    /// The sum of the account's transactions.
    pub balance: f64,
    /// The ISO 4217 currency code, e.g. "USD".
    pub currency: String,
    /// Free text notes about the account.
    pub notes: Option<String>,
    /// Whether the account is still in use.
    pub is_active: bool,
    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the account was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The data needed to create an [Account].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    /// The kind of account.
    #[serde(rename = "type")]
    pub account_type: String,
    /// The bank or other institution that holds the account.
    pub institution: String,
    /// The ISO 4217 currency code, defaults to "USD".
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Free text notes about the account.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A partial update for an [Account], fields set to `None` are left unchanged.
///
/// The balance is not included since it is always the sum of the account's transactions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountUpdate {
    /// The new display name.
    pub name: Option<String>,
    /// The new kind of account.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// The new institution.
    pub institution: Option<String>,
    /// The new currency code.
    pub currency: Option<String>,
    /// The new notes.
    pub notes: Option<String>,
    /// Whether the account is still in use.
    pub is_active: Option<bool>,
}

fn default_currency() -> String {
    "USD".to_owned()
}

impl NewAccount {
    /// Create the data for a new USD account without notes.
    pub fn new(name: &str, account_type: &str, institution: &str) -> Self {
        Self {
            name: name.to_owned(),
            account_type: account_type.to_owned(),
            institution: institution.to_owned(),
            currency: default_currency(),
            notes: None,
        }
    }
}

/// Create the account table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            account_type TEXT NOT NULL,
            institution TEXT NOT NULL,
            balance REAL NOT NULL DEFAULT 0,
            currency TEXT NOT NULL DEFAULT 'USD',
            notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

const SELECT_ACCOUNT: &str = "SELECT id, name, account_type, institution, balance, currency, \
    notes, is_active, created_at, updated_at FROM account";

/// Map a database row to an [Account].
pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: row.get(2)?,
        institution: row.get(3)?,
        balance: row.get(4)?,
        currency: row.get(5)?,
        notes: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Create a new account with a zero balance.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_account(account: NewAccount, connection: &Connection) -> Result<Account, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(
            "INSERT INTO account (name, account_type, institution, currency, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING id, name, account_type, institution, balance, currency, notes, is_active, created_at, updated_at",
        )?
        .query_row(
            (
                account.name,
                account.account_type,
                account.institution,
                account.currency,
                account.notes,
                now,
            ),
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Retrieve an account from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(&format!("{SELECT_ACCOUNT} WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_row_to_account)
        .map_err(Error::from)
}

/// Get all accounts ordered by name.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!("{SELECT_ACCOUNT} ORDER BY name ASC, id ASC"))?
        .query_map([], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::SqlError))
        .collect()
}

/// Update the fields of an account that are set in `update`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingAccount] if `id` does not refer to a valid account,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_account(
    id: AccountId,
    update: AccountUpdate,
    connection: &Connection,
) -> Result<Account, Error> {
    let mut account = get_account(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingAccount,
        error => error,
    })?;

    if let Some(name) = update.name {
        account.name = name;
    }
    if let Some(account_type) = update.account_type {
        account.account_type = account_type;
    }
    if let Some(institution) = update.institution {
        account.institution = institution;
    }
    if let Some(currency) = update.currency {
        account.currency = currency;
    }
    if update.notes.is_some() {
        account.notes = update.notes;
    }
    if let Some(is_active) = update.is_active {
        account.is_active = is_active;
    }

    connection
        .prepare(
            "UPDATE account
             SET name = ?1, account_type = ?2, institution = ?3, currency = ?4, notes = ?5,
                 is_active = ?6, updated_at = ?7
             WHERE id = ?8
             RETURNING id, name, account_type, institution, balance, currency, notes, is_active, created_at, updated_at",
        )?
        .query_row(
            (
                account.name,
                account.account_type,
                account.institution,
                account.currency,
                account.notes,
                account.is_active,
                OffsetDateTime::now_utc(),
                id,
            ),
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Get the sum of the balances of all accounts.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_total_balance(connection: &Connection) -> Result<f64, Error> {
    let total: f64 = connection
        .prepare("SELECT COALESCE(SUM(balance), 0) FROM account")?
        .query_row([], |row| row.get(0))?;

    Ok(total)
}

/// Get the total of the positive balances (assets) minus the total owed on
/// accounts with a negative balance (liabilities).
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_net_worth(connection: &Connection) -> Result<f64, Error> {
    let (assets, liabilities): (f64, f64) = connection
        .prepare(
            "SELECT COALESCE(SUM(CASE WHEN balance > 0 THEN balance END), 0),
                    COALESCE(SUM(CASE WHEN balance < 0 THEN -balance END), 0)
             FROM account",
        )?
        .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    Ok(assets - liabilities)
}

/// Delete an account and, through the foreign key cascade, its transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingAccount] if `id` does not refer to a valid account,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM account WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}

/// Set the balance of an account to the sum of its transactions.
///
/// Does nothing if `id` does not refer to a valid account.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn refresh_account_balance(id: AccountId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE account
         SET balance = (SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" WHERE account_id = ?1),
             updated_at = ?2
         WHERE id = ?1",
        (id, OffsetDateTime::now_utc()),
    )?;

    Ok(())
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use super::create_account_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_account_table(&connection));
    }
}
