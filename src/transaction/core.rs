//! Defines the core data models and table schema for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::{
    database_id::{AccountId, TransactionId},
    import::{DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_PAYEE, ImportedTransaction},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the account the transaction belongs to.
    pub account_id: AccountId,
    /// The name of the account the transaction belongs to, if it is known.
    pub account_name: Option<String>,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The amount of money spent (negative) or earned (positive).
    pub amount: f64,
    /// Who was paid, or who paid.
    pub payee: String,
    /// The spending or income category, e.g. "Groceries".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the transaction has been checked against a bank statement.
    pub is_reconciled: bool,
    /// When the transaction was stored.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability. The payee,
    /// category and description start out with the same defaults as imports.
    pub fn build(account_id: AccountId, amount: f64, date: OffsetDateTime) -> TransactionBuilder {
        TransactionBuilder {
            account_id,
            date,
            amount,
            payee: DEFAULT_PAYEE.to_owned(),
            category: DEFAULT_CATEGORY.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            is_reconciled: false,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// This is also the JSON body for creating a single transaction, the store
/// assigns the ID and timestamps.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// use crate::transaction::Transaction;
///
/// let builder = Transaction::build(1, -45.99, datetime!(2025-01-15 0:00 UTC))
///     .payee("Coffee Shop")
///     .category("Dining")
///     .description("Flat white");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionBuilder {
    /// The account the transaction belongs to.
    pub account_id: AccountId,

    /// When the transaction occurred.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,

    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income/credits, negative values represent
    /// expenses/debits.
    pub amount: f64,

    /// Who was paid, or who paid.
    #[serde(default, deserialize_with = "null_as_default")]
    pub payee: String,

    /// The spending or income category.
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    /// A human-readable description of the transaction.
    ///
    /// A blank payee, category or description is stored as the same default
    /// an import would use.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Whether the transaction has been checked against a bank statement.
    #[serde(default)]
    pub is_reconciled: bool,
}

impl TransactionBuilder {
    /// Create a builder from a normalized, imported transaction for `account_id`.
    pub fn from_imported(account_id: AccountId, imported: ImportedTransaction) -> Self {
        Self {
            account_id,
            date: imported.date,
            amount: imported.amount,
            payee: imported.payee,
            category: imported.category,
            description: imported.description,
            is_reconciled: imported.is_reconciled,
        }
    }

    /// Set the payee for the transaction.
    pub fn payee(mut self, payee: &str) -> Self {
        self.payee = payee.to_owned();
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set whether the transaction has been reconciled.
    pub fn is_reconciled(mut self, is_reconciled: bool) -> Self {
        self.is_reconciled = is_reconciled;
        self
    }

    /// Replace a blank payee, category or description with its default and
    /// trim the rest, the same way imported values are read.
    pub(crate) fn with_defaults(mut self) -> Self {
        self.payee = text_or(self.payee, DEFAULT_PAYEE);
        self.category = text_or(self.category, DEFAULT_CATEGORY);
        self.description = text_or(self.description, DEFAULT_DESCRIPTION);
        self
    }

    /// Turn the builder into a [Transaction] with the given ID and timestamps.
    pub(crate) fn finalise(
        self,
        id: TransactionId,
        account_name: Option<String>,
        now: OffsetDateTime,
    ) -> Transaction {
        let builder = self.with_defaults();

        Transaction {
            id,
            account_id: builder.account_id,
            account_name,
            date: builder.date,
            amount: builder.amount,
            payee: builder.payee,
            category: builder.category,
            description: builder.description,
            is_reconciled: builder.is_reconciled,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update for a transaction, fields set to `None` are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionUpdate {
    /// Move the transaction to another account.
    pub account_id: Option<AccountId>,
    /// The new date.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new payee.
    pub payee: Option<String>,
    /// The new category.
    pub category: Option<String>,
    /// The new description.
    pub description: Option<String>,
    /// The new reconciliation state.
    pub is_reconciled: Option<bool>,
}

impl TransactionUpdate {
    /// Copy the fields that are set onto `transaction` and bump its `updated_at`.
    pub(crate) fn apply_to(self, transaction: &mut Transaction, now: OffsetDateTime) {
        if let Some(account_id) = self.account_id {
            transaction.account_id = account_id;
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(payee) = self.payee {
            transaction.payee = text_or(payee, DEFAULT_PAYEE);
        }
        if let Some(category) = self.category {
            transaction.category = text_or(category, DEFAULT_CATEGORY);
        }
        if let Some(description) = self.description {
            transaction.description = text_or(description, DEFAULT_DESCRIPTION);
        }
        if let Some(is_reconciled) = self.is_reconciled {
            transaction.is_reconciled = is_reconciled;
        }

        transaction.updated_at = now;
    }
}

fn text_or(text: String, default: &str) -> String {
    match text.trim() {
        "" => default.to_owned(),
        trimmed => trimmed.to_owned(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// The account table must be created first.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                payee TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                is_reconciled INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account_date ON \"transaction\"(account_id, date);",
        (),
    )?;

    Ok(())
}

/// The columns expected by [map_transaction_row], joined with the account name.
pub(crate) const SELECT_TRANSACTION: &str = "SELECT \"transaction\".id, account_id, account.name, \
    date, amount, payee, category, description, is_reconciled, \"transaction\".created_at, \
    \"transaction\".updated_at FROM \"transaction\" \
    LEFT JOIN account ON \"transaction\".account_id = account.id";

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        account_name: row.get(2)?,
        date: row.get(3)?,
        amount: row.get(4)?,
        payee: row.get(5)?,
        category: row.get(6)?,
        description: row.get(7)?,
        is_reconciled: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
