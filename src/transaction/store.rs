//! Defines the transaction store trait.

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{Transaction, TransactionBuilder, TransactionUpdate},
};

/// Handles the creation, retrieval and modification of transactions.
///
/// Implementations use interior mutability so that a store can be cloned into
/// each request handler.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    ///
    /// # Errors
    /// Returns [Error::InvalidAccount] if the builder's account does not exist.
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Store many transactions at once.
    ///
    /// Either every transaction is stored or none are.
    fn import(&self, builders: Vec<TransactionBuilder>) -> Result<Vec<Transaction>, Error>;

    /// Retrieve a transaction from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a stored transaction.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve every transaction, newest first.
    ///
    /// Transactions on the same date are ordered by ID so the order is stable after updates.
    fn list(&self) -> Result<Vec<Transaction>, Error>;

    /// Change the fields of a transaction that are set in `update`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingTransaction] if `id` does not refer to a stored transaction.
    fn update(&self, id: TransactionId, update: TransactionUpdate) -> Result<Transaction, Error>;

    /// Remove a transaction from the store.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingTransaction] if `id` does not refer to a stored transaction.
    fn delete(&self, id: TransactionId) -> Result<(), Error>;

    /// The sorted, unique, non-empty categories used by stored transactions.
    fn categories(&self) -> Result<Vec<String>, Error>;
}
