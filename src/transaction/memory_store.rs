//! An in-memory transaction store for tests and throwaway sessions.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard},
};

use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{Transaction, TransactionBuilder, TransactionStore, TransactionUpdate},
};

#[derive(Debug, Default)]
struct Inner {
    transactions: Vec<Transaction>,
    next_id: TransactionId,
}

impl Inner {
    fn insert(&mut self, builder: TransactionBuilder, now: OffsetDateTime) -> Transaction {
        self.next_id += 1;
        let mut transaction = builder.finalise(self.next_id, None, now);
        transaction.date = transaction.date.to_offset(UtcOffset::UTC);
        self.transactions.push(transaction.clone());

        transaction
    }
}

/// Keeps transactions in memory.
///
/// Accounts are not tracked, so any account ID is accepted and transactions
/// never carry an account name. Clones share the same transactions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, Error> {
        self.inner.lock().map_err(|_| Error::DatabaseLockError)
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        Ok(self.lock()?.insert(builder, OffsetDateTime::now_utc()))
    }

    fn import(&self, builders: Vec<TransactionBuilder>) -> Result<Vec<Transaction>, Error> {
        let mut inner = self.lock()?;
        let now = OffsetDateTime::now_utc();

        Ok(builders
            .into_iter()
            .map(|builder| inner.insert(builder, now))
            .collect())
    }

    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.lock()?
            .transactions
            .iter()
            .find(|transaction| transaction.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn list(&self) -> Result<Vec<Transaction>, Error> {
        let mut transactions = self.lock()?.transactions.clone();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));

        Ok(transactions)
    }

    fn update(&self, id: TransactionId, update: TransactionUpdate) -> Result<Transaction, Error> {
        let mut inner = self.lock()?;
        let transaction = inner
            .transactions
            .iter_mut()
            .find(|transaction| transaction.id == id)
            .ok_or(Error::UpdateMissingTransaction)?;

        update.apply_to(transaction, OffsetDateTime::now_utc());
        transaction.date = transaction.date.to_offset(UtcOffset::UTC);

        Ok(transaction.clone())
    }

    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let mut inner = self.lock()?;
        let position = inner
            .transactions
            .iter()
            .position(|transaction| transaction.id == id)
            .ok_or(Error::DeleteMissingTransaction)?;
        inner.transactions.remove(position);

        Ok(())
    }

    fn categories(&self) -> Result<Vec<String>, Error> {
        let categories: BTreeSet<String> = self
            .lock()?
            .transactions
            .iter()
            .filter(|transaction| !transaction.category.trim().is_empty())
            .map(|transaction| transaction.category.clone())
            .collect();

        Ok(categories.into_iter().collect())
    }
}
