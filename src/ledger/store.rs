use std::sync::Arc;

use crate::account::AccountId;
use crate::ledger::TransactionRecord;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerStoreError {
    #[error("record out of order account_id={account_id}, expected_sequence={expected_sequence}, sequence={sequence}")]
    OutOfOrder {
        account_id: AccountId,
        expected_sequence: u64,
        sequence: u64,
    },
    #[error("ledger storage failure account_id={account_id}, reason={reason}")]
    Backend { account_id: AccountId, reason: String },
}

/// Durable append-only sequence of [`TransactionRecord`]s per account.
pub trait LedgerStore: Send + Sync {
    /// Appends `record` at the end of its account history.
    ///
    /// # Errors
    ///
    /// - [`LedgerStoreError::OutOfOrder`] if `record.sequence` is not the current head sequence + 1 (1 for an
    ///   empty history).
    /// - [`LedgerStoreError::Backend`] if the underlying storage failed to persist the record.
    fn append(&self, record: TransactionRecord) -> Result<(), LedgerStoreError>;

    /// Returns up to `limit` records of `account_id`, most recent first.
    ///
    /// # Errors
    ///
    /// - [`LedgerStoreError::Backend`] if the underlying storage failed to read.
    fn list(&self, account_id: &AccountId, limit: usize) -> Result<Vec<TransactionRecord>, LedgerStoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn append(&self, record: TransactionRecord) -> Result<(), LedgerStoreError> {
        (**self).append(record)
    }

    fn list(&self, account_id: &AccountId, limit: usize) -> Result<Vec<TransactionRecord>, LedgerStoreError> {
        (**self).list(account_id, limit)
    }
}
