use std::sync::Arc;

use crate::account::AccountId;
use crate::account::AccountSnapshot;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountStoreError {
    #[error("account not found account_id={account_id}")]
    NotFound { account_id: AccountId },
    #[error("account already exists account_id={account_id}")]
    AlreadyExists { account_id: AccountId },
    #[error("account modified concurrently account_id={account_id}, expected={expected}, current={current}")]
    Conflict {
        account_id: AccountId,
        expected: AccountSnapshot,
        current: AccountSnapshot,
    },
}

/// Authoritative mapping from [`AccountId`] to its current [`AccountSnapshot`].
///
/// Implementations must make [`AccountStore::compare_and_swap`] atomic per account and must not serialize
/// operations on different accounts behind a single lock.
pub trait AccountStore: Send + Sync {
    /// # Errors
    ///
    /// - [`AccountStoreError::NotFound`] if the account was never created.
    fn get(&self, account_id: &AccountId) -> Result<AccountSnapshot, AccountStoreError>;

    /// Replaces the stored snapshot with `new` only if it still equals `expected`.
    ///
    /// # Errors
    ///
    /// - [`AccountStoreError::NotFound`] if the account was never created.
    /// - [`AccountStoreError::Conflict`] if the stored snapshot differs from `expected`.
    fn compare_and_swap(
        &self,
        account_id: &AccountId,
        expected: AccountSnapshot,
        new: AccountSnapshot,
    ) -> Result<(), AccountStoreError>;

    /// # Errors
    ///
    /// - [`AccountStoreError::AlreadyExists`] if the account was already created.
    fn create(&self, account_id: &AccountId, initial: AccountSnapshot) -> Result<(), AccountStoreError>;
}

impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    fn get(&self, account_id: &AccountId) -> Result<AccountSnapshot, AccountStoreError> {
        (**self).get(account_id)
    }

    fn compare_and_swap(
        &self,
        account_id: &AccountId,
        expected: AccountSnapshot,
        new: AccountSnapshot,
    ) -> Result<(), AccountStoreError> {
        (**self).compare_and_swap(account_id, expected, new)
    }

    fn create(&self, account_id: &AccountId, initial: AccountSnapshot) -> Result<(), AccountStoreError> {
        (**self).create(account_id, initial)
    }
}
