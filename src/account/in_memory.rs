use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::account::AccountId;
use crate::account::AccountSnapshot;
use crate::account::AccountStore;
use crate::account::AccountStoreError;

/// In-memory [`AccountStore`] backed by a sharded [`DashMap`].
///
/// Each operation holds the lock of a single shard for the duration of one map access, so operations on
/// different accounts only meet when they hash to the same shard and never wait on each other's logic.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<AccountId, AccountSnapshot>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, account_id: &AccountId) -> Result<AccountSnapshot, AccountStoreError> {
        self.accounts
            .get(account_id)
            .map(|snapshot| *snapshot)
            .ok_or_else(|| AccountStoreError::NotFound {
                account_id: account_id.clone(),
            })
    }

    fn compare_and_swap(
        &self,
        account_id: &AccountId,
        expected: AccountSnapshot,
        new: AccountSnapshot,
    ) -> Result<(), AccountStoreError> {
        let mut current = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| AccountStoreError::NotFound {
                account_id: account_id.clone(),
            })?;

        if *current != expected {
            return Err(AccountStoreError::Conflict {
                account_id: account_id.clone(),
                expected,
                current: *current,
            });
        }
        *current = new;

        Ok(())
    }

    fn create(&self, account_id: &AccountId, initial: AccountSnapshot) -> Result<(), AccountStoreError> {
        match self.accounts.entry(account_id.clone()) {
            Entry::Occupied(_) => Err(AccountStoreError::AlreadyExists {
                account_id: account_id.clone(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(initial);
                Ok(())
            }
        }
    }
}
