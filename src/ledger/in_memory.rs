use dashmap::DashMap;

use crate::account::AccountId;
use crate::ledger::LedgerStore;
use crate::ledger::LedgerStoreError;
use crate::ledger::TransactionRecord;

/// In-memory [`LedgerStore`], one append-only [`Vec`] per account in a sharded [`DashMap`].
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    histories: DashMap<AccountId, Vec<TransactionRecord>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, record: TransactionRecord) -> Result<(), LedgerStoreError> {
        let mut history = self.histories.entry(record.account_id.clone()).or_default();

        let expected_sequence = history.last().map_or(1, |head| head.sequence + 1);
        if record.sequence != expected_sequence {
            return Err(LedgerStoreError::OutOfOrder {
                account_id: record.account_id,
                expected_sequence,
                sequence: record.sequence,
            });
        }
        history.push(record);

        Ok(())
    }

    fn list(&self, account_id: &AccountId, limit: usize) -> Result<Vec<TransactionRecord>, LedgerStoreError> {
        Ok(self
            .histories
            .get(account_id)
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::amount::PositiveAmount;
    use crate::ledger::TransactionKind;

    #[test]
    fn list_returns_most_recent_records_first_bounded_by_limit() {
        let store = InMemoryLedgerStore::new();
        let alice = account_id("alice");
        for sequence in 1..=5 {
            store.append(record(&alice, sequence)).unwrap();
        }

        let sequences: Vec<u64> = store.list(&alice, 3).unwrap().iter().map(|r| r.sequence).collect();

        assert_eq!(sequences, vec![5, 4, 3]);
    }

    #[test]
    fn list_unknown_account_returns_empty_history() {
        let store = InMemoryLedgerStore::new();
        assert!(store.list(&account_id("nobody"), 10).unwrap().is_empty());
    }

    #[test]
    fn list_keeps_accounts_histories_separated() {
        let store = InMemoryLedgerStore::new();
        let alice = account_id("alice");
        let bob = account_id("bob");
        store.append(record(&alice, 1)).unwrap();
        store.append(record(&bob, 1)).unwrap();
        store.append(record(&bob, 2)).unwrap();

        assert_eq!(store.list(&alice, 10).unwrap().len(), 1);
        assert_eq!(store.list(&bob, 10).unwrap().len(), 2);
    }

    #[test]
    fn append_with_sequence_gap_errors() {
        let store = InMemoryLedgerStore::new();
        let alice = account_id("alice");
        store.append(record(&alice, 1)).unwrap();

        let res = store.append(record(&alice, 3));

        let_assert!(
            Err(LedgerStoreError::OutOfOrder {
                expected_sequence: 2,
                sequence: 3,
                ..
            }) = res
        );
        assert_eq!(store.list(&alice, 10).unwrap().len(), 1);
    }

    #[test]
    fn append_duplicate_sequence_errors() {
        let store = InMemoryLedgerStore::new();
        let alice = account_id("alice");
        store.append(record(&alice, 1)).unwrap();

        let_assert!(Err(LedgerStoreError::OutOfOrder { .. }) = store.append(record(&alice, 1)));
    }

    #[test]
    fn append_first_record_must_have_sequence_one() {
        let store = InMemoryLedgerStore::new();
        let_assert!(Err(LedgerStoreError::OutOfOrder { .. }) = store.append(record(&account_id("alice"), 2)));
    }

    fn record(account_id: &AccountId, sequence: u64) -> TransactionRecord {
        TransactionRecord {
            account_id: account_id.clone(),
            kind: TransactionKind::Deposit,
            amount: PositiveAmount::try_from(Decimal::ONE).unwrap(),
            occurred_at: Utc::now(),
            resulting_balance: Decimal::from(sequence),
            sequence,
        }
    }

    fn account_id(value: &str) -> AccountId {
        AccountId::try_from(value).unwrap()
    }
}
