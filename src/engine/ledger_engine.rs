use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::account::AccountId;
use crate::account::AccountSnapshot;
use crate::account::AccountStore;
use crate::account::AccountStoreError;
use crate::account::InvalidAccountId;
use crate::amount::InvalidAmount;
use crate::amount::PositiveAmount;
use crate::config::HistoryConfig;
use crate::config::RetryConfig;
use crate::ledger::LedgerStore;
use crate::ledger::LedgerStoreError;
use crate::ledger::TransactionKind;
use crate::ledger::TransactionRecord;

#[cfg(test)]
#[path = "tests/ledger_engine_tests.rs"]
mod ledger_engine_tests;

/// Applies balance deltas over an [`AccountStore`] and a [`LedgerStore`].
///
/// The engine owns no account state: every call reads the stores, and mutations go through an optimistic
/// compare-and-swap on the [`AccountSnapshot`] followed by the ledger append. Before mutating, the account
/// version is checked against the ledger head sequence so that a delta without a record is never built upon.
pub struct LedgerEngine<A, L> {
    accounts: A,
    ledger: L,
    retry: RetryConfig,
    history: HistoryConfig,
}

/// Outcome of one optimistic attempt over a settled view of an account.
pub(in crate::engine) enum Attempt<T> {
    Done(T),
    Conflict,
}

enum Observation {
    Settled {
        snapshot: AccountSnapshot,
        records: Vec<TransactionRecord>,
    },
    AppendPending(AccountSnapshot),
    Busy,
}

impl<A, L> LedgerEngine<A, L>
where
    A: AccountStore,
    L: LedgerStore,
{
    pub fn new(accounts: A, ledger: L, retry: RetryConfig, history: HistoryConfig) -> Self {
        Self {
            accounts,
            ledger,
            retry,
            history,
        }
    }

    /// Opens `account_id` with a zero balance and an empty history.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountAlreadyExists`] if the account was already opened.
    pub fn create_account(&self, account_id: &AccountId) -> Result<(), LedgerError> {
        self.accounts.create(account_id, AccountSnapshot::OPENING)?;
        debug!(%account_id, "account created");
        Ok(())
    }

    /// Adds `amount` to the balance of `account_id` and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `amount` is not strictly positive ([`LedgerError::InvalidAmount`]).
    /// - The account does not exist ([`LedgerError::AccountNotFound`]).
    /// - The new balance overflows ([`LedgerError::BalanceOverflow`]).
    /// - Concurrent writers exhausted the retry budget ([`LedgerError::Unavailable`]).
    /// - Balance and ledger diverged ([`LedgerError::LedgerInconsistency`]).
    pub fn deposit(&self, account_id: &AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        let amount = PositiveAmount::try_from(amount)?;
        self.apply(account_id, TransactionKind::Deposit, amount)
    }

    /// Subtracts `amount` from the balance of `account_id` and returns the new balance.
    ///
    /// A rejected withdrawal leaves both balance and ledger untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `amount` is not strictly positive ([`LedgerError::InvalidAmount`]).
    /// - The account does not exist ([`LedgerError::AccountNotFound`]).
    /// - The balance is lower than `amount` ([`LedgerError::InsufficientFunds`]).
    /// - Concurrent writers exhausted the retry budget ([`LedgerError::Unavailable`]).
    /// - Balance and ledger diverged ([`LedgerError::LedgerInconsistency`]).
    pub fn withdraw(&self, account_id: &AccountId, amount: Decimal) -> Result<Decimal, LedgerError> {
        let amount = PositiveAmount::try_from(amount)?;
        self.apply(account_id, TransactionKind::Withdraw, amount)
    }

    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] if the account does not exist.
    pub fn balance(&self, account_id: &AccountId) -> Result<Decimal, LedgerError> {
        Ok(self.accounts.get(account_id)?.balance)
    }

    /// Returns the most recent records of `account_id`, newest first.
    ///
    /// `limit` defaults to the configured default and is clamped to the configured maximum.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] if the account does not exist.
    /// - [`LedgerError::LedgerStorage`] if the ledger cannot be read.
    pub fn history(&self, account_id: &AccountId, limit: Option<usize>) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.accounts.get(account_id)?;
        let limit = self.history.effective_limit(limit);
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.ledger.list(account_id, limit)?)
    }

    fn apply(
        &self,
        account_id: &AccountId,
        kind: TransactionKind,
        amount: PositiveAmount,
    ) -> Result<Decimal, LedgerError> {
        self.with_settled_view(account_id, 1, |current, records| {
            let new_balance = kind.apply(current.balance, amount).ok_or_else(|| match kind {
                TransactionKind::Deposit => LedgerError::BalanceOverflow {
                    account_id: account_id.clone(),
                    balance: current.balance,
                    amount,
                },
                TransactionKind::Withdraw => LedgerError::InsufficientFunds {
                    account_id: account_id.clone(),
                    balance: current.balance,
                    amount,
                },
            })?;
            let next = current.next(new_balance);

            match self.accounts.compare_and_swap(account_id, current, next) {
                Ok(()) => {}
                Err(AccountStoreError::Conflict { current: newer, .. }) => {
                    debug!(%account_id, expected = %current, current = %newer, "balance write conflict");
                    return Ok(Attempt::Conflict);
                }
                Err(other) => return Err(other.into()),
            }

            // Timestamps never go backwards within an account even if the wall clock does.
            let now = Utc::now();
            let occurred_at = records.first().map_or(now, |head| now.max(head.occurred_at));
            let record = TransactionRecord {
                account_id: account_id.clone(),
                kind,
                amount,
                occurred_at,
                resulting_balance: new_balance,
                sequence: next.version,
            };

            if let Err(source) = self.ledger.append(record.clone()) {
                return Err(inconsistency(
                    account_id,
                    format!("balance write {next} has no ledger record, append failed: {source}"),
                ));
            }
            debug!(%record, "delta applied");

            Ok(Attempt::Done(new_balance))
        })
    }

    /// Runs `attempt` over a view where the account snapshot and its ledger head agree, retrying on
    /// concurrent activity within the [`RetryConfig`] budget.
    ///
    /// A ledger append still in flight does not consume the budget: the view is awaited until the gap has
    /// persisted for [`RetryConfig::stranded_after`], after which the account is declared inconsistent.
    ///
    /// `records` handed to `attempt` are the `limit` most recent ones, newest first.
    pub(in crate::engine) fn with_settled_view<T>(
        &self,
        account_id: &AccountId,
        limit: usize,
        mut attempt: impl FnMut(AccountSnapshot, Vec<TransactionRecord>) -> Result<Attempt<T>, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut conflicts = 0;
        let mut pending: Option<(AccountSnapshot, Instant)> = None;

        loop {
            match self.observe(account_id, limit)? {
                Observation::Settled { snapshot, records } => {
                    pending = None;
                    if let Attempt::Done(value) = attempt(snapshot, records)? {
                        return Ok(value);
                    }
                    conflicts += 1;
                }
                Observation::AppendPending(snapshot) => {
                    let since = match pending {
                        Some((seen, since)) if seen == snapshot => since,
                        _ => Instant::now(),
                    };
                    let pending_for = since.elapsed();
                    if pending_for >= self.retry.stranded_after() {
                        return Err(inconsistency(
                            account_id,
                            format!(
                                "account {snapshot} has no ledger record for its last delta after {}ms",
                                pending_for.as_millis()
                            ),
                        ));
                    }
                    debug!(%account_id, %snapshot, ?pending_for, "ledger append pending");
                    pending = Some((snapshot, since));
                }
                Observation::Busy => {
                    pending = None;
                    conflicts += 1;
                }
            }

            if conflicts >= self.retry.max_attempts {
                warn!(%account_id, max_attempts = self.retry.max_attempts, "retry budget exhausted");
                return Err(LedgerError::Unavailable {
                    account_id: account_id.clone(),
                });
            }
            self.retry.pause(conflicts.max(1));
        }
    }

    /// Reads the account, its ledger head and the account again.
    ///
    /// With an unchanged snapshot around the ledger read, the only legitimate divergence is a single record
    /// whose append is still in flight.
    fn observe(&self, account_id: &AccountId, limit: usize) -> Result<Observation, LedgerError> {
        let before = self.accounts.get(account_id)?;
        let records = self.ledger.list(account_id, limit.max(1))?;
        let snapshot = self.accounts.get(account_id)?;

        if before != snapshot {
            return Ok(Observation::Busy);
        }

        let (head_sequence, head_balance) = records
            .first()
            .map_or((0, Decimal::ZERO), |head| (head.sequence, head.resulting_balance));

        if head_sequence == snapshot.version {
            if head_balance != snapshot.balance {
                return Err(inconsistency(
                    account_id,
                    format!("account {snapshot} differs from ledger head resulting_balance={head_balance}"),
                ));
            }
            return Ok(Observation::Settled { snapshot, records });
        }

        if head_sequence + 1 == snapshot.version {
            return Ok(Observation::AppendPending(snapshot));
        }

        Err(inconsistency(
            account_id,
            format!("account {snapshot} does not match ledger head sequence={head_sequence}"),
        ))
    }
}

pub(in crate::engine) fn inconsistency(account_id: &AccountId, reason: String) -> LedgerError {
    error!(%account_id, %reason, "ledger inconsistency detected, account mutations halted");
    LedgerError::LedgerInconsistency {
        account_id: account_id.clone(),
        reason,
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    InvalidAmount(#[from] InvalidAmount),
    #[error(transparent)]
    InvalidAccountId(#[from] InvalidAccountId),
    #[error("account not found account_id={account_id}")]
    AccountNotFound { account_id: AccountId },
    #[error("account already exists account_id={account_id}")]
    AccountAlreadyExists { account_id: AccountId },
    #[error("insufficient funds, need {amount} with balance={balance} in account_id={account_id}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Decimal,
        amount: PositiveAmount,
    },
    #[error("overflow while applying {amount} to balance={balance} in account_id={account_id}")]
    BalanceOverflow {
        account_id: AccountId,
        balance: Decimal,
        amount: PositiveAmount,
    },
    #[error("account unavailable, too many concurrent modifications account_id={account_id}")]
    Unavailable { account_id: AccountId },
    #[error("ledger inconsistency account_id={account_id}, reason={reason}")]
    LedgerInconsistency { account_id: AccountId, reason: String },
    #[error(transparent)]
    LedgerStorage(#[from] LedgerStoreError),
}

impl From<AccountStoreError> for LedgerError {
    fn from(error: AccountStoreError) -> Self {
        match error {
            AccountStoreError::NotFound { account_id } => Self::AccountNotFound { account_id },
            AccountStoreError::AlreadyExists { account_id } => Self::AccountAlreadyExists { account_id },
            AccountStoreError::Conflict { account_id, .. } => Self::Unavailable { account_id },
        }
    }
}
