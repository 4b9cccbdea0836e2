use rust_decimal::Decimal;

use crate::account::AccountId;
use crate::account::AccountStore;
use crate::engine::LedgerEngine;
use crate::engine::LedgerError;
use crate::engine::ledger_engine::Attempt;
use crate::engine::ledger_engine::inconsistency;
use crate::ledger::LedgerStore;
use crate::ledger::TransactionKind;

/// Summary of an account whose full history replays to its stored balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub account_id: AccountId,
    pub balance: Decimal,
    pub records: usize,
    pub deposited: Decimal,
    pub withdrawn: Decimal,
}

impl<A, L> LedgerEngine<A, L>
where
    A: AccountStore,
    L: LedgerStore,
{
    /// Replays the whole history of `account_id` oldest first and checks it against the stored balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist ([`LedgerError::AccountNotFound`]).
    /// - Any record breaks the sequence or the resulting balance chain, or the replay does not end on the
    ///   stored balance ([`LedgerError::LedgerInconsistency`]).
    /// - Concurrent writers exhausted the retry budget ([`LedgerError::Unavailable`]).
    pub fn audit(&self, account_id: &AccountId) -> Result<AuditReport, LedgerError> {
        self.with_settled_view(account_id, usize::MAX, |snapshot, mut records| {
            records.reverse();

            let mut report = AuditReport {
                account_id: account_id.clone(),
                balance: Decimal::ZERO,
                records: 0,
                deposited: Decimal::ZERO,
                withdrawn: Decimal::ZERO,
            };

            for (expected_sequence, record) in (1_u64..).zip(&records) {
                if record.sequence != expected_sequence {
                    return Err(inconsistency(
                        account_id,
                        format!("expected sequence={expected_sequence} found {record}"),
                    ));
                }
                let previous = report.balance;
                report.balance = record
                    .kind
                    .apply(previous, record.amount)
                    .filter(|replayed| *replayed == record.resulting_balance)
                    .ok_or_else(|| {
                        inconsistency(
                            account_id,
                            format!("replayed balance={previous} does not lead to {record}"),
                        )
                    })?;
                match record.kind {
                    TransactionKind::Deposit => report.deposited += record.amount.as_inner(),
                    TransactionKind::Withdraw => report.withdrawn += record.amount.as_inner(),
                }
                report.records += 1;
            }

            if report.balance != snapshot.balance {
                return Err(inconsistency(
                    account_id,
                    format!("replayed balance={} differs from account {snapshot}", report.balance),
                ));
            }

            Ok(Attempt::Done(report))
        })
    }
}
