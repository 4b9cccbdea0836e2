use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::account::AccountId;
use crate::amount::PositiveAmount;

#[derive(Debug, Copy, Clone, PartialEq, Eq, parse_display::Display)]
#[display(style = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    /// Applies `amount` to `balance` in the direction implied by the kind.
    ///
    /// Returns [`None`] on overflow or if a withdrawal would leave `balance` negative.
    pub fn apply(self, balance: Decimal, amount: PositiveAmount) -> Option<Decimal> {
        match self {
            Self::Deposit => balance.checked_add(amount.as_inner()),
            Self::Withdraw => balance
                .checked_sub(amount.as_inner())
                .filter(|new_balance| !new_balance.is_sign_negative()),
        }
    }
}

/// An applied delta, immutable once appended.
///
/// `sequence` is the account version the delta produced: the first record of an account has sequence 1 and
/// every following one increments it by exactly one.
#[derive(Debug, Clone, PartialEq, Eq, parse_display::Display)]
#[display("tx=({kind} account_id={account_id} amount={amount} resulting_balance={resulting_balance} sequence={sequence})")]
pub struct TransactionRecord {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: PositiveAmount,
    pub occurred_at: DateTime<Utc>,
    pub resulting_balance: Decimal,
    pub sequence: u64,
}
