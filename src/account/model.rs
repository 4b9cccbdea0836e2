use rust_decimal::Decimal;
use serde::Serialize;

const MIN_ACCOUNT_ID_LEN: usize = 3;
const MAX_ACCOUNT_ID_LEN: usize = 50;

/// Stable identifier of an account, a username made of `[A-Za-z0-9_]`.
#[derive(Debug, Serialize, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
#[serde(transparent)]
pub struct AccountId(String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidAccountId {
    #[error("account id length must be between {} and {} value={value:?}", MIN_ACCOUNT_ID_LEN, MAX_ACCOUNT_ID_LEN)]
    Length { value: String },
    #[error("account id must only contain alphanumeric characters or '_' value={value:?}")]
    Charset { value: String },
}

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if !(MIN_ACCOUNT_ID_LEN..=MAX_ACCOUNT_ID_LEN).contains(&trimmed.chars().count()) {
            return Err(InvalidAccountId::Length { value: value.into() });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(InvalidAccountId::Charset { value: value.into() });
        }
        Ok(Self(trimmed.into()))
    }
}

impl std::str::FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Point-in-time view of an account as stored.
///
/// `version` counts the deltas applied since creation and is what the ledger sequence is checked against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, parse_display::Display)]
#[display("(balance={balance} version={version})")]
pub struct AccountSnapshot {
    pub balance: Decimal,
    pub version: u64,
}

impl AccountSnapshot {
    pub const OPENING: Self = Self {
        balance: Decimal::ZERO,
        version: 0,
    };

    /// The snapshot produced by applying one more delta that leads to `balance`.
    pub const fn next(self, balance: Decimal) -> Self {
        Self {
            balance,
            version: self.version + 1,
        }
    }
}
