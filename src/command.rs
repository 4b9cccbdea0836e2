use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Deserializer;

use crate::identity::Credential;

/// One row of the batch input `type,account,token,amount,limit`.
///
/// Amounts are kept as supplied: rejecting non-positive ones is the engine's job.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Command {
    Open { account: String, token: Credential },
    Deposit { token: Credential, amount: Decimal },
    Withdraw { token: Credential, amount: Decimal },
    Balance { token: Credential },
    History { token: Credential, limit: Option<usize> },
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CsvRow {
            r#type: String,
            account: Option<String>,
            token: String,
            #[serde(default, with = "rust_decimal::serde::str_option")]
            amount: Option<Decimal>,
            limit: Option<usize>,
        }

        let row = CsvRow::deserialize(deserializer)?;
        let token = Credential::new(row.token);

        let command = match row.r#type.as_str() {
            "open" => row.account.map_or_else(
                || Err(serde::de::Error::missing_field("account")),
                |account| Ok(Self::Open { account, token }),
            ),
            "deposit" => row.amount.map_or_else(
                || Err(serde::de::Error::missing_field("amount")),
                |amount| Ok(Self::Deposit { token, amount }),
            ),
            "withdraw" => row.amount.map_or_else(
                || Err(serde::de::Error::missing_field("amount")),
                |amount| Ok(Self::Withdraw { token, amount }),
            ),
            "balance" => Ok(Self::Balance { token }),
            "history" => Ok(Self::History { token, limit: row.limit }),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["open", "deposit", "withdraw", "balance", "history"],
            )),
        }?;

        Ok(command)
    }
}
