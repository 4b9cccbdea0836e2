use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Deserializer;

/// A strictly positive [`Decimal`] magnitude.
///
/// This permits to avoid checks on non-positive amounts while applying deltas: the sign is implied by the
/// [`crate::ledger::TransactionKind`] the amount travels with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, parse_display::Display)]
pub struct PositiveAmount(Decimal);

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("amount must be strictly positive value={value}")]
pub struct InvalidAmount {
    pub value: Decimal,
}

impl TryFrom<Decimal> for PositiveAmount {
    type Error = InvalidAmount;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() || value.is_zero() {
            return Err(InvalidAmount { value });
        }
        Ok(Self(value))
    }
}

impl PositiveAmount {
    pub const fn as_inner(&self) -> Decimal {
        self.0
    }
}

impl<'de> Deserialize<'de> for PositiveAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let decimal = <Decimal as serde::Deserialize>::deserialize(deserializer)?;
        Self::try_from(decimal).map_err(|error| serde::de::Error::custom(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0.0001")]
    #[case("1")]
    #[case("150.25")]
    fn try_from_accepts_strictly_positive_values(#[case] value: &str) {
        let value = Decimal::from_str(value).unwrap();
        assert2::let_assert!(Ok(amount) = PositiveAmount::try_from(value));
        assert_eq!(amount.as_inner(), value);
    }

    #[rstest]
    #[case("0")]
    #[case("0.000")]
    #[case("-0.01")]
    #[case("-100")]
    fn try_from_rejects_non_positive_values(#[case] value: &str) {
        let value = Decimal::from_str(value).unwrap();
        assert2::let_assert!(Err(InvalidAmount { value: rejected }) = PositiveAmount::try_from(value));
        assert_eq!(rejected, value);
    }
}
