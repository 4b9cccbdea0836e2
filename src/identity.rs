//! Credential to [`AccountId`] resolution.
//!
//! The ledger never inspects credentials: callers hand an opaque [`Credential`] to an [`IdentityResolver`]
//! and only the resolved [`AccountId`] reaches the engine.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::account::AccountId;

/// Opaque caller credential, e.g. a bearer token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("authentication failed")]
pub struct AuthenticationFailed;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("credential already registered")]
pub struct CredentialAlreadyRegistered;

pub trait IdentityResolver: Send + Sync {
    /// # Errors
    ///
    /// - [`AuthenticationFailed`] if `credential` does not identify any account.
    fn resolve(&self, credential: &Credential) -> Result<AccountId, AuthenticationFailed>;
}

/// In-memory [`IdentityResolver`] over tokens issued elsewhere.
#[derive(Debug, Default)]
pub struct TokenTable {
    tokens: DashMap<Credential, AccountId>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `credential` to `account_id`.
    ///
    /// # Errors
    ///
    /// - [`CredentialAlreadyRegistered`] if `credential` is already bound, the existing binding is kept.
    pub fn register(&self, credential: Credential, account_id: AccountId) -> Result<(), CredentialAlreadyRegistered> {
        match self.tokens.entry(credential) {
            Entry::Occupied(_) => Err(CredentialAlreadyRegistered),
            Entry::Vacant(vacant) => {
                vacant.insert(account_id);
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, credential: &Credential) -> bool {
        self.tokens.contains_key(credential)
    }
}

impl IdentityResolver for TokenTable {
    fn resolve(&self, credential: &Credential) -> Result<AccountId, AuthenticationFailed> {
        self.tokens
            .get(credential)
            .map(|account_id| account_id.clone())
            .ok_or(AuthenticationFailed)
    }
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;

    use super::*;

    #[test]
    fn resolve_registered_credential_returns_its_account() {
        let table = TokenTable::new();
        let alice = AccountId::try_from("alice").unwrap();
        table.register(Credential::new("tok-alice"), alice.clone()).unwrap();

        assert!(table.is_registered(&Credential::new("tok-alice")));
        assert_eq!(table.resolve(&Credential::new("tok-alice")), Ok(alice));
    }

    #[test]
    fn resolve_unknown_credential_fails() {
        let table = TokenTable::new();
        let credential = Credential::new("tok-alice");

        assert!(!table.is_registered(&credential));
        let_assert!(Err(AuthenticationFailed) = table.resolve(&credential));
    }

    #[test]
    fn register_bound_credential_errors_and_keeps_the_first_binding() {
        let table = TokenTable::new();
        let alice = AccountId::try_from("alice").unwrap();
        table.register(Credential::new("tok-alice"), alice.clone()).unwrap();

        let res = table.register(Credential::new("tok-alice"), AccountId::try_from("mallory").unwrap());

        assert_eq!(res, Err(CredentialAlreadyRegistered));
        assert_eq!(table.resolve(&Credential::new("tok-alice")), Ok(alice));
    }

    #[test]
    fn credential_debug_does_not_leak_the_secret() {
        let rendered = format!("{:?}", Credential::new("s3cr3t"));
        assert!(!rendered.contains("s3cr3t"), "rendered={rendered}");
    }
}
