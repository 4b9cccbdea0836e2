//! Token authenticated front door of the [`LedgerEngine`].
//!
//! Every operation on an existing account takes a [`Credential`]: the account it acts on is whatever the
//! [`IdentityResolver`] says, never an identifier supplied alongside the request.

use rust_decimal::Decimal;

use crate::account::AccountId;
use crate::account::AccountStore;
use crate::engine::LedgerEngine;
use crate::engine::LedgerError;
use crate::identity::AuthenticationFailed;
use crate::identity::Credential;
use crate::identity::IdentityResolver;
use crate::ledger::LedgerStore;
use crate::ledger::TransactionRecord;

pub struct AuthenticatedLedger<R, A, L> {
    resolver: R,
    engine: LedgerEngine<A, L>,
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationFailed),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl<R, A, L> AuthenticatedLedger<R, A, L>
where
    R: IdentityResolver,
    A: AccountStore,
    L: LedgerStore,
{
    pub fn new(resolver: R, engine: LedgerEngine<A, L>) -> Self {
        Self { resolver, engine }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn engine(&self) -> &LedgerEngine<A, L> {
        &self.engine
    }

    /// Registers a new account named `account_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `account_id` is not a valid identifier ([`LedgerError::InvalidAccountId`]).
    /// - The account already exists ([`LedgerError::AccountAlreadyExists`]).
    pub fn open_account(&self, account_id: &str) -> Result<AccountId, ServiceError> {
        let account_id = AccountId::try_from(account_id).map_err(LedgerError::from)?;
        self.engine.create_account(&account_id)?;
        Ok(account_id)
    }

    /// # Errors
    ///
    /// [`ServiceError::Authentication`] or any error of [`LedgerEngine::deposit`].
    pub fn deposit(&self, credential: &Credential, amount: Decimal) -> Result<Decimal, ServiceError> {
        let account_id = self.resolver.resolve(credential)?;
        Ok(self.engine.deposit(&account_id, amount)?)
    }

    /// # Errors
    ///
    /// [`ServiceError::Authentication`] or any error of [`LedgerEngine::withdraw`].
    pub fn withdraw(&self, credential: &Credential, amount: Decimal) -> Result<Decimal, ServiceError> {
        let account_id = self.resolver.resolve(credential)?;
        Ok(self.engine.withdraw(&account_id, amount)?)
    }

    /// # Errors
    ///
    /// [`ServiceError::Authentication`] or any error of [`LedgerEngine::balance`].
    pub fn balance(&self, credential: &Credential) -> Result<Decimal, ServiceError> {
        let account_id = self.resolver.resolve(credential)?;
        Ok(self.engine.balance(&account_id)?)
    }

    /// # Errors
    ///
    /// [`ServiceError::Authentication`] or any error of [`LedgerEngine::history`].
    pub fn history(
        &self,
        credential: &Credential,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionRecord>, ServiceError> {
        let account_id = self.resolver.resolve(credential)?;
        Ok(self.engine.history(&account_id, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;
    use rust_decimal::Decimal;

    use super::*;
    use crate::account::InMemoryAccountStore;
    use crate::config::HistoryConfig;
    use crate::config::RetryConfig;
    use crate::identity::TokenTable;
    use crate::ledger::InMemoryLedgerStore;

    type TestLedger = AuthenticatedLedger<TokenTable, InMemoryAccountStore, InMemoryLedgerStore>;

    #[test]
    fn operations_act_on_the_resolved_account() {
        let service = setup_service();
        let alice = service.open_account("alice").unwrap();
        let bob = service.open_account("bob").unwrap();
        service.resolver().register(Credential::new("tok-alice"), alice.clone()).unwrap();
        service.resolver().register(Credential::new("tok-bob"), bob.clone()).unwrap();

        service.deposit(&Credential::new("tok-alice"), Decimal::TEN).unwrap();
        service.deposit(&Credential::new("tok-bob"), Decimal::ONE).unwrap();
        service.withdraw(&Credential::new("tok-alice"), Decimal::TWO).unwrap();

        assert_eq!(service.balance(&Credential::new("tok-alice")).unwrap(), Decimal::from(8));
        assert_eq!(service.balance(&Credential::new("tok-bob")).unwrap(), Decimal::ONE);
        assert_eq!(service.history(&Credential::new("tok-alice"), None).unwrap().len(), 2);
        assert_eq!(service.engine().balance(&bob).unwrap(), Decimal::ONE);
    }

    #[test]
    fn unknown_credential_is_rejected_before_touching_the_ledger() {
        let service = setup_service();
        let alice = service.open_account("alice").unwrap();

        let res = service.deposit(&Credential::new("forged"), Decimal::TEN);

        let_assert!(Err(ServiceError::Authentication(AuthenticationFailed)) = res);
        assert_eq!(service.engine().balance(&alice).unwrap(), Decimal::ZERO);
        assert!(service.engine().history(&alice, None).unwrap().is_empty());
    }

    #[test]
    fn open_account_with_invalid_id_errors() {
        let service = setup_service();
        let_assert!(Err(ServiceError::Ledger(LedgerError::InvalidAccountId(_))) = service.open_account("a b"));
    }

    #[test]
    fn open_account_twice_errors() {
        let service = setup_service();
        service.open_account("alice").unwrap();
        let_assert!(
            Err(ServiceError::Ledger(LedgerError::AccountAlreadyExists { account_id })) = service.open_account("alice")
        );
        assert_eq!(account_id.as_str(), "alice");
    }

    fn setup_service() -> TestLedger {
        AuthenticatedLedger::new(
            TokenTable::new(),
            LedgerEngine::new(
                InMemoryAccountStore::new(),
                InMemoryLedgerStore::new(),
                RetryConfig::default(),
                HistoryConfig::default(),
            ),
        )
    }
}
