//! Account ledger: per-account balances and their append-only transaction history.
//!
//! [`service::AuthenticatedLedger`] resolves callers through an [`identity::IdentityResolver`] and drives
//! the [`engine::LedgerEngine`], which keeps an [`account::AccountStore`] and a [`ledger::LedgerStore`] in
//! agreement under concurrent deposits and withdrawals.

pub mod account;
pub mod amount;
pub mod command;
pub mod config;
pub mod engine;
pub mod identity;
pub mod ledger;
pub mod logging;
pub mod service;
