//! Balance mutation engine.
//!
//! Provides [`LedgerEngine`] which applies deposits and withdrawals to an [`crate::account::AccountStore`]
//! and records them in a [`crate::ledger::LedgerStore`], keeping the two in agreement under concurrent access.
//! [`audit`] private module provides the full replay check of an account history.

mod audit;
pub mod ledger_engine;

pub use audit::AuditReport;
pub use ledger_engine::LedgerEngine;
pub use ledger_engine::LedgerError;
