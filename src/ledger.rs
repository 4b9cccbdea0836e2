//! Append-only per-account history of applied balance deltas.

pub mod in_memory;
pub mod record;
pub mod store;

pub use in_memory::InMemoryLedgerStore;
pub use record::TransactionKind;
pub use record::TransactionRecord;
pub use store::LedgerStore;
pub use store::LedgerStoreError;
