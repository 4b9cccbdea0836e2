//! Account identity and authoritative balance storage.
//!
//! [`AccountStore`] is the only owner of an account balance; [`in_memory::InMemoryAccountStore`] is the
//! concurrent implementation shipped with the crate.

pub mod in_memory;
pub mod model;
pub mod store;

pub use in_memory::InMemoryAccountStore;
pub use model::AccountId;
pub use model::AccountSnapshot;
pub use model::InvalidAccountId;
pub use store::AccountStore;
pub use store::AccountStoreError;
