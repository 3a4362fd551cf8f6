//! Abstract storage traits for the AEGIS shield.
//!
//! Every storage backend (a host key-value store, an in-memory store for
//! testing) implements these traits. The rest of the workspace depends only
//! on the traits; the engine owns the record encoding, backends only move
//! bytes. Iteration methods return key-sorted vectors so replay is
//! deterministic.

pub mod error;
pub mod meta;
pub mod payout;
pub mod pool;
pub mod provider;
pub mod purchase;
pub mod withdrawal;

pub use error::StoreError;
pub use meta::MetaStore;
pub use payout::PayoutStore;
pub use pool::PoolStore;
pub use provider::ProviderStore;
pub use purchase::PurchaseStore;
pub use withdrawal::WithdrawalStore;

/// Union of every trait the shield engine persists through.
pub trait ShieldStore:
    ProviderStore + PoolStore + PurchaseStore + WithdrawalStore + PayoutStore + MetaStore
{
}

impl<T> ShieldStore for T where
    T: ProviderStore + PoolStore + PurchaseStore + WithdrawalStore + PayoutStore + MetaStore
{
}
