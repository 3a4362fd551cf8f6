//! Nullable collaborators for deterministic testing.
//!
//! Every external dependency of the shield engine (bank, staking ledger,
//! proposal registry, storage) sits behind a trait; this crate provides
//! in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! The handles are cheaply cloneable and share state, so a test can keep a
//! clone while the engine owns the boxed adapter.

pub mod bank;
pub mod proposals;
pub mod staking;
pub mod store;

pub use bank::NullBank;
pub use proposals::NullProposals;
pub use staking::NullStaking;
pub use store::MemoryStore;
