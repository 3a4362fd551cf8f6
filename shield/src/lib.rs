//! AEGIS shield: a collateral-backed coverage-pool accounting engine.
//!
//! Stakers pledge already-bonded stake as collateral backing coverage pools;
//! purchasers buy coverage against that collateral; claims are adjudicated by
//! an external governance process and settled from a reserve while
//! proportional collateral shares stay locked.
//!
//! The engine is strictly deterministic: ordered maps, checked integer and
//! fixed-point arithmetic, and the host-supplied block timestamp as the only
//! clock. All external effects (token transfers, bonded-amount reads,
//! proposal lookups) go through the injected [`adapters`].

mod claims;
mod collateral;
mod fees;
mod persist;
mod pool;
mod purchase;

pub mod adapters;
pub mod engine;
pub mod error;
pub mod queue;
pub mod state;

pub use adapters::{BankAdapter, ProposalRegistry, StakingView, TransferError};
pub use engine::{ShieldEngine, ShieldStatus};
pub use error::ShieldError;
pub use queue::WithdrawalQueue;
pub use state::{
    GlobalPools, LockedCollateral, PendingPayout, Pool, Provider, Purchase, RecoveringEntry,
    Withdraw,
};
