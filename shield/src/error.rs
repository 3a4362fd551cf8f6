//! Shield error taxonomy.

use aegis_store::StoreError;
use aegis_types::{PoolId, ProposalId};
use thiserror::Error;

/// Errors returned by shield operations.
///
/// Every variant except `Invariant` is recoverable: the offending call is
/// rejected with no state mutation. `Invariant` means the ledger is corrupted;
/// it is deterministic on every replica and the host must abort the current
/// block rather than swallow it.
#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("amount must be positive")]
    ZeroAmount,

    #[error("required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("purchase below minimum: need {minimum}, got {amount}")]
    PurchaseTooSmall { minimum: u128, amount: u128 },

    #[error("operation restricted to the shield admin")]
    Unauthorized,

    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    #[error("provider {0} not found")]
    ProviderNotFound(String),

    #[error("no purchase by {purchaser} in pool {pool_id}")]
    PurchaseNotFound { pool_id: PoolId, purchaser: String },

    #[error("no collateral lock recorded for proposal {0}")]
    LockNotFound(ProposalId),

    #[error("insufficient bonded stake: need {needed}, have {available}")]
    InsufficientStaking { needed: u128, available: u128 },

    #[error("withdrawal exceeds free collateral: need {needed}, have {available}")]
    OverWithdraw { needed: u128, available: u128 },

    #[error("pool {0} is closed")]
    PoolInactive(PoolId),

    #[error("purchase is locked by a pending claim")]
    PurchaseLocked,

    #[error("purchase would exceed the pool limit: shield {shield} + {increase} > {limit}")]
    PurchaseLimit {
        shield: u128,
        increase: u128,
        limit: u128,
    },

    #[error("unstake exceeds staked principal: need {needed}, have {available}")]
    OverUnstake { needed: u128, available: u128 },

    #[error("claim loss exceeds purchase shield: loss {loss}, shield {shield}")]
    InsufficientShield { loss: u128, shield: u128 },

    #[error("claim loss exceeds total collateral: loss {loss}, collateral {collateral}")]
    InsufficientCollateral { loss: u128, collateral: u128 },

    #[error("a collateral lock for proposal {0} already exists")]
    DuplicateLock(ProposalId),

    #[error("a pending payout for proposal {0} already exists")]
    DuplicatePayout(ProposalId),

    #[error("shield limit {limit} below outstanding coverage {outstanding}")]
    ShrinkBelowShield { limit: u128, outstanding: u128 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error(transparent)]
    Transfer(#[from] crate::adapters::TransferError),

    /// Ledger corruption. The host must abort the current block.
    #[error("invariant violation: {detail}")]
    Invariant { detail: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ShieldError {
    /// True for errors that must abort the block rather than just the call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShieldError::Invariant { .. })
    }

    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        ShieldError::Invariant {
            detail: detail.into(),
        }
    }
}
