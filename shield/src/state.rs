//! Durable record types for the shield ledgers.

use aegis_types::{Address, Dec, PoolId, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

/// A coverage pool: an insurable unit with a shield limit, rate and sponsor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    /// Free-form description of the covered project.
    pub description: String,
    /// Name of the sponsoring project.
    pub sponsor: String,
    pub sponsor_addr: Address,
    /// Closed pools are deactivated in place, never deleted.
    pub active: bool,
    /// Outstanding coverage sold to purchasers.
    pub shield: u128,
    /// Ceiling on `shield`.
    pub shield_limit: u128,
    /// Coverage granted per unit paid.
    pub shield_rate: Dec,
}

/// Collateral held against a contributor while a claim proposal is pending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedCollateral {
    pub proposal_id: ProposalId,
    pub amount: u128,
}

/// A staker pledging already-bonded stake as collateral.
///
/// Created on first deposit or hook event; held at zero, never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub address: Address,
    /// Bonded amount reported by the external staking ledger.
    pub delegation_bonded: u128,
    /// Pledged collateral; stays charged until withdrawals mature.
    pub collateral: u128,
    /// Portion of `collateral` scheduled for release.
    pub withdrawing: u128,
    /// Accrued service-fee rewards, fractional.
    pub rewards: Dec,
    /// Claim locks currently held against this provider.
    pub locked: Vec<LockedCollateral>,
}

impl Provider {
    pub fn new(address: Address, delegation_bonded: u128) -> Self {
        Self {
            address,
            delegation_bonded,
            collateral: 0,
            withdrawing: 0,
            rewards: Dec::ZERO,
            locked: Vec::new(),
        }
    }

    /// Bonded stake not yet pledged; the capacity for new deposits.
    pub fn free_bonded(&self) -> u128 {
        self.delegation_bonded.saturating_sub(self.collateral)
    }

    /// Collateral not already scheduled for withdrawal.
    pub fn free_collateral(&self) -> u128 {
        self.collateral.saturating_sub(self.withdrawing)
    }
}

/// A pending collateral release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub address: Address,
    pub amount: u128,
    pub completion_time: Timestamp,
}

/// A shield amount temporarily removed by a claim, scheduled to return to
/// active coverage once the recovery period elapses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveringEntry {
    pub amount: u128,
    pub recover_time: Timestamp,
}

/// A purchaser's active coverage against a pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub pool_id: PoolId,
    pub purchaser: Address,
    /// Refundable staked principal.
    pub amount: u128,
    /// Active coverage.
    pub shield: u128,
    /// Time of the first purchase; the protection period runs from here.
    pub start_time: Timestamp,
    /// Set while a claim proposal concerning this purchase is pending.
    pub locked: bool,
    /// Recovering coverage, oldest first.
    pub recovering: Vec<RecoveringEntry>,
}

impl Purchase {
    pub fn new(pool_id: PoolId, purchaser: Address, start_time: Timestamp) -> Self {
        Self {
            pool_id,
            purchaser,
            amount: 0,
            shield: 0,
            start_time,
            locked: false,
            recovering: Vec::new(),
        }
    }

    /// Total coverage parked in recovering entries.
    pub fn recovering_total(&self) -> u128 {
        self.recovering
            .iter()
            .fold(0u128, |acc, e| acc.saturating_add(e.amount))
    }
}

/// An approved claim awaiting reserve funds.
///
/// `amount` is monotonically non-increasing; the record is deleted once it
/// reaches zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPayout {
    pub proposal_id: ProposalId,
    pub amount: u128,
}

/// Module-wide aggregates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPools {
    /// Total pledged collateral across all providers.
    pub total_collateral: u128,
    /// Total collateral scheduled for release.
    pub total_withdrawing: u128,
    /// Total active coverage across all pools.
    pub total_shield: u128,
    /// Cumulative losses locked in by claims.
    pub total_claimed: u128,
}
