//! The shield engine: every ledger plus the per-block tick.

use std::collections::BTreeMap;

use crate::adapters::{BankAdapter, ProposalRegistry, StakingView};
use crate::error::ShieldError;
use crate::queue::WithdrawalQueue;
use crate::state::{GlobalPools, PendingPayout, Pool, Provider, Purchase};
use aegis_types::{Address, Dec, PoolId, ProposalId, ShieldParams, Timestamp};

/// The shield engine.
///
/// Single-threaded and deterministic: ordered maps everywhere iteration feeds
/// arithmetic, checked integer and fixed-point math, and the caller-supplied
/// block timestamp as the only clock. Mutations are visible to later calls in
/// the same block immediately; durability is the host's concern (see
/// [`ShieldEngine::save_to_store`]).
pub struct ShieldEngine {
    pub(crate) params: ShieldParams,
    pub(crate) admin: Address,
    pub(crate) bank: Box<dyn BankAdapter>,
    pub(crate) staking: Box<dyn StakingView>,
    pub(crate) proposals: Box<dyn ProposalRegistry>,

    pub(crate) providers: BTreeMap<Address, Provider>,
    pub(crate) pools: BTreeMap<PoolId, Pool>,
    pub(crate) purchases: BTreeMap<(PoolId, Address), Purchase>,
    pub(crate) queue: WithdrawalQueue,
    pub(crate) payouts: BTreeMap<ProposalId, PendingPayout>,
    pub(crate) reserve: u128,
    pub(crate) fee_pool: Dec,
    pub(crate) global: GlobalPools,
    pub(crate) next_pool_id: u64,
}

impl ShieldEngine {
    pub fn new(
        params: ShieldParams,
        admin: Address,
        bank: Box<dyn BankAdapter>,
        staking: Box<dyn StakingView>,
        proposals: Box<dyn ProposalRegistry>,
    ) -> Self {
        Self {
            params,
            admin,
            bank,
            staking,
            proposals,
            providers: BTreeMap::new(),
            pools: BTreeMap::new(),
            purchases: BTreeMap::new(),
            queue: WithdrawalQueue::new(),
            payouts: BTreeMap::new(),
            reserve: 0,
            fee_pool: Dec::ZERO,
            global: GlobalPools::default(),
            next_pool_id: 1,
        }
    }

    /// The per-block entry point.
    ///
    /// Stages run in fixed order: queue drain, purchase recovery, fee
    /// distribution, reserve payouts, pool closure. Every stage is a no-op
    /// for a timestamp that has already been fully processed, so the call is
    /// safely re-entrant.
    pub fn tick(&mut self, now: Timestamp) -> Result<(), ShieldError> {
        self.drain_withdrawals(now)?;
        self.recover_purchases(now)?;
        self.distribute_fees()?;
        self.make_payouts()?;
        self.close_empty_pools();
        Ok(())
    }

    // ── Read-only queries ────────────────────────────────────────────────

    pub fn params(&self) -> &ShieldParams {
        &self.params
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn pool(&self, id: PoolId) -> Option<&Pool> {
        self.pools.get(&id)
    }

    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    pub fn provider(&self, address: &Address) -> Option<&Provider> {
        self.providers.get(address)
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.values()
    }

    pub fn purchase(&self, pool_id: PoolId, purchaser: &Address) -> Option<&Purchase> {
        self.purchases.get(&(pool_id, purchaser.clone()))
    }

    pub fn purchases(&self) -> impl Iterator<Item = &Purchase> {
        self.purchases.values()
    }

    pub fn reserve(&self) -> u128 {
        self.reserve
    }

    pub fn fee_pool(&self) -> Dec {
        self.fee_pool
    }

    pub fn global_pools(&self) -> &GlobalPools {
        &self.global
    }

    pub fn pending_payout(&self, proposal_id: ProposalId) -> Option<&PendingPayout> {
        self.payouts.get(&proposal_id)
    }

    pub fn pending_payouts(&self) -> impl Iterator<Item = &PendingPayout> {
        self.payouts.values()
    }

    pub fn withdrawals(&self) -> &WithdrawalQueue {
        &self.queue
    }

    /// Aggregate snapshot of the whole module.
    pub fn status(&self) -> ShieldStatus {
        ShieldStatus {
            global: self.global.clone(),
            reserve: self.reserve,
            fee_pool: self.fee_pool,
            pools: self.pools.len() as u64,
            active_pools: self.pools.values().filter(|p| p.active).count() as u64,
            providers: self.providers.len() as u64,
            purchases: self.purchases.len() as u64,
            pending_withdrawals: self.queue.len() as u64,
            pending_payout_total: self
                .payouts
                .values()
                .fold(0u128, |acc, p| acc.saturating_add(p.amount)),
        }
    }

    // ── Invariants ───────────────────────────────────────────────────────

    /// Verify the ledger invariants that must hold at every block boundary.
    ///
    /// A failure here is corruption, not a user error: the host must abort
    /// the block.
    pub fn check_invariants(&self) -> Result<(), ShieldError> {
        let mut sum_collateral: u128 = 0;
        let mut sum_withdrawing: u128 = 0;
        for p in self.providers.values() {
            if p.collateral > p.delegation_bonded {
                return Err(ShieldError::invariant(format!(
                    "provider {} collateral {} exceeds bonded {}",
                    p.address, p.collateral, p.delegation_bonded
                )));
            }
            if p.withdrawing > p.collateral {
                return Err(ShieldError::invariant(format!(
                    "provider {} withdrawing {} exceeds collateral {}",
                    p.address, p.withdrawing, p.collateral
                )));
            }
            let queued = self.queue.pending_for(&p.address);
            if queued != p.withdrawing {
                return Err(ShieldError::invariant(format!(
                    "provider {} queue total {} != withdrawing {}",
                    p.address, queued, p.withdrawing
                )));
            }
            sum_collateral = sum_collateral
                .checked_add(p.collateral)
                .ok_or_else(|| ShieldError::invariant("collateral sum overflow"))?;
            sum_withdrawing = sum_withdrawing
                .checked_add(p.withdrawing)
                .ok_or_else(|| ShieldError::invariant("withdrawing sum overflow"))?;
        }
        if sum_collateral != self.global.total_collateral {
            return Err(ShieldError::invariant(format!(
                "collateral sum {} != total {}",
                sum_collateral, self.global.total_collateral
            )));
        }
        if sum_withdrawing != self.global.total_withdrawing {
            return Err(ShieldError::invariant(format!(
                "withdrawing sum {} != total {}",
                sum_withdrawing, self.global.total_withdrawing
            )));
        }

        let mut sum_shield: u128 = 0;
        for pool in self.pools.values() {
            if pool.shield > pool.shield_limit {
                return Err(ShieldError::invariant(format!(
                    "pool {} shield {} exceeds limit {}",
                    pool.id, pool.shield, pool.shield_limit
                )));
            }
            sum_shield = sum_shield
                .checked_add(pool.shield)
                .ok_or_else(|| ShieldError::invariant("shield sum overflow"))?;
        }
        if sum_shield != self.global.total_shield {
            return Err(ShieldError::invariant(format!(
                "shield sum {} != total {}",
                sum_shield, self.global.total_shield
            )));
        }

        let mut per_pool: BTreeMap<PoolId, u128> = BTreeMap::new();
        for purchase in self.purchases.values() {
            let slot = per_pool.entry(purchase.pool_id).or_insert(0);
            *slot = slot
                .checked_add(purchase.shield)
                .ok_or_else(|| ShieldError::invariant("purchase shield sum overflow"))?;
        }
        for pool_id in per_pool.keys() {
            if !self.pools.contains_key(pool_id) {
                return Err(ShieldError::invariant(format!(
                    "purchases reference missing pool {pool_id}"
                )));
            }
        }
        for pool in self.pools.values() {
            let expected = per_pool.get(&pool.id).copied().unwrap_or(0);
            if pool.shield != expected {
                return Err(ShieldError::invariant(format!(
                    "pool {} shield {} != purchase sum {}",
                    pool.id, pool.shield, expected
                )));
            }
        }

        for payout in self.payouts.values() {
            if payout.amount == 0 {
                return Err(ShieldError::invariant(format!(
                    "zero pending payout for proposal {}",
                    payout.proposal_id
                )));
            }
        }
        Ok(())
    }

    // ── Internal accessors ───────────────────────────────────────────────

    pub(crate) fn pool_mut(&mut self, id: PoolId) -> Result<&mut Pool, ShieldError> {
        self.pools.get_mut(&id).ok_or(ShieldError::PoolNotFound(id))
    }
}

/// Aggregate snapshot for status queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShieldStatus {
    pub global: GlobalPools,
    pub reserve: u128,
    pub fee_pool: Dec,
    pub pools: u64,
    pub active_pools: u64,
    pub providers: u64,
    pub purchases: u64,
    pub pending_withdrawals: u64,
    pub pending_payout_total: u128,
}
