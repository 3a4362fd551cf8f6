//! Claim lock manager: proportional collateral locks and reserve payouts.
//!
//! Claim adjudication is owned by the external governance collaborator; the
//! shield reacts to its proposal transitions. Each outcome has exactly one
//! collateral-side and one purchase-side path:
//!
//! | transition          | collateral side       | purchase side            |
//! |---------------------|-----------------------|--------------------------|
//! | submitted           | `claim_lock`          | shield debited in lock   |
//! | rejected / expired  | `claim_unlock`        | `restore_shield`         |
//! | approved            | locks forfeited       | recovery scheduled       |
//!
//! Approval runs through `claim_approve`, which forfeits the locks, creates
//! the reserve-funded payout and schedules shield recovery in one call.

use crate::engine::ShieldEngine;
use crate::error::ShieldError;
use crate::state::{LockedCollateral, PendingPayout, RecoveringEntry};
use aegis_types::{mul_div_floor, Address, PoolId, ProposalId, Timestamp};

impl ShieldEngine {
    /// Claim submitted: freeze the purchase and lock proportional collateral.
    ///
    /// Every collateral contributor is locked for a floor-proportional share
    /// of `loss`; the shares sum to exactly `loss`, so the collateral books
    /// stay balanced to the unit.
    pub fn claim_lock(
        &mut self,
        pool_id: PoolId,
        purchaser: &Address,
        loss: u128,
        proposal_id: ProposalId,
    ) -> Result<(), ShieldError> {
        if loss == 0 {
            return Err(ShieldError::ZeroAmount);
        }
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(ShieldError::PoolNotFound(pool_id))?;
        let key = (pool_id, purchaser.clone());
        let purchase = self
            .purchases
            .get(&key)
            .ok_or_else(|| ShieldError::PurchaseNotFound {
                pool_id,
                purchaser: purchaser.to_string(),
            })?;
        if purchase.locked {
            return Err(ShieldError::PurchaseLocked);
        }
        if loss > purchase.shield {
            return Err(ShieldError::InsufficientShield {
                loss,
                shield: purchase.shield,
            });
        }
        if loss > self.global.total_collateral {
            return Err(ShieldError::InsufficientCollateral {
                loss,
                collateral: self.global.total_collateral,
            });
        }
        if self
            .providers
            .values()
            .any(|p| p.locked.iter().any(|l| l.proposal_id == proposal_id))
        {
            return Err(ShieldError::DuplicateLock(proposal_id));
        }
        if self.payouts.contains_key(&proposal_id) {
            return Err(ShieldError::DuplicatePayout(proposal_id));
        }

        let new_pool_shield = pool
            .shield
            .checked_sub(loss)
            .ok_or_else(|| ShieldError::invariant("pool shield below purchase shield"))?;
        let new_total_shield = self
            .global
            .total_shield
            .checked_sub(loss)
            .ok_or_else(|| ShieldError::invariant("total shield below claim loss"))?;
        let new_total_claimed = self
            .global
            .total_claimed
            .checked_add(loss)
            .ok_or(ShieldError::Overflow)?;
        let contributors: Vec<(Address, u128)> = self
            .providers
            .values()
            .filter(|p| p.collateral > 0)
            .map(|p| (p.address.clone(), p.collateral))
            .collect();
        let shares = allocate_proportional(loss, &contributors)?;

        // Apply. Everything below is infallible except corruption checks.
        if let Some(purchase) = self.purchases.get_mut(&key) {
            purchase.shield -= loss;
            purchase.locked = true;
        }
        self.pool_mut(pool_id)?.shield = new_pool_shield;
        self.global.total_shield = new_total_shield;
        self.global.total_claimed = new_total_claimed;
        self.global.total_collateral -= loss;
        for (address, share) in shares {
            let excess = {
                let provider = self.providers.get_mut(&address).ok_or_else(|| {
                    ShieldError::invariant(format!("contributor {address} vanished during lock"))
                })?;
                provider.collateral -= share;
                provider.locked.push(LockedCollateral {
                    proposal_id,
                    amount: share,
                });
                provider.withdrawing.saturating_sub(provider.collateral)
            };
            if excess > 0 {
                // The lock intruded into amounts already queued for release;
                // cancel queue entries so the later drain cannot underflow.
                let trimmed = self.queue.trim_newest(&address, excess);
                if let Some(provider) = self.providers.get_mut(&address) {
                    provider.withdrawing = provider.withdrawing.saturating_sub(trimmed);
                }
                self.global.total_withdrawing =
                    self.global.total_withdrawing.saturating_sub(trimmed);
            }
        }
        tracing::info!(pool = %pool_id, %purchaser, loss, proposal = %proposal_id, "claim locked");
        Ok(())
    }

    /// Claim rejected or expired: return locked collateral to contributors.
    ///
    /// The collateral-side rollback; the purchase side goes through
    /// [`ShieldEngine::restore_shield`].
    pub fn claim_unlock(
        &mut self,
        pool_id: PoolId,
        loss: u128,
        proposal_id: ProposalId,
    ) -> Result<(), ShieldError> {
        if !self.pools.contains_key(&pool_id) {
            return Err(ShieldError::PoolNotFound(pool_id));
        }
        let mut holders: Vec<(Address, u128)> = Vec::new();
        let mut total_locked: u128 = 0;
        for provider in self.providers.values() {
            for lock in provider.locked.iter().filter(|l| l.proposal_id == proposal_id) {
                total_locked = total_locked
                    .checked_add(lock.amount)
                    .ok_or_else(|| ShieldError::invariant("locked total overflow"))?;
                holders.push((provider.address.clone(), lock.amount));
            }
        }
        if holders.is_empty() {
            return Err(ShieldError::LockNotFound(proposal_id));
        }
        if total_locked != loss {
            return Err(ShieldError::invariant(format!(
                "locked total {total_locked} != claim loss {loss} for proposal {proposal_id}"
            )));
        }

        for (address, amount) in &holders {
            let provider = self.providers.get_mut(address).ok_or_else(|| {
                ShieldError::invariant(format!("lock holder {address} vanished during unlock"))
            })?;
            provider.locked.retain(|l| l.proposal_id != proposal_id);
            provider.collateral = provider
                .collateral
                .checked_add(*amount)
                .ok_or_else(|| ShieldError::invariant("collateral overflow on unlock"))?;
        }
        self.global.total_collateral = self
            .global
            .total_collateral
            .checked_add(loss)
            .ok_or_else(|| ShieldError::invariant("total collateral overflow on unlock"))?;
        self.global.total_claimed = self
            .global
            .total_claimed
            .checked_sub(loss)
            .ok_or_else(|| ShieldError::invariant("total claimed underflow on unlock"))?;

        // Stake may have unbonded while the lock was pending; re-check the
        // bonded ceiling for every holder.
        for (address, _) in &holders {
            let bonded = self
                .providers
                .get(address)
                .map(|p| p.delegation_bonded)
                .unwrap_or(0);
            self.reconcile_bonded(address, bonded);
        }
        tracing::info!(pool = %pool_id, loss, proposal = %proposal_id, "claim unlocked");
        Ok(())
    }

    /// Claim rejected or expired: re-credit the purchaser's shield.
    ///
    /// The purchase-side rollback, paired with [`ShieldEngine::claim_unlock`].
    pub fn restore_shield(
        &mut self,
        pool_id: PoolId,
        purchaser: &Address,
        loss: u128,
    ) -> Result<(), ShieldError> {
        let key = (pool_id, purchaser.clone());
        let purchase = self
            .purchases
            .get(&key)
            .ok_or_else(|| ShieldError::PurchaseNotFound {
                pool_id,
                purchaser: purchaser.to_string(),
            })?;
        if !purchase.locked {
            return Err(ShieldError::invariant(format!(
                "shield restore on unlocked purchase ({pool_id}, {purchaser})"
            )));
        }
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(ShieldError::PoolNotFound(pool_id))?;
        let new_purchase_shield = purchase
            .shield
            .checked_add(loss)
            .ok_or(ShieldError::Overflow)?;
        let new_pool_shield = pool.shield.checked_add(loss).ok_or(ShieldError::Overflow)?;
        if new_pool_shield > pool.shield_limit {
            return Err(ShieldError::invariant(
                "shield restore pushes pool above its limit",
            ));
        }
        let new_total_shield = self
            .global
            .total_shield
            .checked_add(loss)
            .ok_or(ShieldError::Overflow)?;

        if let Some(purchase) = self.purchases.get_mut(&key) {
            purchase.shield = new_purchase_shield;
            purchase.locked = false;
        }
        self.pool_mut(pool_id)?.shield = new_pool_shield;
        self.global.total_shield = new_total_shield;
        tracing::info!(pool = %pool_id, %purchaser, loss, "shield restored");
        Ok(())
    }

    /// Claim approved: forfeit the locks, create the reserve-funded payout,
    /// and schedule the shield to recover after the cooldown.
    pub fn claim_approve(
        &mut self,
        pool_id: PoolId,
        purchaser: &Address,
        loss: u128,
        proposal_id: ProposalId,
        now: Timestamp,
    ) -> Result<(), ShieldError> {
        if loss == 0 {
            return Err(ShieldError::ZeroAmount);
        }
        let key = (pool_id, purchaser.clone());
        let purchase = self
            .purchases
            .get(&key)
            .ok_or_else(|| ShieldError::PurchaseNotFound {
                pool_id,
                purchaser: purchaser.to_string(),
            })?;
        if !purchase.locked {
            return Err(ShieldError::invariant(format!(
                "claim approval on unlocked purchase ({pool_id}, {purchaser})"
            )));
        }
        if self.payouts.contains_key(&proposal_id) {
            return Err(ShieldError::DuplicatePayout(proposal_id));
        }
        let mut total_locked: u128 = 0;
        for provider in self.providers.values() {
            for lock in provider.locked.iter().filter(|l| l.proposal_id == proposal_id) {
                total_locked = total_locked
                    .checked_add(lock.amount)
                    .ok_or_else(|| ShieldError::invariant("locked total overflow"))?;
            }
        }
        if total_locked == 0 {
            return Err(ShieldError::LockNotFound(proposal_id));
        }
        if total_locked != loss {
            return Err(ShieldError::invariant(format!(
                "locked total {total_locked} != claim loss {loss} for proposal {proposal_id}"
            )));
        }

        // Forfeit: the aggregates were already debited at lock time, so the
        // entries just disappear from the contributors' books.
        for provider in self.providers.values_mut() {
            provider.locked.retain(|l| l.proposal_id != proposal_id);
        }
        self.payouts.insert(
            proposal_id,
            PendingPayout {
                proposal_id,
                amount: loss,
            },
        );
        if let Some(purchase) = self.purchases.get_mut(&key) {
            purchase.locked = false;
            purchase.recovering.push(RecoveringEntry {
                amount: loss,
                recover_time: now.saturating_add_secs(self.params.recover_period_secs),
            });
        }
        tracing::info!(pool = %pool_id, %purchaser, loss, proposal = %proposal_id, "claim approved");
        Ok(())
    }

    /// Tick stage: pay pending payouts from the reserve, lowest proposal id
    /// first. Partial payouts persist and retry on the next tick.
    pub(crate) fn make_payouts(&mut self) -> Result<(), ShieldError> {
        if self.payouts.is_empty() || self.reserve == 0 {
            return Ok(());
        }
        let ids: Vec<ProposalId> = self.payouts.keys().copied().collect();
        for id in ids {
            if self.reserve == 0 {
                break;
            }
            let due = match self.payouts.get(&id) {
                Some(payout) => payout.amount,
                None => continue,
            };
            let pay = due.min(self.reserve);
            let beneficiary = self.proposals.proposal_beneficiary(id).ok_or_else(|| {
                ShieldError::invariant(format!("no beneficiary for proposal {id}"))
            })?;
            self.bank.move_from_pool_to_account(&beneficiary, pay)?;
            self.reserve -= pay;
            if pay == due {
                self.payouts.remove(&id);
            } else if let Some(payout) = self.payouts.get_mut(&id) {
                payout.amount = due - pay;
            }
            tracing::info!(proposal = %id, amount = pay, remaining = due - pay, "claim payout");
        }
        Ok(())
    }

    /// Credit the reserve from any account. A real token transfer.
    pub fn donate(&mut self, from: &Address, amount: u128) -> Result<(), ShieldError> {
        if amount == 0 {
            return Err(ShieldError::ZeroAmount);
        }
        let new_reserve = self
            .reserve
            .checked_add(amount)
            .ok_or(ShieldError::Overflow)?;
        self.bank.move_from_account_to_pool(from, amount)?;
        self.reserve = new_reserve;
        tracing::debug!(%from, amount, "reserve donation");
        Ok(())
    }
}

/// Deterministic proportional allocation of exactly `loss` across
/// contributors.
///
/// Floor shares first; the remainder goes to contributors in descending
/// collateral order (ties broken by address) bounded by each contributor's
/// headroom, so every share stays within its contributor's collateral and
/// the shares always sum to `loss`.
fn allocate_proportional(
    loss: u128,
    contributors: &[(Address, u128)],
) -> Result<Vec<(Address, u128)>, ShieldError> {
    let mut total: u128 = 0;
    for (_, collateral) in contributors {
        total = total.checked_add(*collateral).ok_or(ShieldError::Overflow)?;
    }
    if loss > total {
        return Err(ShieldError::InsufficientCollateral {
            loss,
            collateral: total,
        });
    }
    let mut shares: Vec<(Address, u128)> = Vec::with_capacity(contributors.len());
    let mut allocated: u128 = 0;
    for (address, collateral) in contributors {
        let share = mul_div_floor(loss, *collateral, total).ok_or(ShieldError::Overflow)?;
        allocated += share;
        shares.push((address.clone(), share));
    }
    let mut remainder = loss - allocated;
    if remainder > 0 {
        let mut order: Vec<usize> = (0..contributors.len()).collect();
        order.sort_by(|&a, &b| {
            contributors[b]
                .1
                .cmp(&contributors[a].1)
                .then_with(|| contributors[a].0.cmp(&contributors[b].0))
        });
        for idx in order {
            if remainder == 0 {
                break;
            }
            let headroom = contributors[idx].1 - shares[idx].1;
            let add = headroom.min(remainder);
            shares[idx].1 += add;
            remainder -= add;
        }
    }
    if remainder > 0 {
        return Err(ShieldError::invariant("claim allocation left a remainder"));
    }
    shares.retain(|(_, share)| *share > 0);
    Ok(shares)
}
