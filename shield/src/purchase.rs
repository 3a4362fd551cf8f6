//! Purchase and shield-coverage ledger operations.

use crate::engine::ShieldEngine;
use crate::error::ShieldError;
use crate::state::Purchase;
use aegis_types::{bps_amount, mul_div_floor, Address, Dec, PoolId, Timestamp};

impl ShieldEngine {
    /// Buy coverage against a pool.
    ///
    /// The paid amount is a real token transfer into the module: a service
    /// fee share feeds the provider fee pool and the remainder is staked as
    /// refundable principal. Coverage granted is `floor(amount * rate)`.
    pub fn purchase_shield(
        &mut self,
        pool_id: PoolId,
        purchaser: &Address,
        amount: u128,
        description: impl Into<String>,
        now: Timestamp,
    ) -> Result<u128, ShieldError> {
        let description = description.into();
        if amount == 0 {
            return Err(ShieldError::ZeroAmount);
        }
        if description.is_empty() {
            return Err(ShieldError::EmptyField("description"));
        }
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(ShieldError::PoolNotFound(pool_id))?;
        if !pool.active {
            return Err(ShieldError::PoolInactive(pool_id));
        }
        if amount < self.params.min_shield_purchase {
            return Err(ShieldError::PurchaseTooSmall {
                minimum: self.params.min_shield_purchase,
                amount,
            });
        }
        self.add_coverage(pool_id, purchaser, amount, now)
    }

    /// Grant coverage for a paid amount, merging into any existing purchase.
    ///
    /// Validates everything, then transfers, then applies; a rejected call
    /// leaves no partial writes.
    fn add_coverage(
        &mut self,
        pool_id: PoolId,
        purchaser: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, ShieldError> {
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(ShieldError::PoolNotFound(pool_id))?;
        let shield_amt = pool
            .shield_rate
            .mul_int_floor(amount)
            .ok_or(ShieldError::Overflow)?;
        let new_pool_shield = pool
            .shield
            .checked_add(shield_amt)
            .ok_or(ShieldError::Overflow)?;
        if new_pool_shield > pool.shield_limit {
            return Err(ShieldError::PurchaseLimit {
                shield: pool.shield,
                increase: shield_amt,
                limit: pool.shield_limit,
            });
        }

        let fee = bps_amount(amount, self.params.service_fee_bps);
        let staked = amount - fee;
        if staked == 0 {
            return Err(ShieldError::ZeroAmount);
        }

        let key = (pool_id, purchaser.clone());
        let (new_amount, new_shield) = match self.purchases.get(&key) {
            Some(purchase) if purchase.locked => return Err(ShieldError::PurchaseLocked),
            Some(purchase) => (
                purchase
                    .amount
                    .checked_add(staked)
                    .ok_or(ShieldError::Overflow)?,
                purchase
                    .shield
                    .checked_add(shield_amt)
                    .ok_or(ShieldError::Overflow)?,
            ),
            None => (staked, shield_amt),
        };
        let new_total_shield = self
            .global
            .total_shield
            .checked_add(shield_amt)
            .ok_or(ShieldError::Overflow)?;
        let new_fee_pool = self
            .fee_pool
            .checked_add(Dec::checked_from_int(fee).ok_or(ShieldError::Overflow)?)
            .ok_or(ShieldError::Overflow)?;

        // The only fallible effect; everything after it is infallible.
        self.bank.move_from_account_to_pool(purchaser, amount)?;

        let purchase = self
            .purchases
            .entry(key)
            .or_insert_with(|| Purchase::new(pool_id, purchaser.clone(), now));
        purchase.amount = new_amount;
        purchase.shield = new_shield;
        self.pool_mut(pool_id)?.shield = new_pool_shield;
        self.global.total_shield = new_total_shield;
        self.fee_pool = new_fee_pool;
        tracing::debug!(pool = %pool_id, %purchaser, amount, shield = shield_amt, "shield purchased");
        Ok(shield_amt)
    }

    /// Exit coverage, refunding staked principal.
    ///
    /// Coverage shrinks by `floor(amount * (shield + recovering) / principal)`,
    /// consumed from recovering entries oldest-first and then from active
    /// shield. Inside the protection period an early-exit fee is routed to
    /// the reserve.
    pub fn unstake(
        &mut self,
        pool_id: PoolId,
        purchaser: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), ShieldError> {
        if amount == 0 {
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
        if purchase.locked {
            return Err(ShieldError::PurchaseLocked);
        }
        if amount > purchase.amount {
            return Err(ShieldError::OverUnstake {
                needed: amount,
                available: purchase.amount,
            });
        }

        let recovering_total = purchase.recovering_total();
        let covered = purchase
            .shield
            .checked_add(recovering_total)
            .ok_or(ShieldError::Overflow)?;
        let reduction =
            mul_div_floor(amount, covered, purchase.amount).ok_or(ShieldError::Overflow)?;
        let from_recovering = reduction.min(recovering_total);
        let from_active = reduction - from_recovering;

        let in_protection = !purchase
            .start_time
            .has_expired(self.params.protection_period_secs, now);
        let fee = if in_protection {
            bps_amount(amount, self.params.early_exit_fee_bps)
        } else {
            0
        };
        let refund = amount - fee;
        let new_reserve = self.reserve.checked_add(fee).ok_or(ShieldError::Overflow)?;

        let deletes = amount == purchase.amount;
        // Active shield leaving the pool aggregates: the proportional part,
        // plus residual dust when the purchase empties.
        let pool_reduction = if deletes { purchase.shield } else { from_active };
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(ShieldError::PoolNotFound(pool_id))?;
        let new_pool_shield = pool.shield.checked_sub(pool_reduction).ok_or_else(|| {
            ShieldError::invariant("pool shield below its purchase reduction")
        })?;
        let new_total_shield = self
            .global
            .total_shield
            .checked_sub(pool_reduction)
            .ok_or_else(|| ShieldError::invariant("total shield below purchase reduction"))?;

        if refund > 0 {
            self.bank.move_from_pool_to_account(purchaser, refund)?;
        }

        self.reserve = new_reserve;
        if deletes {
            self.purchases.remove(&key);
        } else if let Some(purchase) = self.purchases.get_mut(&key) {
            let mut left = from_recovering;
            purchase.recovering.retain_mut(|entry| {
                if left == 0 {
                    return true;
                }
                let cut = entry.amount.min(left);
                entry.amount -= cut;
                left -= cut;
                entry.amount > 0
            });
            purchase.shield -= from_active;
            purchase.amount -= amount;
        }
        self.pool_mut(pool_id)?.shield = new_pool_shield;
        self.global.total_shield = new_total_shield;
        tracing::debug!(pool = %pool_id, %purchaser, amount, fee, "shield unstaked");
        Ok(())
    }

    /// Tick stage: mature recovering entries back into active coverage.
    pub(crate) fn recover_purchases(&mut self, now: Timestamp) -> Result<(), ShieldError> {
        let mut pool_gain: std::collections::BTreeMap<PoolId, u128> = std::collections::BTreeMap::new();
        let mut total_gain: u128 = 0;
        for purchase in self.purchases.values_mut() {
            let mut matured: u128 = 0;
            for entry in purchase.recovering.iter().filter(|e| e.recover_time <= now) {
                matured = matured
                    .checked_add(entry.amount)
                    .ok_or_else(|| ShieldError::invariant("recovering sum overflow"))?;
            }
            if matured == 0 {
                continue;
            }
            purchase.recovering.retain(|e| e.recover_time > now);
            purchase.shield = purchase
                .shield
                .checked_add(matured)
                .ok_or_else(|| ShieldError::invariant("purchase shield overflow on recovery"))?;
            let slot = pool_gain.entry(purchase.pool_id).or_insert(0);
            *slot = slot
                .checked_add(matured)
                .ok_or_else(|| ShieldError::invariant("pool recovery overflow"))?;
            total_gain = total_gain
                .checked_add(matured)
                .ok_or_else(|| ShieldError::invariant("total recovery overflow"))?;
            tracing::debug!(
                pool = %purchase.pool_id,
                purchaser = %purchase.purchaser,
                amount = matured,
                "shield recovered"
            );
        }
        for (pool_id, gain) in pool_gain {
            let pool = self.pools.get_mut(&pool_id).ok_or_else(|| {
                ShieldError::invariant(format!("pool {pool_id} missing for recovering purchase"))
            })?;
            pool.shield = pool
                .shield
                .checked_add(gain)
                .ok_or_else(|| ShieldError::invariant("pool shield overflow on recovery"))?;
        }
        self.global.total_shield = self
            .global
            .total_shield
            .checked_add(total_gain)
            .ok_or_else(|| ShieldError::invariant("total shield overflow on recovery"))?;
        Ok(())
    }
}
