//! Provider and collateral ledger operations, plus the staking hooks.

use crate::engine::ShieldEngine;
use crate::error::ShieldError;
use crate::state::{Provider, Withdraw};
use aegis_types::{Address, Timestamp};

impl ShieldEngine {
    /// Pledge already-bonded stake as collateral.
    ///
    /// No token transfer occurs: collateral is an accounting claim against
    /// stake bonded in the external staking ledger. The provider record is
    /// created on first use.
    pub fn deposit_collateral(&mut self, address: &Address, amount: u128) -> Result<(), ShieldError> {
        if amount == 0 {
            return Err(ShieldError::ZeroAmount);
        }
        let bonded = self.staking.bonded_amount(address);
        let collateral = self
            .providers
            .get(address)
            .map(|p| p.collateral)
            .unwrap_or(0);
        let available = bonded.saturating_sub(collateral);
        if amount > available {
            return Err(ShieldError::InsufficientStaking {
                needed: amount,
                available,
            });
        }
        let new_collateral = collateral.checked_add(amount).ok_or(ShieldError::Overflow)?;
        let new_total = self
            .global
            .total_collateral
            .checked_add(amount)
            .ok_or(ShieldError::Overflow)?;

        let provider = self
            .providers
            .entry(address.clone())
            .or_insert_with(|| Provider::new(address.clone(), bonded));
        provider.delegation_bonded = bonded;
        provider.collateral = new_collateral;
        self.global.total_collateral = new_total;
        tracing::debug!(%address, amount, "collateral deposited");
        Ok(())
    }

    /// Request a timed release of pledged collateral.
    ///
    /// The collateral stays charged (at risk) until the queue drain at
    /// `now + withdraw_period`; only the free portion shrinks immediately.
    pub fn withdraw_collateral(
        &mut self,
        address: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), ShieldError> {
        if amount == 0 {
            return Err(ShieldError::ZeroAmount);
        }
        let provider = self
            .providers
            .get_mut(address)
            .ok_or_else(|| ShieldError::ProviderNotFound(address.to_string()))?;
        let available = provider.free_collateral();
        if amount > available {
            return Err(ShieldError::OverWithdraw {
                needed: amount,
                available,
            });
        }
        let new_withdrawing = provider
            .withdrawing
            .checked_add(amount)
            .ok_or(ShieldError::Overflow)?;
        let new_total = self
            .global
            .total_withdrawing
            .checked_add(amount)
            .ok_or(ShieldError::Overflow)?;

        provider.withdrawing = new_withdrawing;
        self.global.total_withdrawing = new_total;
        let completion_time = now.saturating_add_secs(self.params.withdraw_period_secs);
        self.queue.enqueue(Withdraw {
            address: address.clone(),
            amount,
            completion_time,
        });
        tracing::debug!(%address, amount, %completion_time, "collateral withdrawal enqueued");
        Ok(())
    }

    /// Tick stage: release every withdrawal due at or before `now`.
    ///
    /// Entry removal is the completion marker, so re-running for the same
    /// timestamp is a no-op. The release always happens on the provider
    /// side; pool lifecycle has no bearing on it.
    pub(crate) fn drain_withdrawals(&mut self, now: Timestamp) -> Result<(), ShieldError> {
        for w in self.queue.drain_due(now) {
            let provider = self.providers.get_mut(&w.address).ok_or_else(|| {
                ShieldError::invariant(format!(
                    "provider {} missing while its collateral is being withdrawn",
                    w.address
                ))
            })?;
            provider.collateral = provider.collateral.checked_sub(w.amount).ok_or_else(|| {
                ShieldError::invariant(format!(
                    "withdrawal {} exceeds provider {} collateral",
                    w.amount, w.address
                ))
            })?;
            provider.withdrawing = provider.withdrawing.checked_sub(w.amount).ok_or_else(|| {
                ShieldError::invariant(format!(
                    "withdrawal {} exceeds provider {} withdrawing",
                    w.amount, w.address
                ))
            })?;
            self.global.total_collateral = self
                .global
                .total_collateral
                .checked_sub(w.amount)
                .ok_or_else(|| ShieldError::invariant("total collateral underflow on drain"))?;
            self.global.total_withdrawing = self
                .global
                .total_withdrawing
                .checked_sub(w.amount)
                .ok_or_else(|| ShieldError::invariant("total withdrawing underflow on drain"))?;
            tracing::debug!(address = %w.address, amount = w.amount, "collateral released");
        }
        Ok(())
    }

    /// Staking hook: the bonded amount behind `address` changed.
    ///
    /// Invoked synchronously by the staking collaborator inside its own state
    /// transition; it must never fail and is total over all provider states.
    pub fn after_bonded_amount_changed(&mut self, address: &Address) {
        let bonded = self.staking.bonded_amount(address);
        self.reconcile_bonded(address, bonded);
    }

    /// Staking hook: a delegation behind `address` is about to be removed.
    pub fn before_delegation_removed(&mut self, address: &Address) {
        let bonded = self.staking.bonded_amount(address);
        self.reconcile_bonded(address, bonded);
    }

    /// Force collateral back under the bonded ceiling.
    ///
    /// The shortfall is taken first from queued withdrawals (newest first;
    /// the backing stake is gone, so cancelled entries release nothing
    /// later) and then from free collateral. All aggregates are adjusted in
    /// the same call, so `collateral <= bonded` holds again immediately.
    pub(crate) fn reconcile_bonded(&mut self, address: &Address, new_bonded: u128) {
        if !self.providers.contains_key(address) {
            // First sighting of this address: start tracking it at zero.
            self.providers
                .insert(address.clone(), Provider::new(address.clone(), new_bonded));
            return;
        }
        let Some(provider) = self.providers.get_mut(address) else {
            return;
        };
        provider.delegation_bonded = new_bonded;
        if provider.collateral <= new_bonded {
            return;
        }
        let mut shortfall = provider.collateral - new_bonded;
        let trimmed = self.queue.trim_newest(address, shortfall.min(provider.withdrawing));
        if trimmed > 0 {
            provider.withdrawing = provider.withdrawing.saturating_sub(trimmed);
            provider.collateral = provider.collateral.saturating_sub(trimmed);
            self.global.total_withdrawing = self.global.total_withdrawing.saturating_sub(trimmed);
            self.global.total_collateral = self.global.total_collateral.saturating_sub(trimmed);
            shortfall -= trimmed;
        }
        if shortfall > 0 {
            provider.collateral = provider.collateral.saturating_sub(shortfall);
            self.global.total_collateral = self.global.total_collateral.saturating_sub(shortfall);
        }
        tracing::warn!(%address, new_bonded, "collateral force-reduced after bonded decrease");
    }
}
