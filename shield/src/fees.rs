//! Service-fee distribution to collateral providers.

use crate::engine::ShieldEngine;
use crate::error::ShieldError;
use aegis_types::{Address, Dec};

impl ShieldEngine {
    /// Tick stage: distribute the accrued fee pool pro rata to collateral.
    ///
    /// A no-op while there is no collateral; fees carry over unchanged.
    /// Shares are computed at 10^-12 precision; whatever rounding leaves
    /// behind stays in the pool for the next block, so fee value is
    /// conserved exactly.
    pub(crate) fn distribute_fees(&mut self) -> Result<(), ShieldError> {
        if self.fee_pool.is_zero() || self.global.total_collateral == 0 {
            return Ok(());
        }
        let pool_at_start = self.fee_pool;
        let total = self.global.total_collateral;
        let mut distributed = Dec::ZERO;
        for provider in self.providers.values_mut() {
            if provider.collateral == 0 {
                continue;
            }
            let share = pool_at_start
                .checked_mul_ratio(provider.collateral, total)
                .ok_or_else(|| ShieldError::invariant("fee share overflow"))?;
            provider.rewards = provider
                .rewards
                .checked_add(share)
                .ok_or(ShieldError::Overflow)?;
            distributed = distributed
                .checked_add(share)
                .ok_or_else(|| ShieldError::invariant("distributed fees overflow"))?;
        }
        self.fee_pool = pool_at_start
            .checked_sub(distributed)
            .ok_or_else(|| ShieldError::invariant("fee distribution exceeded the pool"))?;
        Ok(())
    }

    /// Transfer a provider's accrued rewards, truncated to whole units.
    ///
    /// The sub-integer remainder returns to the fee pool rather than being
    /// destroyed. Returns the amount transferred.
    pub fn withdraw_rewards(&mut self, address: &Address) -> Result<u128, ShieldError> {
        let provider = self
            .providers
            .get(address)
            .ok_or_else(|| ShieldError::ProviderNotFound(address.to_string()))?;
        let whole = provider.rewards.floor_int();
        let remainder = provider.rewards.fract();
        let new_fee_pool = self
            .fee_pool
            .checked_add(remainder)
            .ok_or(ShieldError::Overflow)?;

        if whole > 0 {
            self.bank.move_from_pool_to_account(address, whole)?;
        }
        if let Some(provider) = self.providers.get_mut(address) {
            provider.rewards = Dec::ZERO;
        }
        self.fee_pool = new_fee_pool;
        tracing::debug!(%address, amount = whole, "rewards withdrawn");
        Ok(whole)
    }
}
