//! Pool registry operations.

use crate::engine::ShieldEngine;
use crate::error::ShieldError;
use crate::state::Pool;
use aegis_types::{Address, Dec, PoolId};

impl ShieldEngine {
    /// Create a coverage pool. Restricted to the shield admin.
    pub fn create_pool(
        &mut self,
        caller: &Address,
        sponsor: impl Into<String>,
        sponsor_addr: Address,
        description: impl Into<String>,
        shield_limit: u128,
        shield_rate: Dec,
    ) -> Result<PoolId, ShieldError> {
        if *caller != self.admin {
            return Err(ShieldError::Unauthorized);
        }
        let sponsor = sponsor.into();
        if sponsor.is_empty() {
            return Err(ShieldError::EmptyField("sponsor"));
        }
        if shield_limit == 0 || shield_rate.is_zero() {
            return Err(ShieldError::ZeroAmount);
        }
        let id = PoolId::new(self.next_pool_id);
        self.next_pool_id += 1;
        self.pools.insert(
            id,
            Pool {
                id,
                description: description.into(),
                sponsor,
                sponsor_addr,
                active: true,
                shield: 0,
                shield_limit,
                shield_rate,
            },
        );
        tracing::info!(pool = %id, limit = shield_limit, "pool created");
        Ok(id)
    }

    /// Resize or re-describe a pool. Restricted to the shield admin.
    ///
    /// The limit may not drop below outstanding coverage plus scheduled
    /// recovery, and the pool must have no purchase frozen by a pending
    /// claim, so the shield ceiling stays satisfiable through every
    /// lifecycle path.
    pub fn update_pool(
        &mut self,
        caller: &Address,
        pool_id: PoolId,
        shield_limit: u128,
        description: Option<String>,
    ) -> Result<(), ShieldError> {
        if *caller != self.admin {
            return Err(ShieldError::Unauthorized);
        }
        if !self.pools.contains_key(&pool_id) {
            return Err(ShieldError::PoolNotFound(pool_id));
        }
        if self
            .purchases
            .values()
            .any(|p| p.pool_id == pool_id && p.locked)
        {
            return Err(ShieldError::PurchaseLocked);
        }
        let outstanding = self.pool_outstanding(pool_id)?;
        if shield_limit < outstanding {
            return Err(ShieldError::ShrinkBelowShield {
                limit: shield_limit,
                outstanding,
            });
        }
        let pool = self.pool_mut(pool_id)?;
        pool.shield_limit = shield_limit;
        if let Some(description) = description {
            pool.description = description;
        }
        tracing::info!(pool = %pool_id, limit = shield_limit, "pool updated");
        Ok(())
    }

    /// Tick stage: deactivate pools whose shield and limit both reached zero.
    pub(crate) fn close_empty_pools(&mut self) {
        for pool in self.pools.values_mut() {
            if pool.active && pool.shield == 0 && pool.shield_limit == 0 {
                pool.active = false;
                tracing::info!(pool = %pool.id, "pool closed");
            }
        }
    }

    /// Outstanding coverage of a pool: active shield plus scheduled recovery.
    fn pool_outstanding(&self, pool_id: PoolId) -> Result<u128, ShieldError> {
        let pool = self
            .pools
            .get(&pool_id)
            .ok_or(ShieldError::PoolNotFound(pool_id))?;
        let mut outstanding = pool.shield;
        for purchase in self.purchases.values().filter(|p| p.pool_id == pool_id) {
            outstanding = outstanding
                .checked_add(purchase.recovering_total())
                .ok_or(ShieldError::Overflow)?;
        }
        Ok(outstanding)
    }
}
