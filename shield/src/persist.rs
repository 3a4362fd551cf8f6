//! Engine persistence over the abstract store traits.
//!
//! Snapshot semantics: every record currently in memory is written, records
//! deleted since the last save are reconciled away, and the singletons land
//! under fixed meta keys. `save_to_store` followed by `load_from_store` is
//! the identity on engine state.

use std::collections::BTreeSet;

use crate::adapters::{BankAdapter, ProposalRegistry, StakingView};
use crate::engine::ShieldEngine;
use crate::error::ShieldError;
use crate::queue::WithdrawalQueue;
use crate::state::Withdraw;
use aegis_store::{ShieldStore, StoreError};
use aegis_types::{Address, Dec, ShieldParams, Timestamp};

const META_GLOBAL: &[u8] = b"global_pools";
const META_RESERVE: &[u8] = b"reserve";
const META_FEE_POOL: &[u8] = b"fee_pool";
const META_NEXT_POOL_ID: &[u8] = b"next_pool_id";
const META_NEXT_WITHDRAW_SEQ: &[u8] = b"next_withdraw_seq";

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ShieldError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()).into())
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ShieldError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()).into())
}

impl ShieldEngine {
    /// Persist the full engine state to a store.
    pub fn save_to_store(&self, store: &dyn ShieldStore) -> Result<(), ShieldError> {
        // Reconcile deletions first so the store mirrors memory exactly.
        for (pool_id, purchaser, _) in store.iter_purchases()? {
            if !self.purchases.contains_key(&(pool_id, purchaser.clone())) {
                store.delete_purchase(pool_id, &purchaser)?;
            }
        }
        let live_withdrawals: BTreeSet<(Timestamp, u64)> =
            self.queue.iter().map(|(key, _)| *key).collect();
        for (completion, seq, _) in store.iter_withdrawals()? {
            if !live_withdrawals.contains(&(completion, seq)) {
                store.delete_withdrawal(completion, seq)?;
            }
        }
        for (proposal_id, _) in store.iter_payouts()? {
            if !self.payouts.contains_key(&proposal_id) {
                store.delete_payout(proposal_id)?;
            }
        }

        for (address, provider) in &self.providers {
            store.put_provider(address, &encode(provider)?)?;
        }
        for (id, pool) in &self.pools {
            store.put_pool(*id, &encode(pool)?)?;
        }
        for ((pool_id, purchaser), purchase) in &self.purchases {
            store.put_purchase(*pool_id, purchaser, &encode(purchase)?)?;
        }
        for (&(completion, seq), withdraw) in self.queue.iter() {
            store.put_withdrawal(completion, seq, &encode(withdraw)?)?;
        }
        for (proposal_id, payout) in &self.payouts {
            store.put_payout(*proposal_id, &encode(payout)?)?;
        }

        store.put_meta(META_GLOBAL, &encode(&self.global)?)?;
        store.put_meta(META_RESERVE, &self.reserve.to_be_bytes())?;
        store.put_meta(META_FEE_POOL, &self.fee_pool.raw().to_be_bytes())?;
        store.put_meta(META_NEXT_POOL_ID, &self.next_pool_id.to_be_bytes())?;
        store.put_meta(META_NEXT_WITHDRAW_SEQ, &self.queue.next_seq().to_be_bytes())?;
        Ok(())
    }

    /// Restore an engine from a store written by [`ShieldEngine::save_to_store`].
    pub fn load_from_store(
        params: ShieldParams,
        admin: Address,
        bank: Box<dyn BankAdapter>,
        staking: Box<dyn StakingView>,
        proposals: Box<dyn ProposalRegistry>,
        store: &dyn ShieldStore,
    ) -> Result<Self, ShieldError> {
        let mut engine = Self::new(params, admin, bank, staking, proposals);

        for (address, bytes) in store.iter_providers()? {
            engine.providers.insert(address, decode(&bytes)?);
        }
        for (id, bytes) in store.iter_pools()? {
            engine.pools.insert(id, decode(&bytes)?);
        }
        for (pool_id, purchaser, bytes) in store.iter_purchases()? {
            engine
                .purchases
                .insert((pool_id, purchaser), decode(&bytes)?);
        }
        let mut entries: Vec<(Timestamp, u64, Withdraw)> = Vec::new();
        for (completion, seq, bytes) in store.iter_withdrawals()? {
            entries.push((completion, seq, decode(&bytes)?));
        }
        let next_seq = match store.get_meta(META_NEXT_WITHDRAW_SEQ)? {
            Some(bytes) if bytes.len() >= 8 => u64::from_be_bytes(bytes[..8].try_into().unwrap()),
            _ => entries.iter().map(|(_, seq, _)| seq + 1).max().unwrap_or(0),
        };
        engine.queue = WithdrawalQueue::restore(entries, next_seq);
        for (proposal_id, bytes) in store.iter_payouts()? {
            engine.payouts.insert(proposal_id, decode(&bytes)?);
        }

        if let Some(bytes) = store.get_meta(META_GLOBAL)? {
            engine.global = decode(&bytes)?;
        }
        engine.reserve = match store.get_meta(META_RESERVE)? {
            Some(bytes) if bytes.len() >= 16 => {
                u128::from_be_bytes(bytes[..16].try_into().unwrap())
            }
            _ => 0,
        };
        engine.fee_pool = match store.get_meta(META_FEE_POOL)? {
            Some(bytes) if bytes.len() >= 16 => {
                Dec::from_raw(u128::from_be_bytes(bytes[..16].try_into().unwrap()))
            }
            _ => Dec::ZERO,
        };
        engine.next_pool_id = match store.get_meta(META_NEXT_POOL_ID)? {
            Some(bytes) if bytes.len() >= 8 => u64::from_be_bytes(bytes[..8].try_into().unwrap()),
            _ => engine.pools.keys().map(|id| id.raw() + 1).max().unwrap_or(1),
        };
        Ok(engine)
    }
}
