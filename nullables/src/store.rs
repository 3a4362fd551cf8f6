//! In-memory shield store: the deterministic reference backend.
//!
//! Ordered maps behind a mutex: iteration is always key-ascending, nothing
//! touches disk, and clones share state so a test can inspect the store the
//! engine wrote to.

use aegis_store::{
    MetaStore, PayoutStore, PoolStore, ProviderStore, PurchaseStore, StoreError, WithdrawalStore,
};
use aegis_types::{Address, PoolId, ProposalId, Timestamp};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    providers: BTreeMap<Address, Vec<u8>>,
    pools: BTreeMap<PoolId, Vec<u8>>,
    purchases: BTreeMap<(PoolId, Address), Vec<u8>>,
    withdrawals: BTreeMap<(Timestamp, u64), Vec<u8>>,
    payouts: BTreeMap<ProposalId, Vec<u8>>,
    meta: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// An in-memory store implementing every shield storage trait.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProviderStore for MemoryStore {
    fn put_provider(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .providers
            .insert(address.clone(), bytes.to_vec());
        Ok(())
    }

    fn get_provider(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().unwrap().providers.get(address).cloned())
    }

    fn iter_providers(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .providers
            .iter()
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect())
    }
}

impl PoolStore for MemoryStore {
    fn put_pool(&self, id: PoolId, bytes: &[u8]) -> Result<(), StoreError> {
        self.inner.lock().unwrap().pools.insert(id, bytes.to_vec());
        Ok(())
    }

    fn get_pool(&self, id: PoolId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().unwrap().pools.get(&id).cloned())
    }

    fn iter_pools(&self) -> Result<Vec<(PoolId, Vec<u8>)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .pools
            .iter()
            .map(|(id, b)| (*id, b.clone()))
            .collect())
    }
}

impl PurchaseStore for MemoryStore {
    fn put_purchase(
        &self,
        pool_id: PoolId,
        purchaser: &Address,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .purchases
            .insert((pool_id, purchaser.clone()), bytes.to_vec());
        Ok(())
    }

    fn get_purchase(
        &self,
        pool_id: PoolId,
        purchaser: &Address,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .purchases
            .get(&(pool_id, purchaser.clone()))
            .cloned())
    }

    fn delete_purchase(&self, pool_id: PoolId, purchaser: &Address) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .purchases
            .remove(&(pool_id, purchaser.clone()));
        Ok(())
    }

    fn iter_purchases(&self) -> Result<Vec<(PoolId, Address, Vec<u8>)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .purchases
            .iter()
            .map(|((id, a), b)| (*id, a.clone(), b.clone()))
            .collect())
    }
}

impl WithdrawalStore for MemoryStore {
    fn put_withdrawal(
        &self,
        completion: Timestamp,
        sequence: u64,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .withdrawals
            .insert((completion, sequence), bytes.to_vec());
        Ok(())
    }

    fn delete_withdrawal(&self, completion: Timestamp, sequence: u64) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .withdrawals
            .remove(&(completion, sequence));
        Ok(())
    }

    fn iter_withdrawals(&self) -> Result<Vec<(Timestamp, u64, Vec<u8>)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .withdrawals
            .iter()
            .map(|(&(t, s), b)| (t, s, b.clone()))
            .collect())
    }
}

impl PayoutStore for MemoryStore {
    fn put_payout(&self, proposal_id: ProposalId, bytes: &[u8]) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .payouts
            .insert(proposal_id, bytes.to_vec());
        Ok(())
    }

    fn get_payout(&self, proposal_id: ProposalId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().unwrap().payouts.get(&proposal_id).cloned())
    }

    fn delete_payout(&self, proposal_id: ProposalId) -> Result<(), StoreError> {
        self.inner.lock().unwrap().payouts.remove(&proposal_id);
        Ok(())
    }

    fn iter_payouts(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .payouts
            .iter()
            .map(|(id, b)| (*id, b.clone()))
            .collect())
    }
}

impl MetaStore for MemoryStore {
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .meta
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().unwrap().meta.get(key).cloned())
    }
}
