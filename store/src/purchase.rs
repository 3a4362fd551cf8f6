//! Purchase record storage trait.

use crate::StoreError;
use aegis_types::{Address, PoolId};

/// Byte-valued purchase records keyed by `(pool, purchaser)`.
///
/// A purchase is deleted once its staked amount reaches zero.
pub trait PurchaseStore {
    fn put_purchase(
        &self,
        pool_id: PoolId,
        purchaser: &Address,
        bytes: &[u8],
    ) -> Result<(), StoreError>;

    fn get_purchase(
        &self,
        pool_id: PoolId,
        purchaser: &Address,
    ) -> Result<Option<Vec<u8>>, StoreError>;

    fn delete_purchase(&self, pool_id: PoolId, purchaser: &Address) -> Result<(), StoreError>;

    /// All purchase records in ascending `(pool, purchaser)` order.
    fn iter_purchases(&self) -> Result<Vec<(PoolId, Address, Vec<u8>)>, StoreError>;
}
