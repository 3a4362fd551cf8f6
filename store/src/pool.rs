//! Pool record storage trait.

use crate::StoreError;
use aegis_types::PoolId;

/// Byte-valued pool records keyed by pool id.
///
/// Pools are closed in place, never deleted, so there is no delete.
pub trait PoolStore {
    fn put_pool(&self, id: PoolId, bytes: &[u8]) -> Result<(), StoreError>;

    fn get_pool(&self, id: PoolId) -> Result<Option<Vec<u8>>, StoreError>;

    /// All pool records in ascending id order.
    fn iter_pools(&self) -> Result<Vec<(PoolId, Vec<u8>)>, StoreError>;
}
