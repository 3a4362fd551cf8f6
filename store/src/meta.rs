//! Named singleton storage trait.
//!
//! Holds the reserve, the fee pool, the global aggregate and the engine
//! counters under fixed byte names.

use crate::StoreError;

pub trait MetaStore {
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
}
