//! Provider record storage trait.

use crate::StoreError;
use aegis_types::Address;

/// Byte-valued provider records keyed by address.
///
/// Providers are held at zero rather than deleted, so there is no delete.
pub trait ProviderStore {
    fn put_provider(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError>;

    fn get_provider(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError>;

    /// All provider records in ascending address order.
    fn iter_providers(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError>;
}
