//! Withdrawal queue storage trait.

use crate::StoreError;
use aegis_types::Timestamp;

/// Byte-valued withdrawal entries keyed by `(completion_time, sequence)`.
///
/// The explicit sequence number carries FIFO order within a completion-time
/// bucket; backends must never substitute encoding order for it.
pub trait WithdrawalStore {
    fn put_withdrawal(
        &self,
        completion: Timestamp,
        sequence: u64,
        bytes: &[u8],
    ) -> Result<(), StoreError>;

    fn delete_withdrawal(&self, completion: Timestamp, sequence: u64) -> Result<(), StoreError>;

    /// All entries in ascending `(completion_time, sequence)` order.
    fn iter_withdrawals(&self) -> Result<Vec<(Timestamp, u64, Vec<u8>)>, StoreError>;
}
