//! Pending payout storage trait.

use crate::StoreError;
use aegis_types::ProposalId;

/// Byte-valued pending payouts keyed by proposal id.
pub trait PayoutStore {
    fn put_payout(&self, proposal_id: ProposalId, bytes: &[u8]) -> Result<(), StoreError>;

    fn get_payout(&self, proposal_id: ProposalId) -> Result<Option<Vec<u8>>, StoreError>;

    fn delete_payout(&self, proposal_id: ProposalId) -> Result<(), StoreError>;

    /// All pending payouts in ascending proposal-id order.
    fn iter_payouts(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError>;
}
