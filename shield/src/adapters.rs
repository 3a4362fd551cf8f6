//! Collaborator interfaces injected at engine construction.
//!
//! The consensus host owns accounts, bonding and governance; the shield
//! reaches them only through these traits. Implementations must be
//! deterministic and synchronous.

use aegis_types::{Address, ProposalId};
use thiserror::Error;

/// A token movement rejected by the host's account layer.
#[derive(Debug, Error)]
#[error("transfer failed: {0}")]
pub struct TransferError(pub String);

/// Token movement between user accounts and the shield module account.
///
/// These are the only real token transfers the shield performs; collateral
/// itself is an accounting claim and never moves tokens.
pub trait BankAdapter {
    fn move_from_account_to_pool(&self, from: &Address, amount: u128)
        -> Result<(), TransferError>;

    fn move_from_pool_to_account(&self, to: &Address, amount: u128) -> Result<(), TransferError>;
}

/// Read-only view of the external bonding ledger.
pub trait StakingView {
    fn bond_denom(&self) -> String;

    /// Currently bonded amount for `address`; zero if unknown.
    fn bonded_amount(&self, address: &Address) -> u128;
}

/// Read-only view of the governance proposal registry.
pub trait ProposalRegistry {
    fn proposal_beneficiary(&self, proposal_id: ProposalId) -> Option<Address>;
}
