//! Nullable proposal registry with programmable beneficiaries.

use aegis_shield::adapters::ProposalRegistry;
use aegis_types::{Address, ProposalId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// An in-memory proposal registry for testing. Clones share state.
#[derive(Clone, Default)]
pub struct NullProposals {
    beneficiaries: Arc<Mutex<BTreeMap<ProposalId, Address>>>,
}

impl NullProposals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the beneficiary paid when `proposal_id` is approved.
    pub fn set_beneficiary(&self, proposal_id: ProposalId, address: &Address) {
        self.beneficiaries
            .lock()
            .unwrap()
            .insert(proposal_id, address.clone());
    }
}

impl ProposalRegistry for NullProposals {
    fn proposal_beneficiary(&self, proposal_id: ProposalId) -> Option<Address> {
        self.beneficiaries.lock().unwrap().get(&proposal_id).cloned()
    }
}
