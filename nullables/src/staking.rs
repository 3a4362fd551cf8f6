//! Nullable staking view with programmable bonded amounts.

use aegis_shield::adapters::StakingView;
use aegis_types::Address;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// An in-memory bonding ledger for testing. Clones share state.
#[derive(Clone, Default)]
pub struct NullStaking {
    bonded: Arc<Mutex<BTreeMap<Address, u128>>>,
}

impl NullStaking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bonded amount reported for `address`.
    pub fn set_bonded(&self, address: &Address, amount: u128) {
        self.bonded.lock().unwrap().insert(address.clone(), amount);
    }
}

impl StakingView for NullStaking {
    fn bond_denom(&self) -> String {
        "uaeg".to_string()
    }

    fn bonded_amount(&self, address: &Address) -> u128 {
        self.bonded
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0)
    }
}
