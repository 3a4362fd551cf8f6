//! Nullable bank: in-memory account balances and the module account.

use aegis_shield::adapters::{BankAdapter, TransferError};
use aegis_types::Address;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    balances: BTreeMap<Address, u128>,
    module_balance: u128,
}

/// An in-memory bank for testing. Clones share state.
#[derive(Clone, Default)]
pub struct NullBank {
    inner: Arc<Mutex<Inner>>,
}

impl NullBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a user account balance.
    pub fn set_balance(&self, address: &Address, amount: u128) {
        self.inner
            .lock()
            .unwrap()
            .balances
            .insert(address.clone(), amount);
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.inner
            .lock()
            .unwrap()
            .balances
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    /// Tokens currently held by the shield module account.
    pub fn module_balance(&self) -> u128 {
        self.inner.lock().unwrap().module_balance
    }
}

impl BankAdapter for NullBank {
    fn move_from_account_to_pool(
        &self,
        from: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut inner = self.inner.lock().unwrap();
        let balance = inner.balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(TransferError(format!(
                "insufficient funds in {from}: {balance} < {amount}"
            )));
        }
        inner.balances.insert(from.clone(), balance - amount);
        inner.module_balance += amount;
        Ok(())
    }

    fn move_from_pool_to_account(&self, to: &Address, amount: u128) -> Result<(), TransferError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.module_balance < amount {
            return Err(TransferError(format!(
                "module balance {} below transfer {amount}",
                inner.module_balance
            )));
        }
        inner.module_balance -= amount;
        *inner.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(format!("aeg_{s}"))
    }

    #[test]
    fn test_transfer_in_and_out() {
        let bank = NullBank::new();
        let user = addr("user");
        bank.set_balance(&user, 100);

        bank.move_from_account_to_pool(&user, 60).unwrap();
        assert_eq!(bank.balance_of(&user), 40);
        assert_eq!(bank.module_balance(), 60);

        bank.move_from_pool_to_account(&user, 10).unwrap();
        assert_eq!(bank.balance_of(&user), 50);
        assert_eq!(bank.module_balance(), 50);
    }

    #[test]
    fn test_insufficient_funds_rejected() {
        let bank = NullBank::new();
        let user = addr("user");
        bank.set_balance(&user, 5);
        assert!(bank.move_from_account_to_pool(&user, 6).is_err());
        assert!(bank.move_from_pool_to_account(&user, 1).is_err());
        assert_eq!(bank.balance_of(&user), 5);
        assert_eq!(bank.module_balance(), 0);
    }
}
