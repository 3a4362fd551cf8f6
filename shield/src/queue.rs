//! Time-bucketed FIFO queue of pending collateral releases.

use crate::state::Withdraw;
use aegis_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pending withdrawals keyed by `(completion_time, sequence)`.
///
/// The explicit monotonic sequence keeps FIFO order within a completion-time
/// bucket unambiguous; key order never depends on encoding artifacts. Entry
/// removal is the sole completion marker, so draining the same timestamp
/// twice is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalQueue {
    entries: BTreeMap<(Timestamp, u64), Withdraw>,
    next_seq: u64,
}

impl WithdrawalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to its completion-time bucket.
    ///
    /// Returns the sequence number assigned.
    pub fn enqueue(&mut self, withdraw: Withdraw) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((withdraw.completion_time, seq), withdraw);
        seq
    }

    /// Remove and return every entry due at or before `now`, in ascending
    /// `(completion_time, sequence)` order.
    pub fn drain_due(&mut self, now: Timestamp) -> Vec<Withdraw> {
        let cutoff = (Timestamp::new(now.as_secs().saturating_add(1)), 0u64);
        let rest = self.entries.split_off(&cutoff);
        let due = std::mem::replace(&mut self.entries, rest);
        due.into_values().collect()
    }

    /// Cancel up to `target` from `address`'s queued entries, newest first.
    ///
    /// Zeroed entries are removed; FIFO order of the rest is untouched.
    /// Returns the total cancelled.
    pub fn trim_newest(&mut self, address: &Address, target: u128) -> u128 {
        let mut remaining = target;
        let keys: Vec<(Timestamp, u64)> = self
            .entries
            .iter()
            .rev()
            .filter(|(_, w)| w.address == *address)
            .map(|(key, _)| *key)
            .collect();
        for key in keys {
            if remaining == 0 {
                break;
            }
            if let Some(w) = self.entries.get_mut(&key) {
                let cut = w.amount.min(remaining);
                w.amount -= cut;
                remaining -= cut;
                if w.amount == 0 {
                    self.entries.remove(&key);
                }
            }
        }
        target - remaining
    }

    /// Total queued amount for `address`.
    pub fn pending_for(&self, address: &Address) -> u128 {
        self.entries
            .values()
            .filter(|w| w.address == *address)
            .fold(0u128, |acc, w| acc.saturating_add(w.amount))
    }

    /// Every entry in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&(Timestamp, u64), &Withdraw)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Rebuild from persisted entries and the saved sequence counter.
    pub(crate) fn restore(items: Vec<(Timestamp, u64, Withdraw)>, next_seq: u64) -> Self {
        let mut entries = BTreeMap::new();
        for (completion, seq, withdraw) in items {
            entries.insert((completion, seq), withdraw);
        }
        Self { entries, next_seq }
    }
}
