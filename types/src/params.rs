//! Shield parameters. Every value is plain data so a host can govern it.

use serde::{Deserialize, Serialize};

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOM: u128 = 10_000;

/// Integer basis-point share of an amount, floored.
///
/// Exact for any `u128` amount: `floor(a*b/d) = (a/d)*b + floor((a%d)*b/d)`,
/// and both terms stay in range while `bps <= BPS_DENOM`.
pub fn bps_amount(amount: u128, bps: u32) -> u128 {
    debug_assert!(u128::from(bps) <= BPS_DENOM, "bps beyond 100%");
    let b = u128::from(bps);
    (amount / BPS_DENOM) * b + (amount % BPS_DENOM) * b / BPS_DENOM
}

/// All shield parameters stored by every node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldParams {
    /// Delay (seconds) between a collateral withdrawal request and its release.
    pub withdraw_period_secs: u64,

    /// Purchase cooldown (seconds) during which unstaking pays the early-exit fee.
    pub protection_period_secs: u64,

    /// Delay (seconds) before claim-reduced shield returns to active coverage.
    pub recover_period_secs: u64,

    /// Minimum purchase amount (raw units).
    pub min_shield_purchase: u128,

    /// Share of each purchase carved into the provider fee pool (basis points).
    pub service_fee_bps: u32,

    /// Fee on unstaking inside the protection period, routed to the reserve
    /// (basis points).
    pub early_exit_fee_bps: u32,
}

impl ShieldParams {
    /// AEGIS defaults, the intended configuration for the live network.
    pub fn mainnet_defaults() -> Self {
        Self {
            withdraw_period_secs: 21 * 24 * 3600, // 21 days
            protection_period_secs: 21 * 24 * 3600,
            recover_period_secs: 10 * 24 * 3600, // 10 days
            min_shield_purchase: 1_000_000,
            service_fee_bps: 500, // 5%
            early_exit_fee_bps: 200, // 2%
        }
    }
}

/// Default is the AEGIS mainnet configuration.
impl Default for ShieldParams {
    fn default() -> Self {
        Self::mainnet_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_amount_basic() {
        assert_eq!(bps_amount(10_000, 500), 500);
        assert_eq!(bps_amount(1, 500), 0);
        assert_eq!(bps_amount(199, 10_000), 199);
    }

    #[test]
    fn test_bps_amount_huge_values_stay_exact() {
        // (a/d)*b decomposition must not overflow even near u128::MAX.
        let a = u128::MAX - 5;
        assert_eq!(bps_amount(a, 10_000), a);
        assert!(bps_amount(a, 9_999) < a);
    }
}
