use proptest::prelude::*;

use aegis_nullables::{NullBank, NullProposals, NullStaking};
use aegis_shield::ShieldEngine;
use aegis_types::{Address, Dec, ProposalId, ShieldParams, Timestamp};

fn addr(n: usize) -> Address {
    Address::new(format!("aeg_{n:0>4}"))
}

fn admin() -> Address {
    Address::new("aeg_admin")
}

fn test_params() -> ShieldParams {
    ShieldParams {
        withdraw_period_secs: 1_000,
        protection_period_secs: 0,
        recover_period_secs: 300,
        min_shield_purchase: 1,
        service_fee_bps: 0,
        early_exit_fee_bps: 0,
    }
}

fn build(params: ShieldParams) -> (ShieldEngine, NullBank, NullStaking, NullProposals) {
    let bank = NullBank::new();
    let staking = NullStaking::new();
    let proposals = NullProposals::new();
    let engine = ShieldEngine::new(
        params,
        admin(),
        Box::new(bank.clone()),
        Box::new(staking.clone()),
        Box::new(proposals.clone()),
    );
    (engine, bank, staking, proposals)
}

proptest! {
    /// Conservation and the bonded ceiling hold through any interleaving of
    /// deposits, withdrawal requests, bonded-amount changes and ticks.
    #[test]
    fn collateral_books_stay_balanced(
        ops in prop::collection::vec((0u8..4, 0usize..4, 1u128..10_000), 1..40),
    ) {
        let (mut engine, _bank, staking, _proposals) = build(test_params());
        for i in 0..4 {
            staking.set_bonded(&addr(i), 50_000);
        }
        let mut now = 0u64;
        for (op, who, amount) in ops {
            let a = addr(who);
            match op {
                0 => {
                    let _ = engine.deposit_collateral(&a, amount);
                }
                1 => {
                    let _ = engine.withdraw_collateral(&a, amount, Timestamp::new(now));
                }
                2 => {
                    now += amount as u64;
                    prop_assert!(engine.tick(Timestamp::new(now)).is_ok());
                }
                _ => {
                    staking.set_bonded(&a, amount * 10);
                    engine.after_bonded_amount_changed(&a);
                }
            }
            prop_assert!(engine.check_invariants().is_ok());
        }
        // Flush the whole queue and re-check the block-boundary invariants.
        prop_assert!(engine.tick(Timestamp::new(now + 100_000)).is_ok());
        prop_assert!(engine.check_invariants().is_ok());
    }

    /// Claim lock immediately followed by unlock restores every contributor
    /// and the aggregate books bit for bit, for any contributor set and any
    /// loss within total collateral.
    #[test]
    fn claim_lock_unlock_round_trip(
        collaterals in prop::collection::vec(1u128..1_000_000, 1..8),
        loss_pct in 1u64..100,
    ) {
        let total: u128 = collaterals.iter().sum();
        let loss = total * loss_pct as u128 / 100;
        prop_assume!(loss > 0);

        let (mut engine, bank, staking, _proposals) = build(test_params());
        for (i, collateral) in collaterals.iter().enumerate() {
            staking.set_bonded(&addr(i), *collateral);
            engine.deposit_collateral(&addr(i), *collateral).unwrap();
        }
        let pool = engine
            .create_pool(&admin(), "Nebula", addr(100), "covered", total, Dec::from_int(1))
            .unwrap();
        let buyer = addr(101);
        bank.set_balance(&buyer, total);
        engine
            .purchase_shield(pool, &buyer, total, "cover", Timestamp::new(0))
            .unwrap();

        let proposal = ProposalId::new(1);
        engine.claim_lock(pool, &buyer, loss, proposal).unwrap();
        prop_assert!(engine.check_invariants().is_ok());
        prop_assert_eq!(engine.global_pools().total_collateral, total - loss);

        engine.claim_unlock(pool, loss, proposal).unwrap();
        engine.restore_shield(pool, &buyer, loss).unwrap();

        for (i, collateral) in collaterals.iter().enumerate() {
            let p = engine.provider(&addr(i)).unwrap();
            prop_assert_eq!(p.collateral, *collateral);
            prop_assert!(p.locked.is_empty());
        }
        prop_assert_eq!(engine.global_pools().total_collateral, total);
        prop_assert_eq!(engine.global_pools().total_claimed, 0);
        prop_assert_eq!(engine.purchase(pool, &buyer).unwrap().shield, total);
        prop_assert!(engine.check_invariants().is_ok());
    }

    /// Fee distribution conserves total fee value across rewards and the
    /// carry-over pool for any provider set.
    #[test]
    fn fee_distribution_conserves_value(
        collaterals in prop::collection::vec(1u128..1_000_000, 1..10),
        fee in 50u128..1_000_000,
    ) {
        let params = ShieldParams {
            service_fee_bps: 5_000,
            ..test_params()
        };
        let (mut engine, bank, staking, _proposals) = build(params);
        for (i, collateral) in collaterals.iter().enumerate() {
            staking.set_bonded(&addr(i), *collateral);
            engine.deposit_collateral(&addr(i), *collateral).unwrap();
        }
        // A 50% service fee turns a purchase of 2*fee into a fee pool of fee.
        let pool = engine
            .create_pool(&admin(), "Nebula", addr(100), "covered", u128::MAX / 2, Dec::from_int(1))
            .unwrap();
        let buyer = addr(101);
        bank.set_balance(&buyer, 2 * fee);
        engine
            .purchase_shield(pool, &buyer, 2 * fee, "cover", Timestamp::new(0))
            .unwrap();
        prop_assert_eq!(engine.fee_pool(), Dec::from_int(fee));

        engine.tick(Timestamp::new(1)).unwrap();
        engine.tick(Timestamp::new(2)).unwrap();

        let rewards_sum = engine
            .providers()
            .fold(Dec::ZERO, |acc, p| acc.checked_add(p.rewards).unwrap());
        let conserved = rewards_sum.checked_add(engine.fee_pool()).unwrap();
        prop_assert_eq!(conserved, Dec::from_int(fee));
        prop_assert!(engine.check_invariants().is_ok());
    }
}
