//! Propriedades do pool sob sequências aleatórias de operações.

use proptest::prelude::*;

use dex_core::amm::guardrails::{mul_wide, widen};
use dex_core::amm::pool::PoolState;
use dex_core::amm::pricing::PricingEngine;
use dex_core::amm::swap::SwapExecutor;
use dex_core::{
    units, AccountId, Asset, Dex, Direction, FeePolicy, InMemoryLedger, PoolSnapshot, SwapRequest, U256, U512,
};

#[derive(Clone, Debug)]
enum Op {
    Swap(bool, u128),
    Deposit(u128),
    Withdraw(u128),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), 1u128..=5_000_000_000_000_000_000u128).prop_map(|(d, a)| Op::Swap(d, a)),
        (1u128..=2_000_000_000_000_000_000u128).prop_map(Op::Deposit),
        (1u128..=1_000_000_000_000_000_000u128).prop_map(Op::Withdraw),
    ]
}

/// Qualquer magnitude de 1 a `U256::MAX`: limbs aleatórios deslocados.
fn wide_u256() -> impl Strategy<Value = U256> {
    (any::<[u64; 4]>(), 0u32..=255u32).prop_map(|(limbs, shift)| (U256(limbs) >> shift).max(U256::one()))
}

/// `|b0*t1 - b1*t0|` contra `max(b0, t0)`.
fn ratio_drift(before: &PoolSnapshot, after: &PoolSnapshot) -> (U512, U512) {
    let lhs = mul_wide(before.base_reserve, after.token_reserve);
    let rhs = mul_wide(after.base_reserve, before.token_reserve);
    let drift = if lhs >= rhs { lhs - rhs } else { rhs - lhs };
    (drift, widen(before.base_reserve.max(before.token_reserve)))
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 512, .. ProptestConfig::default() })]

    // k nunca cai num swap; com taxa 0 ainda vale (floor favorece o pool)
    #[test]
    fn swap_product_non_decreasing(
        base in 1u128..=1_000_000_000u128,
        token in 1u128..=1_000_000_000u128,
        input in 1u128..=1_000_000u128,
        num in 0u32..=30u32,
        to_token in any::<bool>(),
    ) {
        let fee = FeePolicy::new(num, 1000).unwrap();
        let exec = SwapExecutor::new(PricingEngine::new(fee), Default::default());
        let mut pool = PoolState::new();
        pool.initialize(units(base), units(token)).unwrap();
        let direction = if to_token { Direction::BaseToToken } else { Direction::TokenToBase };
        let out = exec.execute(&mut pool, &SwapRequest::new(direction, units(input))).unwrap();

        let (rin, rout) = out.before.oriented(direction);
        prop_assert!(out.output_amount < rout);
        prop_assert!(!out.after.base_reserve.is_zero() && !out.after.token_reserve.is_zero());
        prop_assert_eq!(out.after.oriented(direction).0, rin + units(input));
        prop_assert!(
            mul_wide(out.after.base_reserve, out.after.token_reserve)
                >= mul_wide(out.before.base_reserve, out.before.token_reserve)
        );
    }

    // determinística, monotônica no input e decrescente na taxa
    #[test]
    fn quote_monotonic(
        rin in 1u64..=u64::MAX,
        rout in 2u64..=u64::MAX,
        a in 1u64..=u64::MAX / 2,
        extra in 0u64..=1_000_000u64,
    ) {
        let engine = PricingEngine::default();
        let lo = engine.quote(U256::from(a), U256::from(rin), U256::from(rout)).unwrap();
        let hi = engine.quote(U256::from(a) + U256::from(extra), U256::from(rin), U256::from(rout)).unwrap();
        let again = engine.quote(U256::from(a), U256::from(rin), U256::from(rout)).unwrap();
        prop_assert_eq!(lo, again);
        prop_assert!(lo <= hi);
        prop_assert!(hi < U256::from(rout));

        let free = PricingEngine::new(FeePolicy::zero())
            .quote(U256::from(a), U256::from(rin), U256::from(rout))
            .unwrap();
        prop_assert!(lo <= free);
    }

    // operandos em todo o domínio U256: sem pânico, saída limitada,
    // determinística, k não cai e o input mínimo nunca passa do usado
    #[test]
    fn quote_output_bound(
        input in wide_u256(),
        rin in wide_u256(),
        rout in wide_u256(),
        num in 0u32..=30u32,
    ) {
        prop_assume!(rin.checked_add(input).is_some());
        let engine = PricingEngine::new(FeePolicy::new(num, 1000).unwrap());

        let out = engine.quote(input, rin, rout).unwrap();
        prop_assert!(out < rout);
        prop_assert_eq!(engine.quote(input, rin, rout).unwrap(), out);
        prop_assert!(mul_wide(rin + input, rout - out) >= mul_wide(rin, rout));
        prop_assert!(engine.price_impact_ppm(input, rin, rout).unwrap() <= 1_000_000);

        if !out.is_zero() {
            let need = engine.required_input(out, rin, rout).unwrap();
            prop_assert!(need <= input);
            prop_assert!(engine.quote(need, rin, rout).unwrap() >= out);
        }
    }

    // sequência aleatória: reservas positivas ou pool vazio, shares conservadas,
    // custódia do ledger igual às reservas
    #[test]
    fn random_sequence_keeps_books_consistent(ops in proptest::collection::vec(op(), 1..40)) {
        let lp = AccountId::from("lp");
        let mut ledger = InMemoryLedger::new();
        ledger.credit(&lp, Asset::Base, units(1_000_000));
        ledger.credit(&lp, Asset::Token, units(1_000_000));
        let dex = Dex::from_ledger(ledger);
        dex.init(&lp, units(50), units(80)).unwrap();

        for op in ops {
            let before = dex.current_reserves();
            let (res, moves_liquidity) = match op {
                Op::Swap(to_token, amount) => {
                    let d = if to_token { Direction::BaseToToken } else { Direction::TokenToBase };
                    (dex.swap(&lp, SwapRequest::new(d, U256::from(amount))).map(|_| ()), false)
                }
                Op::Deposit(amount) => (dex.deposit(&lp, U256::from(amount)).map(|_| ()), true),
                Op::Withdraw(shares) => (dex.withdraw(&lp, U256::from(shares)).map(|_| ()), true),
            };
            let after = dex.current_reserves();
            match res {
                Ok(()) if moves_liquidity && !after.is_empty() => {
                    // proporção preservada a menos de um passo de arredondamento
                    let (drift, allowed) = ratio_drift(&before, &after);
                    prop_assert!(drift <= allowed, "drift {} > {}", drift, allowed);
                }
                Ok(()) => {}
                Err(e) => {
                    prop_assert!(e.is_recoverable(), "fatal: {}", e);
                    prop_assert_eq!(before, after);
                }
            }

            let all_zero = after.is_empty();
            let all_positive = !after.base_reserve.is_zero()
                && !after.token_reserve.is_zero()
                && !after.total_shares.is_zero();
            prop_assert!(all_zero || all_positive);
            prop_assert_eq!(dex.total_positions(), after.total_shares);
            dex.with_ledger(|l| {
                assert_eq!(l.custody(Asset::Base), after.base_reserve);
                assert_eq!(l.custody(Asset::Token), after.token_reserve);
            });
        }
    }
}
