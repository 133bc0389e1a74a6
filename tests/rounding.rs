//! Direção de arredondamento: sempre a favor do pool.

use dex_core::amm::liquidity::{initial_shares, quote_deposit, quote_withdraw};
use dex_core::amm::pricing::PricingEngine;
use dex_core::{FeePolicy, PoolSnapshot, U256};

fn u(n: u64) -> U256 {
    U256::from(n)
}

fn pool(b: u64, t: u64, s: u64) -> PoolSnapshot {
    PoolSnapshot { base_reserve: u(b), token_reserve: u(t), total_shares: u(s) }
}

#[test]
fn r1_quote_is_floor() {
    // 10*997*100 / (100*1000 + 9970) = 997000/109970 = 9.066.. -> 9
    let out = PricingEngine::default().quote(u(10), u(100), u(100)).unwrap();
    assert_eq!(out, u(9));
}

#[test]
fn r2_fee_free_quote_never_overpays() {
    // 1*7 / (3+1) = 1.75 -> 1
    let out = PricingEngine::new(FeePolicy::zero()).quote(u(1), u(3), u(7)).unwrap();
    assert_eq!(out, u(1));
}

#[test]
fn r3_required_input_is_ceil() {
    let engine = PricingEngine::default();
    let needed = engine.required_input(u(9), u(100), u(100)).unwrap();
    assert!(engine.quote(needed, u(100), u(100)).unwrap() >= u(9));
    assert!(engine.quote(needed - U256::one(), u(100), u(100)).unwrap() < u(9));
}

#[test]
fn r4_initial_shares_equal_base() {
    assert_eq!(initial_shares(u(7), u(3)), u(7));
}

#[test]
fn r5_deposit_token_ceil_shares_floor() {
    // token = ceil(5*11/7) = ceil(7.857) = 8 ; shares = floor(5*13/7) = floor(9.28) = 9
    let q = quote_deposit(&pool(7, 11, 13), u(5)).unwrap();
    assert_eq!(q.token_in_required, u(8));
    assert_eq!(q.shares_minted, u(9));
}

#[test]
fn r6_withdraw_is_floor_of_proportion() {
    // 4*11/13 = 3.38 -> 3 ; 4*7/13 = 2.15 -> 2
    let q = quote_withdraw(&pool(11, 7, 13), u(4)).unwrap();
    assert_eq!(q.base_out, u(3));
    assert_eq!(q.token_out, u(2));
}

#[test]
fn r7_deposit_then_withdraw_never_profits() {
    let snap = pool(1_000_003, 2_000_011, 999_983);
    let dep = quote_deposit(&snap, u(12_345)).unwrap();
    let after = PoolSnapshot {
        base_reserve: snap.base_reserve + u(12_345),
        token_reserve: snap.token_reserve + dep.token_in_required,
        total_shares: snap.total_shares + dep.shares_minted,
    };
    let back = quote_withdraw(&after, dep.shares_minted).unwrap();
    assert!(back.base_out <= u(12_345));
    assert!(back.token_out <= dep.token_in_required);
}
