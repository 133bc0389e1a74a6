//! Operações concorrentes sobre a mesma fachada: o resultado tem que ser o de
//! alguma ordem serial (conservação de saldos, posições e k).

use std::sync::Arc;
use std::thread;

use dex_core::amm::guardrails::mul_wide;
use dex_core::{units, AccountId, Asset, Dex, InMemoryLedger, U256};

const THREADS: usize = 8;
const ROUNDS: u64 = 50;

fn setup() -> (Arc<Dex<InMemoryLedger>>, Vec<AccountId>) {
    let lp = AccountId::from("lp");
    let accounts: Vec<AccountId> = (0..THREADS).map(|i| AccountId::new(format!("acct-{i}"))).collect();
    let mut ledger = InMemoryLedger::new();
    ledger.credit(&lp, Asset::Base, units(1_000));
    ledger.credit(&lp, Asset::Token, units(1_000));
    for a in &accounts {
        ledger.credit(a, Asset::Base, units(100));
        ledger.credit(a, Asset::Token, units(100));
    }
    let dex = Dex::from_ledger(ledger);
    dex.init(&lp, units(500), units(500)).unwrap();
    (Arc::new(dex), accounts)
}

fn total_of(dex: &Dex<InMemoryLedger>, accounts: &[AccountId], asset: Asset) -> U256 {
    dex.with_ledger(|l| {
        accounts
            .iter()
            .chain(std::iter::once(&AccountId::from("lp")))
            .fold(l.custody(asset), |acc, a| acc + l.balance_of(a, asset))
    })
}

#[test]
fn concurrent_swaps_conserve_assets() {
    let (dex, accounts) = setup();
    let base_total = total_of(&dex, &accounts, Asset::Base);
    let token_total = total_of(&dex, &accounts, Asset::Token);
    let k0 = {
        let r = dex.current_reserves();
        mul_wide(r.base_reserve, r.token_reserve)
    };

    let handles: Vec<_> = accounts
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, acct)| {
            let dex = Arc::clone(&dex);
            thread::spawn(move || {
                for r in 0..ROUNDS {
                    let amount = units(1) / U256::from(r + 1);
                    if (i as u64 + r) % 2 == 0 {
                        dex.base_to_token(&acct, amount).unwrap();
                    } else {
                        dex.token_to_base(&acct, amount).unwrap();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let r = dex.current_reserves();
    assert!(mul_wide(r.base_reserve, r.token_reserve) > k0);
    assert_eq!(total_of(&dex, &accounts, Asset::Base), base_total);
    assert_eq!(total_of(&dex, &accounts, Asset::Token), token_total);
    dex.with_ledger(|l| {
        assert_eq!(l.custody(Asset::Base), r.base_reserve);
        assert_eq!(l.custody(Asset::Token), r.token_reserve);
    });
}

#[test]
fn concurrent_liquidity_keeps_positions_in_sync() {
    let (dex, accounts) = setup();

    thread::scope(|s| {
        for acct in &accounts {
            let dex = &dex;
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    let receipt = dex.deposit(acct, units(1)).unwrap();
                    dex.base_to_token(acct, units(1) / U256::from(10u8)).unwrap();
                    dex.withdraw(acct, receipt.shares_minted).unwrap();
                }
            });
        }
    });

    let r = dex.current_reserves();
    assert_eq!(dex.total_positions(), r.total_shares);
    assert_eq!(dex.liquidity_of(&AccountId::from("lp")), units(500));
    for a in &accounts {
        assert_eq!(dex.liquidity_of(a), U256::zero());
    }
    dex.check_positions().unwrap();
}
