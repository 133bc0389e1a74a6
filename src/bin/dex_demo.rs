use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use dex_core::telemetry;
use dex_core::{units, AccountId, Asset, Dex, InMemoryLedger, PoolConfig, U256};

const TRADERS: usize = 4;
const ROUNDS: u32 = 5;

fn otel_disabled() -> bool {
    std::env::var("OTEL_SDK_DISABLED")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    let tel = if otel_disabled() {
        telemetry::init_logging()?;
        None
    } else {
        Some(telemetry::init(telemetry::SERVICE_NAME)?)
    };

    let config = PoolConfig::from_env()?;
    let lp = AccountId::from("lp");
    let traders: Vec<AccountId> = (0..TRADERS).map(|i| AccountId::new(format!("trader-{i}"))).collect();

    let mut ledger = InMemoryLedger::new();
    ledger.credit(&lp, Asset::Base, units(1_000));
    ledger.credit(&lp, Asset::Token, units(1_000));
    for t in &traders {
        ledger.credit(t, Asset::Base, units(50));
        ledger.credit(t, Asset::Token, units(50));
    }

    let dex = Arc::new(Dex::new(config, ledger));
    let config_json = serde_json::to_string(dex.config())?;
    tracing::info!(config = %config_json, "pool config");
    dex.init(&lp, units(300), units(300))?;

    let mut handles = Vec::with_capacity(TRADERS);
    for (i, trader) in traders.into_iter().enumerate() {
        let dex = Arc::clone(&dex);
        handles.push(tokio::task::spawn_blocking(move || -> Result<()> {
            for round in 0..ROUNDS {
                let amount = units(1) + U256::from(round);
                if (i + round as usize) % 2 == 0 {
                    dex.base_to_token(&trader, amount)?;
                } else {
                    dex.token_to_base(&trader, amount)?;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Ok(())
        }));
    }
    for h in handles {
        h.await??;
    }

    let receipt = dex.deposit(&lp, units(10))?;
    dex.withdraw(&lp, receipt.shares_minted)?;

    let snapshot = dex.current_reserves();
    tracing::info!(
        base_reserve = %snapshot.base_reserve,
        token_reserve = %snapshot.token_reserve,
        total_shares = %snapshot.total_shares,
        "demo finished"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    for (provider, shares) in dex.positions() {
        println!("{provider}: {shares} shares");
    }

    if let Some(tel) = tel {
        tel.shutdown();
    }
    Ok(())
}
