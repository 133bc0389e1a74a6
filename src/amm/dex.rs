//! Fachada serializada do pool: estado, posições e ledger atrás de um único
//! `Mutex`. Toda operação monta o novo estado numa cópia, liquida no ledger
//! e só então commita. Falha em qualquer etapa deixa tudo como estava.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::config::PoolConfig;
use super::error::Result;
use super::error_catalog::DexErrorCode;
use super::guardrails::{checked_add, ensure_nonzero};
use super::ledger::{Ledger, LedgerError};
use super::liquidity::{quote_deposit, quote_withdraw, LiquidityBook};
use super::pool::{Delta, PoolState};
use super::swap::{SwapExecutor, SwapOutcome};
use super::types::{AccountId, Asset, Direction, PoolSnapshot, SwapRequest, U256};
use crate::telemetry::{make_info_span, record_invariant_growth, time_op};
use crate::{dex_bail, dex_err};

const COMPONENT: &str = "dex";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    pub base_in: U256,
    pub token_in: U256,
    pub shares_minted: U256,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub shares_burned: U256,
    pub base_out: U256,
    pub token_out: U256,
}

struct Inner<L> {
    pool: PoolState,
    book: LiquidityBook,
    ledger: L,
}

pub struct Dex<L: Ledger> {
    config: PoolConfig,
    executor: SwapExecutor,
    inner: Mutex<Inner<L>>,
    op_seq: AtomicU64,
}

impl<L: Ledger> Dex<L> {
    pub fn new(config: PoolConfig, ledger: L) -> Self {
        Self {
            executor: SwapExecutor::from_config(&config),
            config,
            inner: Mutex::new(Inner {
                pool: PoolState::new(),
                book: LiquidityBook::new(),
                ledger,
            }),
            op_seq: AtomicU64::new(0),
        }
    }

    pub fn from_ledger(ledger: L) -> Self {
        Self::new(PoolConfig::default(), ledger)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn next_op_id(&self) -> u64 {
        self.op_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Financia o pool vazio. O provedor recebe todas as shares iniciais.
    pub fn init(&self, provider: &AccountId, base_amount: U256, token_amount: U256) -> Result<U256> {
        let span = make_info_span("init", self.next_op_id(), COMPONENT);
        let _guard = span.enter();
        time_op("init", || -> Result<U256> {
            let mut inner = self.inner.lock();
            let mut staged = inner.pool.clone();
            let shares = staged.initialize(base_amount, token_amount)?;
            checked_add(inner.book.shares_of(provider), shares)?;

            settle(
                &mut inner.ledger,
                provider,
                &[(Asset::Base, base_amount), (Asset::Token, token_amount)],
                &[],
            )?;
            inner.pool = staged;
            inner.book.credit(provider, shares)?;
            info!(
                provider = %provider,
                base = %base_amount,
                token = %token_amount,
                shares = %shares,
                "pool initialized"
            );
            Ok(shares)
        })
    }

    pub fn swap(&self, payer: &AccountId, request: SwapRequest) -> Result<SwapOutcome> {
        let span = make_info_span("swap", self.next_op_id(), COMPONENT);
        let _guard = span.enter();
        time_op("swap", || -> Result<SwapOutcome> {
            let mut inner = self.inner.lock();
            let mut staged = inner.pool.clone();
            let outcome = self.executor.execute(&mut staged, &request)?;

            let direction = request.direction;
            settle(
                &mut inner.ledger,
                payer,
                &[(direction.input_asset(), outcome.input_amount)],
                &[(direction.output_asset(), outcome.output_amount)],
            )?;
            inner.pool = staged;
            record_invariant_growth(direction, &outcome.before, &outcome.after);
            Ok(outcome)
        })
    }

    /// Vende base, recebe token. Retorna o token pago.
    pub fn base_to_token(&self, payer: &AccountId, base_in: U256) -> Result<U256> {
        self.swap(payer, SwapRequest::new(Direction::BaseToToken, base_in))
            .map(|o| o.output_amount)
    }

    /// Vende token, recebe base. Retorna a base paga.
    pub fn token_to_base(&self, payer: &AccountId, token_in: U256) -> Result<U256> {
        self.swap(payer, SwapRequest::new(Direction::TokenToBase, token_in))
            .map(|o| o.output_amount)
    }

    /// Depósito proporcional dimensionado pela base; o token exigido sai da
    /// cotação (ceil).
    pub fn deposit(&self, provider: &AccountId, base_in: U256) -> Result<DepositReceipt> {
        let span = make_info_span("deposit", self.next_op_id(), COMPONENT);
        let _guard = span.enter();
        time_op("deposit", || -> Result<DepositReceipt> {
            let mut inner = self.inner.lock();
            let quote = quote_deposit(&inner.pool.snapshot(), base_in)?;
            let mut staged = inner.pool.clone();
            staged.apply_liquidity_change(
                Delta::Increase(base_in),
                Delta::Increase(quote.token_in_required),
                Delta::Increase(quote.shares_minted),
            )?;
            checked_add(inner.book.shares_of(provider), quote.shares_minted)?;

            settle(
                &mut inner.ledger,
                provider,
                &[(Asset::Base, base_in), (Asset::Token, quote.token_in_required)],
                &[],
            )?;
            inner.pool = staged;
            inner.book.credit(provider, quote.shares_minted)?;
            info!(
                provider = %provider,
                base_in = %base_in,
                token_in = %quote.token_in_required,
                shares = %quote.shares_minted,
                "liquidity added"
            );
            Ok(DepositReceipt {
                base_in,
                token_in: quote.token_in_required,
                shares_minted: quote.shares_minted,
            })
        })
    }

    /// Resgata `shares` da posição do provedor. Saque total devolve o pool ao
    /// estado vazio.
    pub fn withdraw(&self, provider: &AccountId, shares: U256) -> Result<WithdrawReceipt> {
        let span = make_info_span("withdraw", self.next_op_id(), COMPONENT);
        let _guard = span.enter();
        time_op("withdraw", || -> Result<WithdrawReceipt> {
            let mut inner = self.inner.lock();
            ensure_nonzero(shares, "shares")?;
            let held = inner.book.shares_of(provider);
            if shares > held {
                warn!(provider = %provider, shares = %shares, held = %held, "withdraw above position");
                dex_bail!(
                    DexErrorCode::InvalidArgument,
                    reason => "shares exceed provider position",
                    provider => provider,
                    held => held,
                );
            }
            let quote = quote_withdraw(&inner.pool.snapshot(), shares)?;
            let mut staged = inner.pool.clone();
            staged.apply_liquidity_change(
                Delta::Decrease(quote.base_out),
                Delta::Decrease(quote.token_out),
                Delta::Decrease(shares),
            )?;

            settle(
                &mut inner.ledger,
                provider,
                &[],
                &[(Asset::Base, quote.base_out), (Asset::Token, quote.token_out)],
            )?;
            inner.pool = staged;
            inner.book.debit(provider, shares)?;
            info!(
                provider = %provider,
                shares = %shares,
                base_out = %quote.base_out,
                token_out = %quote.token_out,
                "liquidity removed"
            );
            Ok(WithdrawReceipt {
                shares_burned: shares,
                base_out: quote.base_out,
                token_out: quote.token_out,
            })
        })
    }

    /// Cotação sobre as reservas atuais, sem política de saída zero.
    pub fn quote(&self, direction: Direction, input_amount: U256) -> Result<U256> {
        let snapshot = self.current_reserves();
        let (input_reserve, output_reserve) = snapshot.oriented(direction);
        self.executor.pricing().quote(input_amount, input_reserve, output_reserve)
    }

    pub fn current_reserves(&self) -> PoolSnapshot {
        self.inner.lock().pool.snapshot()
    }

    pub fn liquidity_of(&self, provider: &AccountId) -> U256 {
        self.inner.lock().book.shares_of(provider)
    }

    /// Posições por provedor, em ordem de conta.
    pub fn positions(&self) -> Vec<(AccountId, U256)> {
        self.inner
            .lock()
            .book
            .providers()
            .map(|(who, shares)| (who.clone(), *shares))
            .collect()
    }

    /// Soma das posições; sempre igual a `current_reserves().total_shares`.
    pub fn total_positions(&self) -> U256 {
        self.inner.lock().book.total()
    }

    /// Leitura do ledger sob a mesma trava das operações.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&L) -> R) -> R {
        f(&self.inner.lock().ledger)
    }

    /// Acesso mutável ao ledger (ex.: cunhar saldo de fixtures).
    pub fn with_ledger_mut<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        f(&mut self.inner.lock().ledger)
    }
}

/// Liquida entradas e depois saídas. Na primeira recusa desfaz, em ordem
/// inversa, o que já foi movido. Montantes zero não chegam ao ledger.
fn settle<L: Ledger>(
    ledger: &mut L,
    account: &AccountId,
    inflows: &[(Asset, U256)],
    outflows: &[(Asset, U256)],
) -> std::result::Result<(), LedgerError> {
    let mut done_in: Vec<(Asset, U256)> = Vec::with_capacity(inflows.len());
    let mut done_out: Vec<(Asset, U256)> = Vec::with_capacity(outflows.len());

    let result: std::result::Result<(), LedgerError> = (|| {
        for &(asset, amount) in inflows.iter().filter(|(_, a)| !a.is_zero()) {
            ledger.transfer_in(asset, amount, account)?;
            done_in.push((asset, amount));
        }
        for &(asset, amount) in outflows.iter().filter(|(_, a)| !a.is_zero()) {
            ledger.transfer_out(asset, amount, account)?;
            done_out.push((asset, amount));
        }
        Ok(())
    })();

    if let Err(err) = &result {
        warn!(account = %account, error = %err, "settlement refused; reverting");
        for &(asset, amount) in done_out.iter().rev() {
            if let Err(e) = ledger.transfer_in(asset, amount, account) {
                error!(account = %account, asset = %asset, amount = %amount, error = %e, "settlement revert failed");
            }
        }
        for &(asset, amount) in done_in.iter().rev() {
            if let Err(e) = ledger.transfer_out(asset, amount, account) {
                error!(account = %account, asset = %asset, amount = %amount, error = %e, "settlement revert failed");
            }
        }
    }
    result
}

impl<L: Ledger> Dex<L> {
    /// Confere que a soma das posições bate com o total de shares do pool.
    pub fn check_positions(&self) -> Result<()> {
        let inner = self.inner.lock();
        let total = inner.pool.total_shares();
        let positions = inner.book.total();
        if total != positions {
            return Err(dex_err!(
                DexErrorCode::InvariantViolated,
                invariant => "shares_conserved",
                detail => format!("positions {} != total {}", positions, total),
            ));
        }
        Ok(())
    }
}
