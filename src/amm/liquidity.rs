//! Liquidez: shares iniciais, cotação de depósito/saque e posições por provedor.
//! Políticas (sempre a favor do pool):
//! - token exigido no depósito: **ceil**
//! - shares emitidas: **floor**
//! - montantes no saque: **floor**

use std::collections::BTreeMap;

use super::error::Result;
use super::error_catalog::DexErrorCode;
use super::guardrails::{checked_add, checked_sub, ensure_nonzero, mul_div_ceil, mul_div_floor};
use super::types::{AccountId, PoolSnapshot, U256};
use crate::dex_bail;

/// Shares emitidas na inicialização: uma share por unidade de base.
#[inline]
pub fn initial_shares(base_amount: U256, _token_amount: U256) -> U256 {
    base_amount
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepositQuote {
    pub token_in_required: U256,
    pub shares_minted: U256,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawQuote {
    pub base_out: U256,
    pub token_out: U256,
}

/// Depósito proporcional de `base_in` num pool já financiado.
/// `token = ceil(base_in * T / B)`, `shares = floor(base_in * S / B)`.
pub fn quote_deposit(pool: &PoolSnapshot, base_in: U256) -> Result<DepositQuote> {
    ensure_nonzero(base_in, "base amount")?;
    if pool.base_reserve.is_zero() || pool.token_reserve.is_zero() {
        dex_bail!(DexErrorCode::InvalidArgument, reason => "pool not initialized; supply both amounts via initialize");
    }
    let token_in_required = mul_div_ceil(base_in, pool.token_reserve, pool.base_reserve)?;
    let shares_minted = mul_div_floor(base_in, pool.total_shares, pool.base_reserve)?;
    if shares_minted.is_zero() {
        dex_bail!(DexErrorCode::InvalidArgument, reason => "deposit too small to mint shares");
    }
    Ok(DepositQuote { token_in_required, shares_minted })
}

/// Saque proporcional de `shares_in`: `floor(shares * R / S)` de cada lado.
pub fn quote_withdraw(pool: &PoolSnapshot, shares_in: U256) -> Result<WithdrawQuote> {
    ensure_nonzero(shares_in, "shares")?;
    if shares_in > pool.total_shares {
        dex_bail!(
            DexErrorCode::InvalidArgument,
            reason => "shares exceed total outstanding",
            shares => shares_in,
            total => pool.total_shares,
        );
    }
    let base_out = mul_div_floor(shares_in, pool.base_reserve, pool.total_shares)?;
    let token_out = mul_div_floor(shares_in, pool.token_reserve, pool.total_shares)?;
    if base_out.is_zero() && token_out.is_zero() {
        dex_bail!(DexErrorCode::InvalidArgument, reason => "withdrawal too small to pay out");
    }
    Ok(WithdrawQuote { base_out, token_out })
}

/// Posições de liquidez por provedor. A soma das posições é sempre igual ao
/// total de shares do pool que as acompanha.
#[derive(Clone, Debug, Default)]
pub struct LiquidityBook {
    positions: BTreeMap<AccountId, U256>,
}

impl LiquidityBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shares_of(&self, provider: &AccountId) -> U256 {
        self.positions.get(provider).copied().unwrap_or_default()
    }

    /// Soma de todas as posições.
    pub fn total(&self) -> U256 {
        self.positions
            .values()
            .fold(U256::zero(), |acc, v| acc.saturating_add(*v))
    }

    pub fn providers(&self) -> impl Iterator<Item = (&AccountId, &U256)> {
        self.positions.iter()
    }

    pub fn credit(&mut self, provider: &AccountId, shares: U256) -> Result<()> {
        let current = self.shares_of(provider);
        let next = checked_add(current, shares)?;
        self.positions.insert(provider.clone(), next);
        Ok(())
    }

    /// Debita shares; posição zerada é removida.
    pub fn debit(&mut self, provider: &AccountId, shares: U256) -> Result<()> {
        let current = self.shares_of(provider);
        if shares > current {
            dex_bail!(
                DexErrorCode::InvalidArgument,
                reason => "shares exceed provider position",
                provider => provider,
                held => current,
            );
        }
        let next = checked_sub(current, shares, "shares")?;
        if next.is_zero() {
            self.positions.remove(provider);
        } else {
            self.positions.insert(provider.clone(), next);
        }
        Ok(())
    }
}
