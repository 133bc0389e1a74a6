//! Fronteira com o ledger externo que custodia os ativos.
//! O motor só dimensiona e ordena as transferências; custódia é do ledger.

use core::fmt;
use std::collections::BTreeMap;

use super::error::DexError;
use super::error_catalog::DexErrorCode;
use super::types::{AccountId, Asset, U256};

/// Recusa do ledger (saldo insuficiente, conta bloqueada...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerError {
    pub asset: Asset,
    pub amount: U256,
    pub reason: String,
}

impl LedgerError {
    pub fn new(asset: Asset, amount: U256, reason: impl Into<String>) -> Self {
        Self { asset, amount, reason: reason.into() }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.amount, self.asset, self.reason)
    }
}

impl std::error::Error for LedgerError {}

impl From<LedgerError> for DexError {
    fn from(err: LedgerError) -> Self {
        DexError::new(DexErrorCode::SettlementFailed)
            .with_context("reason", &err.reason)
            .with_context("asset", err.asset)
            .with_context("amount", err.amount)
    }
}

/// Colaborador de liquidação. As chamadas acontecem dentro da seção crítica
/// do [`Dex`](super::dex::Dex), junto com o commit das reservas.
pub trait Ledger {
    /// Move `amount` de `from` para a custódia do pool.
    fn transfer_in(&mut self, asset: Asset, amount: U256, from: &AccountId) -> Result<(), LedgerError>;

    /// Move `amount` da custódia do pool para `to`.
    fn transfer_out(&mut self, asset: Asset, amount: U256, to: &AccountId) -> Result<(), LedgerError>;
}

/// Ledger em memória: saldos por conta/ativo e a custódia do pool.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    balances: BTreeMap<(AccountId, Asset), U256>,
    custody: BTreeMap<Asset, U256>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cunha saldo para uma conta (fixtures, demo).
    pub fn credit(&mut self, account: &AccountId, asset: Asset, amount: U256) {
        let slot = self.balances.entry((account.clone(), asset)).or_default();
        *slot = slot.saturating_add(amount);
    }

    pub fn balance_of(&self, account: &AccountId, asset: Asset) -> U256 {
        self.balances
            .get(&(account.clone(), asset))
            .copied()
            .unwrap_or_default()
    }

    /// Saldo sob custódia do pool.
    pub fn custody(&self, asset: Asset) -> U256 {
        self.custody.get(&asset).copied().unwrap_or_default()
    }
}

impl Ledger for InMemoryLedger {
    fn transfer_in(&mut self, asset: Asset, amount: U256, from: &AccountId) -> Result<(), LedgerError> {
        let key = (from.clone(), asset);
        let balance = self.balances.get(&key).copied().unwrap_or_default();
        let remaining = balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::new(asset, amount, format!("insufficient balance for {}", from)))?;
        let held = self.custody(asset);
        let held = held
            .checked_add(amount)
            .ok_or_else(|| LedgerError::new(asset, amount, "custody overflow"))?;
        self.balances.insert(key, remaining);
        self.custody.insert(asset, held);
        Ok(())
    }

    fn transfer_out(&mut self, asset: Asset, amount: U256, to: &AccountId) -> Result<(), LedgerError> {
        let held = self
            .custody(asset)
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::new(asset, amount, "insufficient custody"))?;
        self.custody.insert(asset, held);
        self.credit(to, asset, amount);
        Ok(())
    }
}
