//! Estado mutável do pool: duas reservas e o total de shares.
//! Única fonte de verdade; só muda pelas entradas abaixo, e cada uma valida
//! o estado resultante antes de commitar (nada parcial chega ao estado).

use super::error::Result;
use super::error_catalog::DexErrorCode;
use super::guardrails::{checked_add, checked_sub, ensure_nonzero};
use super::invariant::{check_product_non_decreasing, check_ratio_preserved, RATIO_TOLERANCE_STEPS};
use super::liquidity::initial_shares;
use super::types::{Direction, PoolSnapshot, U256};
use crate::dex_bail;

/// Variação com sinal de uma reserva ou do total de shares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delta {
    Increase(U256),
    Decrease(U256),
}

impl Delta {
    fn apply(self, current: U256, side: &str) -> Result<U256> {
        match self {
            Delta::Increase(v) => checked_add(current, v),
            Delta::Decrease(v) => checked_sub(current, v, side),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolState {
    base_reserve: U256,
    token_reserve: U256,
    total_shares: U256,
}

impl PoolState {
    /// Pool vazio (não inicializado).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        !self.base_reserve.is_zero() && !self.token_reserve.is_zero()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            base_reserve: self.base_reserve,
            token_reserve: self.token_reserve,
            total_shares: self.total_shares,
        }
    }

    pub fn base_reserve(&self) -> U256 {
        self.base_reserve
    }

    pub fn token_reserve(&self) -> U256 {
        self.token_reserve
    }

    pub fn total_shares(&self) -> U256 {
        self.total_shares
    }

    /// Financia o pool uma única vez. O total de shares inicial é a unidade
    /// definida por [`initial_shares`]. Retorna as shares emitidas.
    pub fn initialize(&mut self, base_amount: U256, token_amount: U256) -> Result<U256> {
        if !self.base_reserve.is_zero() || !self.token_reserve.is_zero() {
            dex_bail!(DexErrorCode::AlreadyInitialized);
        }
        ensure_nonzero(base_amount, "base amount")?;
        ensure_nonzero(token_amount, "token amount")?;
        let shares = initial_shares(base_amount, token_amount);
        self.base_reserve = base_amount;
        self.token_reserve = token_amount;
        self.total_shares = shares;
        Ok(shares)
    }

    /// Soma `input_amount` na reserva de entrada e subtrai `output_amount` da
    /// de saída. A reserva de saída precisa continuar > 0; depois checa que
    /// `k` não caiu.
    pub fn apply_swap(&mut self, direction: Direction, input_amount: U256, output_amount: U256) -> Result<()> {
        let before = self.snapshot();
        let (input_reserve, output_reserve) = before.oriented(direction);
        let output_side = direction.output_asset().to_string();
        if output_amount >= output_reserve {
            dex_bail!(DexErrorCode::InsufficientReserve, side => output_side);
        }
        let next_input = checked_add(input_reserve, input_amount)?;
        let next_output = checked_sub(output_reserve, output_amount, &output_side)?;

        let mut next = before;
        match direction {
            Direction::BaseToToken => {
                next.base_reserve = next_input;
                next.token_reserve = next_output;
            }
            Direction::TokenToBase => {
                next.token_reserve = next_input;
                next.base_reserve = next_output;
            }
        }
        check_product_non_decreasing(&before, &next)?;
        self.commit(next);
        Ok(())
    }

    /// Aplica deltas de depósito/saque de forma atômica. Um saque pode zerar
    /// tudo (pool volta a não inicializado), nunca só um dos lados.
    pub fn apply_liquidity_change(&mut self, base: Delta, token: Delta, shares: Delta) -> Result<()> {
        let before = self.snapshot();
        let next = PoolSnapshot {
            base_reserve: base.apply(before.base_reserve, "base")?,
            token_reserve: token.apply(before.token_reserve, "token")?,
            total_shares: shares.apply(before.total_shares, "shares")?,
        };
        let zeros = [next.base_reserve, next.token_reserve, next.total_shares]
            .iter()
            .filter(|v| v.is_zero())
            .count();
        if zeros != 0 && zeros != 3 {
            let side = if next.base_reserve.is_zero() {
                "base"
            } else if next.token_reserve.is_zero() {
                "token"
            } else {
                "shares"
            };
            dex_bail!(DexErrorCode::InsufficientReserve, side => side);
        }
        if before.is_empty() {
            dex_bail!(DexErrorCode::InvalidArgument, reason => "pool not initialized");
        }
        check_ratio_preserved(&before, &next, RATIO_TOLERANCE_STEPS)?;
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, next: PoolSnapshot) {
        self.base_reserve = next.base_reserve;
        self.token_reserve = next.token_reserve;
        self.total_shares = next.total_shares;
    }
}
