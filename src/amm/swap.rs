//! Orquestração de um swap: cotação no `PricingEngine`, política de saída
//! zero/slippage e commit no `PoolState`. Sem estado próprio; não mascara
//! erros de quem chama.

use tracing::info;

use super::config::{PoolConfig, ZeroOutputPolicy};
use super::error::Result;
use super::error_catalog::DexErrorCode;
use super::pool::PoolState;
use super::pricing::PricingEngine;
use super::types::{Direction, PoolSnapshot, SwapRequest, U256};
use crate::dex_bail;

/// Resultado de um swap commitado (a liquidar pelo ledger externo).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
    pub direction: Direction,
    pub input_amount: U256,
    pub output_amount: U256,
    pub before: PoolSnapshot,
    pub after: PoolSnapshot,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SwapExecutor {
    pricing: PricingEngine,
    zero_output: ZeroOutputPolicy,
}

impl SwapExecutor {
    pub fn new(pricing: PricingEngine, zero_output: ZeroOutputPolicy) -> Self {
        Self { pricing, zero_output }
    }

    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(PricingEngine::new(config.fee), config.zero_output)
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Só cota, sem tocar no pool.
    pub fn preview(&self, pool: &PoolSnapshot, request: &SwapRequest) -> Result<U256> {
        let (input_reserve, output_reserve) = pool.oriented(request.direction);
        let output = self.pricing.quote(request.input_amount, input_reserve, output_reserve)?;
        if output.is_zero() && self.zero_output == ZeroOutputPolicy::Reject {
            dex_bail!(DexErrorCode::InvalidArgument, reason => "swap output rounds to zero");
        }
        if output < request.min_output {
            dex_bail!(
                DexErrorCode::InvalidArgument,
                reason => "slippage",
                output => output,
                min_output => request.min_output,
            );
        }
        Ok(output)
    }

    /// Cota e commita no pool. Qualquer falha acontece antes da mutação.
    pub fn execute(&self, pool: &mut PoolState, request: &SwapRequest) -> Result<SwapOutcome> {
        let before = pool.snapshot();
        let output = self.preview(&before, request)?;
        pool.apply_swap(request.direction, request.input_amount, output)?;
        let after = pool.snapshot();
        info!(
            direction = %request.direction,
            input = %request.input_amount,
            output = %output,
            base_reserve = %after.base_reserve,
            token_reserve = %after.token_reserve,
            "swap committed"
        );
        Ok(SwapOutcome {
            direction: request.direction,
            input_amount: request.input_amount,
            output_amount: output,
            before,
            after,
        })
    }
}
