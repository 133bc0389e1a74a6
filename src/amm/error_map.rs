//! Mapeamento entre condições de domínio e códigos de erro do DEX.
use crate::amm::error::DexError;
use crate::amm::error_catalog::DexErrorCode;
use crate::amm::types::U256;

/// Determina o erro de uma cotação a partir dos inputs brutos, ou `None`
/// quando `quote` pode prosseguir. O motivo vai no contexto `reason`.
pub fn from_quote_inputs(
    input_amount: U256,
    input_reserve: U256,
    output_reserve: U256,
) -> Option<DexError> {
    if input_amount.is_zero() {
        return Some(invalid("input amount must be > 0"));
    }
    if input_reserve.is_zero() || output_reserve.is_zero() {
        return Some(invalid("reserves must be > 0"));
    }
    if input_reserve.checked_add(input_amount).is_none() {
        return Some(invalid("overflow"));
    }
    None
}

fn invalid(reason: &str) -> DexError {
    DexError::new(DexErrorCode::InvalidArgument).with_context("reason", reason)
}
