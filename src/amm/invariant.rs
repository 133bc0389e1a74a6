//! Asserções de invariante usadas por `PoolState` e pela contabilidade de
//! liquidez. Falha aqui é defeito a montante, nunca erro de usuário.

use tracing::error;

use super::error::Result;
use super::guardrails::{invariant_violation, mul_wide, widen};
use super::types::{PoolSnapshot, U256};

/// Tolerância padrão de proporção: um passo de arredondamento.
pub const RATIO_TOLERANCE_STEPS: u32 = 1;

/// `base' * token' >= base * token` (swap nunca diminui k).
pub fn check_product_non_decreasing(before: &PoolSnapshot, after: &PoolSnapshot) -> Result<()> {
    let k0 = mul_wide(before.base_reserve, before.token_reserve);
    let k1 = mul_wide(after.base_reserve, after.token_reserve);
    if k1 < k0 {
        error!(k_before = %k0, k_after = %k1, "constant product decreased");
        return Err(invariant_violation(
            "product_non_decreasing",
            format!("k {} -> {}", k0, k1),
        ));
    }
    Ok(())
}

/// Proporção `base/token` preservada a menos de `tolerance` passos de
/// arredondamento. Comparada por produto cruzado:
/// `|b0*t1 - b1*t0| <= tolerance * max(b0, t0)`.
///
/// Um pool que volta a vazio (saque total) não tem proporção e passa.
pub fn check_ratio_preserved(before: &PoolSnapshot, after: &PoolSnapshot, tolerance: u32) -> Result<()> {
    if after.base_reserve.is_zero() && after.token_reserve.is_zero() {
        return Ok(());
    }
    let lhs = mul_wide(before.base_reserve, after.token_reserve);
    let rhs = mul_wide(after.base_reserve, before.token_reserve);
    let drift = if lhs >= rhs { lhs - rhs } else { rhs - lhs };
    let step = before.base_reserve.max(before.token_reserve);
    let allowed = widen(step) * widen(U256::from(tolerance));
    if drift > allowed {
        error!(drift = %drift, allowed = %allowed, "reserve ratio drifted");
        return Err(invariant_violation(
            "ratio_preserved",
            format!("drift {} > allowed {}", drift, allowed),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::error_catalog::DexErrorCode;

    fn snap(b: u64, t: u64) -> PoolSnapshot {
        PoolSnapshot {
            base_reserve: U256::from(b),
            token_reserve: U256::from(t),
            total_shares: U256::zero(),
        }
    }

    #[test]
    fn t_product_growth_ok() {
        assert!(check_product_non_decreasing(&snap(100, 100), &snap(110, 91)).is_ok());
        assert!(check_product_non_decreasing(&snap(100, 100), &snap(100, 100)).is_ok());
    }

    #[test]
    fn t_product_decrease_is_fatal() {
        let err = check_product_non_decreasing(&snap(100, 100), &snap(110, 90)).unwrap_err();
        assert_eq!(err.code, DexErrorCode::InvariantViolated);
        assert!(!err.is_recoverable());
        assert_eq!(err.context.get("invariant").unwrap(), "product_non_decreasing");
    }

    #[test]
    fn t_ratio_exact_and_rounding() {
        assert!(check_ratio_preserved(&snap(300, 300), &snap(400, 400), 1).is_ok());
        // deposito com ceil no token: 300/301 contra 3/3
        assert!(check_ratio_preserved(&snap(3, 3), &snap(300, 301), 1).is_ok());
        assert!(check_ratio_preserved(&snap(300, 300), &snap(0, 0), 1).is_ok());
    }

    #[test]
    fn t_ratio_drift_is_fatal() {
        let err = check_ratio_preserved(&snap(300, 300), &snap(400, 500), 1).unwrap_err();
        assert_eq!(err.code, DexErrorCode::InvariantViolated);
        assert_eq!(err.context.get("invariant").unwrap(), "ratio_preserved");
    }
}
