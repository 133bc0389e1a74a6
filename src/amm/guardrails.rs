//! Validações e helpers numéricos seguros para o pool.
//! Objetivo: entradas seguras e multiplicações/divisões sem estouro
//! (produtos em U512, resultados estreitados de volta para U256).

use super::error::{DexError, Result};
use super::error_catalog::DexErrorCode;
use super::types::{U1024, U256, U512};
use crate::dex_err;

#[inline]
pub fn ensure_nonzero(amount: U256, what: &str) -> Result<()> {
    if amount.is_zero() {
        Err(dex_err!(DexErrorCode::InvalidArgument, { "reason" => format!("{} must be > 0", what) }))
    } else {
        Ok(())
    }
}

/// Reservas usadas numa cotação precisam ser ambas positivas.
#[inline]
pub fn ensure_reserves(input_reserve: U256, output_reserve: U256) -> Result<()> {
    if input_reserve.is_zero() || output_reserve.is_zero() {
        return Err(dex_err!(DexErrorCode::InvalidArgument, reason => "reserves must be > 0"));
    }
    Ok(())
}

#[inline]
pub fn checked_add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b)
        .ok_or_else(|| dex_err!(DexErrorCode::InvalidArgument, reason => "overflow"))
}

/// Subtração de reserva/shares; underflow vira `InsufficientReserve`.
#[inline]
pub fn checked_sub(a: U256, b: U256, side: &str) -> Result<U256> {
    a.checked_sub(b)
        .ok_or_else(|| dex_err!(DexErrorCode::InsufficientReserve, side => side))
}

/// Alarga U256 → U512 (limbs baixos).
#[inline]
pub fn widen(v: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(&v.0);
    U512(limbs)
}

/// Estreita U512 → U256, falhando se os limbs altos não forem zero.
#[inline]
pub fn narrow(v: U512) -> Result<U256> {
    if v.0[4..].iter().any(|limb| *limb != 0) {
        return Err(dex_err!(DexErrorCode::InvalidArgument, reason => "overflow"));
    }
    let mut limbs = [0u64; 4];
    limbs.copy_from_slice(&v.0[..4]);
    Ok(U256(limbs))
}

/// Alarga U256 → U1024.
#[inline]
pub fn widen_1024(v: U256) -> U1024 {
    let mut limbs = [0u64; 16];
    limbs[..4].copy_from_slice(&v.0);
    U1024(limbs)
}

/// Estreita U1024 → U256, falhando se sobrar algo acima de 256 bits.
#[inline]
pub fn narrow_1024(v: U1024) -> Result<U256> {
    if v.0[4..].iter().any(|limb| *limb != 0) {
        return Err(dex_err!(DexErrorCode::InvalidArgument, reason => "overflow"));
    }
    let mut limbs = [0u64; 4];
    limbs.copy_from_slice(&v.0[..4]);
    Ok(U256(limbs))
}

#[inline]
pub fn mul_wide(a: U256, b: U256) -> U512 {
    widen(a) * widen(b)
}

/// `floor(a * b / d)` sem estouro intermediário.
pub fn mul_div_floor(a: U256, b: U256, d: U256) -> Result<U256> {
    if d.is_zero() {
        return Err(dex_err!(DexErrorCode::InvalidArgument, reason => "division by zero"));
    }
    narrow(mul_wide(a, b) / widen(d))
}

/// `ceil(a * b / d)` sem estouro intermediário.
pub fn mul_div_ceil(a: U256, b: U256, d: U256) -> Result<U256> {
    if d.is_zero() {
        return Err(dex_err!(DexErrorCode::InvalidArgument, reason => "division by zero"));
    }
    let n = mul_wide(a, b);
    let d = widen(d);
    let (q, r) = n.div_mod(d);
    let q = if r.is_zero() { q } else { q + U512::one() };
    narrow(q)
}

/// Erro fatal de invariante, já com contexto.
pub fn invariant_violation(invariant: &str, detail: String) -> DexError {
    dex_err!(DexErrorCode::InvariantViolated, { "invariant" => invariant, "detail" => detail })
}
