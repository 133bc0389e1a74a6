//! Motor de preço CPMM (x·y=k) com taxa sobre o input.
//! Dono da política de taxa; funções puras, sem estado do pool.
//!
//! Fórmula (inteira, floor, produtos em U1024):
//! `eff = input * (DEN - NUM)`
//! `out = floor( eff * R_out / (R_in * DEN + eff) )`
//!
//! A taxa fica na reserva de entrada, o que faz `k` crescer a cada swap.

use tracing::debug;

use super::config::FeePolicy;
use super::error::Result;
use super::error_catalog::DexErrorCode;
use super::error_map::from_quote_inputs;
use super::guardrails::{ensure_nonzero, ensure_reserves, mul_div_floor, narrow_1024, widen_1024};
use super::types::{PPM_SCALE, U1024, U256, UNIT};
use crate::dex_bail;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PricingEngine {
    fee: FeePolicy,
}

impl PricingEngine {
    pub fn new(fee: FeePolicy) -> Self {
        Self { fee }
    }

    pub fn fee(&self) -> FeePolicy {
        self.fee
    }

    /// Calcula a saída de um swap de `input_amount` contra as reservas dadas.
    /// Garante `0 <= out < output_reserve`; determinística.
    pub fn quote(&self, input_amount: U256, input_reserve: U256, output_reserve: U256) -> Result<U256> {
        if let Some(err) = from_quote_inputs(input_amount, input_reserve, output_reserve) {
            return Err(err);
        }
        // input * (DEN - NUM) * R_out chega a ~2^544: três fatores em U1024
        let den = U1024::from(self.fee.denominator());
        let effective = widen_1024(input_amount) * U1024::from(self.fee.retained());
        let numerator = effective * widen_1024(output_reserve);
        let denominator = widen_1024(input_reserve) * den + effective;
        // denominator > effective, então out < output_reserve e cabe em U256
        let out = narrow_1024(numerator / denominator)?;
        debug!(
            input = %input_amount,
            input_reserve = %input_reserve,
            output_reserve = %output_reserve,
            output = %out,
            "quote"
        );
        Ok(out)
    }

    /// Menor input cuja cotação entrega ao menos `output`.
    /// Fórmula fechada (ceil) + ajuste fino para absorver o floor de `quote`.
    pub fn required_input(&self, output: U256, input_reserve: U256, output_reserve: U256) -> Result<U256> {
        ensure_nonzero(output, "output")?;
        ensure_reserves(input_reserve, output_reserve)?;
        if output >= output_reserve {
            dex_bail!(DexErrorCode::InsufficientReserve, side => "output");
        }
        if self.fee.retained() == 0 {
            dex_bail!(DexErrorCode::InvalidArgument, reason => "fee retains no input");
        }
        // in = ceil( R_in * out * DEN / ((R_out - out) * (DEN - NUM)) )
        let num = widen_1024(input_reserve) * widen_1024(output) * U1024::from(self.fee.denominator());
        let den = widen_1024(output_reserve - output) * U1024::from(self.fee.retained());
        let (q, r) = num.div_mod(den);
        let q = if r.is_zero() { q } else { q + U1024::one() };
        let mut guess = narrow_1024(q)?;
        if guess.is_zero() {
            guess = U256::one();
        }
        // o ceil pode passar do mínimo em 1 unidade
        while guess > U256::one() && self.quote(guess - U256::one(), input_reserve, output_reserve)? >= output {
            guess -= U256::one();
        }
        while self.quote(guess, input_reserve, output_reserve)? < output {
            guess = guess
                .checked_add(U256::one())
                .ok_or_else(|| crate::dex_err!(DexErrorCode::InvalidArgument, reason => "overflow"))?;
        }
        Ok(guess)
    }

    /// Preço à vista de 1 unidade de entrada em unidades de saída: `R_out/R_in`
    /// escalado por `UNIT` (floor).
    pub fn spot_price(&self, input_reserve: U256, output_reserve: U256) -> Result<U256> {
        ensure_reserves(input_reserve, output_reserve)?;
        mul_div_floor(output_reserve, U256::from(UNIT), input_reserve)
    }

    /// Impacto de preço em **PPM** comparando execução vs. à vista (inclui a
    /// taxa): `(1 - (out/in) / (R_out/R_in)) * 1e6`, saturado em `[0, 1e6]`.
    pub fn price_impact_ppm(&self, input_amount: U256, input_reserve: U256, output_reserve: U256) -> Result<u32> {
        let out = self.quote(input_amount, input_reserve, output_reserve)?;
        // exec/spot = out * R_in / (in * R_out)
        let realized = widen_1024(out) * widen_1024(input_reserve);
        let ideal = widen_1024(input_amount) * widen_1024(output_reserve);
        if realized >= ideal {
            return Ok(0);
        }
        let gap = (ideal - realized) * U1024::from(PPM_SCALE);
        let ppm = gap / ideal;
        Ok(ppm.low_u32().min(PPM_SCALE))
    }
}

/// `min_out` aceito para uma cotação com tolerância `tolerance_ppm` (0..1e6):
/// `floor( quote * (1 - tol) )`.
pub fn min_out_with_tolerance(quote: U256, tolerance_ppm: u32) -> Result<U256> {
    let tol = tolerance_ppm.min(PPM_SCALE);
    mul_div_floor(quote, U256::from(PPM_SCALE - tol), U256::from(PPM_SCALE))
}
