//! Parâmetros do pool: política de taxa e política de saída zero.
//! Lidos de código, de serde (JSON/TOML do host) ou de variáveis de ambiente.

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::error_catalog::DexErrorCode;
use crate::{dex_bail, dex_err};

pub const ENV_FEE_NUMERATOR: &str = "DEX_FEE_NUMERATOR";
pub const ENV_FEE_DENOMINATOR: &str = "DEX_FEE_DENOMINATOR";
pub const ENV_REJECT_ZERO_OUTPUT: &str = "DEX_REJECT_ZERO_OUTPUT";

/// Taxa proporcional `numerator/denominator` descontada do input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFee", into = "RawFee")]
pub struct FeePolicy {
    numerator: u32,
    denominator: u32,
}

#[derive(Serialize, Deserialize)]
struct RawFee {
    numerator: u32,
    denominator: u32,
}

impl FeePolicy {
    /// 0,3%.
    pub const DEFAULT: FeePolicy = FeePolicy { numerator: 3, denominator: 1000 };

    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if denominator == 0 {
            dex_bail!(DexErrorCode::InvalidArgument, reason => "fee denominator must be > 0");
        }
        if numerator >= denominator {
            dex_bail!(
                DexErrorCode::InvalidArgument,
                reason => "fee must be < 100%",
                fee => format!("{}/{}", numerator, denominator),
            );
        }
        Ok(Self { numerator, denominator })
    }

    /// Sem taxa (útil para checar conservação exata de k).
    pub fn zero() -> Self {
        Self { numerator: 0, denominator: 1 }
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// `denominator - numerator`: fração do input que entra na curva.
    pub fn retained(&self) -> u32 {
        self.denominator - self.numerator
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<RawFee> for FeePolicy {
    type Error = super::error::DexError;

    fn try_from(raw: RawFee) -> Result<Self> {
        FeePolicy::new(raw.numerator, raw.denominator)
    }
}

impl From<FeePolicy> for RawFee {
    fn from(fee: FeePolicy) -> Self {
        RawFee { numerator: fee.numerator, denominator: fee.denominator }
    }
}

/// O que fazer quando a cotação arredonda para 0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroOutputPolicy {
    /// Swap segue com saída 0 (o input fica inteiro no pool).
    #[default]
    Allow,
    /// Swap é rejeitado com `InvalidArgument` antes de qualquer mutação.
    Reject,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub fee: FeePolicy,
    pub zero_output: ZeroOutputPolicy,
}

impl PoolConfig {
    pub fn new(fee: FeePolicy, zero_output: ZeroOutputPolicy) -> Self {
        Self { fee, zero_output }
    }

    /// Lê a configuração do ambiente; variáveis ausentes usam o default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual a [`PoolConfig::from_env`], com fonte de variáveis injetável.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = FeePolicy::default();
        let numerator = parse_u32(&lookup, ENV_FEE_NUMERATOR)?.unwrap_or(default.numerator);
        let denominator = parse_u32(&lookup, ENV_FEE_DENOMINATOR)?.unwrap_or(default.denominator);
        let fee = FeePolicy::new(numerator, denominator)?;

        let zero_output = match lookup(ENV_REJECT_ZERO_OUTPUT) {
            None => ZeroOutputPolicy::Allow,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => ZeroOutputPolicy::Reject,
                "0" | "false" | "no" | "" => ZeroOutputPolicy::Allow,
                _ => dex_bail!(
                    DexErrorCode::InvalidArgument,
                    reason => "invalid boolean",
                    var => ENV_REJECT_ZERO_OUTPUT,
                    value => raw,
                ),
            },
        };
        Ok(Self { fee, zero_output })
    }
}

fn parse_u32<F>(lookup: &F, key: &str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u32>().map(Some).map_err(|_| {
            dex_err!(DexErrorCode::InvalidArgument, reason => "invalid integer", var => key, value => raw)
        }),
    }
}
