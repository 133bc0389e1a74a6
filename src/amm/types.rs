//! Tipos básicos do pool (unidade mínima do ativo) + U256/U512 para contas.
//! Quantidades são sempre `U256`; produtos de dois fatores vivem em `U512`,
//! os de três (cotação) em `U1024`.

use core::fmt;

use serde::{Deserialize, Serialize};
use uint::construct_uint;

construct_uint! {
    /// Inteiro de 256 bits: domínio de todas as quantidades do pool.
    pub struct U256(4);
}

construct_uint! {
    /// Inteiro de 512 bits para produtos intermediários sem estouro.
    pub struct U512(8);
}

construct_uint! {
    /// Inteiro de 1024 bits: produtos de três fatores na cotação
    /// (`input * (DEN - NUM) * R_out` passa de 512 bits).
    pub struct U1024(16);
}

/// 1 unidade inteira do ativo (1e18 na menor denominação).
pub const UNIT: u128 = 1_000_000_000_000_000_000u128;

/// Escala de partes por milhão.
pub const PPM_SCALE: u32 = 1_000_000;

/// Atalho para `n` unidades inteiras.
#[inline]
pub fn units(n: u128) -> U256 {
    U256::from(n) * U256::from(UNIT)
}

/// Ativo do pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    Base,
    Token,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Base => f.write_str("base"),
            Asset::Token => f.write_str("token"),
        }
    }
}

/// Sentido do swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    BaseToToken,
    TokenToBase,
}

impl Direction {
    /// Ativo que entra no pool.
    pub const fn input_asset(self) -> Asset {
        match self {
            Direction::BaseToToken => Asset::Base,
            Direction::TokenToBase => Asset::Token,
        }
    }

    /// Ativo que sai do pool.
    pub const fn output_asset(self) -> Asset {
        match self {
            Direction::BaseToToken => Asset::Token,
            Direction::TokenToBase => Asset::Base,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::BaseToToken => "base_to_token",
            Direction::TokenToBase => "token_to_base",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pedido de swap (transiente, nunca persistido).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapRequest {
    pub direction: Direction,
    pub input_amount: U256,
    /// Saída mínima aceita pelo chamador (0 = sem proteção).
    pub min_output: U256,
}

impl SwapRequest {
    pub fn new(direction: Direction, input_amount: U256) -> Self {
        Self { direction, input_amount, min_output: U256::zero() }
    }

    pub fn with_min_output(mut self, min_output: U256) -> Self {
        self.min_output = min_output;
        self
    }
}

/// Identificador opaco de conta no ledger externo.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Foto somente-leitura de um estado **commitado** do pool.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    #[serde(with = "dec_u256")]
    pub base_reserve: U256,
    #[serde(with = "dec_u256")]
    pub token_reserve: U256,
    #[serde(with = "dec_u256")]
    pub total_shares: U256,
}

impl PoolSnapshot {
    /// Reservas na ordem (entrada, saída) para o sentido dado.
    pub fn oriented(&self, direction: Direction) -> (U256, U256) {
        match direction {
            Direction::BaseToToken => (self.base_reserve, self.token_reserve),
            Direction::TokenToBase => (self.token_reserve, self.base_reserve),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base_reserve.is_zero() && self.token_reserve.is_zero() && self.total_shares.is_zero()
    }
}

/// Serde de `U256` como string decimal (o `FromStr` do uint é hexadecimal).
pub mod dec_u256 {
    use super::U256;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(&raw).map_err(|e| D::Error::custom(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_direction_assets() {
        assert_eq!(Direction::BaseToToken.input_asset(), Asset::Base);
        assert_eq!(Direction::BaseToToken.output_asset(), Asset::Token);
        assert_eq!(Direction::TokenToBase.input_asset(), Asset::Token);
        assert_eq!(Direction::TokenToBase.output_asset(), Asset::Base);
    }

    #[test]
    fn t_snapshot_json_is_decimal() {
        let snap = PoolSnapshot {
            base_reserve: units(3),
            token_reserve: U256::MAX,
            total_shares: U256::zero(),
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"base_reserve\":\"3000000000000000000\""));
        let back: PoolSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
