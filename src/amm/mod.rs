pub mod types;         // U256/U512, ativos, direção, snapshot
pub mod config;        // taxa e política de saída zero
pub mod guardrails;    // checagens e aritmética larga
pub mod pricing;       // cotação x*y=k com taxa
pub mod invariant;     // k não decresce; proporção preservada
pub mod pool;          // estado das reservas
pub mod liquidity;     // shares, depósito/saque, posições
pub mod swap;          // orquestração do swap
pub mod ledger;        // fronteira de custódia
pub mod dex;           // fachada serializada

// módulos unificados de erro
pub mod error_catalog;
pub mod error;
pub mod error_map;
