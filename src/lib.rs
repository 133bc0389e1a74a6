//! Motor de um pool de produto constante (base/token): cotação com taxa,
//! contabilidade de reservas e shares de liquidez.

pub mod amm;
pub mod telemetry;

pub use amm::config::{FeePolicy, PoolConfig, ZeroOutputPolicy};
pub use amm::dex::{DepositReceipt, Dex, WithdrawReceipt};
pub use amm::error::{DexError, Result};
pub use amm::error_catalog::DexErrorCode;
pub use amm::ledger::{InMemoryLedger, Ledger, LedgerError};
pub use amm::types::{units, AccountId, Asset, Direction, PoolSnapshot, SwapRequest, U256, U512};
