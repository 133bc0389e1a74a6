//! Catálogo imutável de erros do DEX.
use core::fmt;

/// Código de erro do DEX.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum DexErrorCode {
    /// Argumento do chamador viola uma pré-condição (zero, excede shares...).
    InvalidArgument,
    /// Segunda tentativa de inicializar o pool.
    AlreadyInitialized,
    /// Operação drenaria uma reserva ou o total de shares.
    InsufficientReserve,
    /// Defeito interno: invariante do pool quebrado. Não recuperável.
    InvariantViolated,
    /// O ledger externo recusou uma transferência.
    SettlementFailed,
}

impl DexErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "DEX-0001",
            Self::AlreadyInitialized => "DEX-0002",
            Self::InsufficientReserve => "DEX-0003",
            Self::InvariantViolated => "DEX-0004",
            Self::SettlementFailed => "DEX-0005",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "Argumento inválido",
            Self::AlreadyInitialized => "Pool já inicializado",
            Self::InsufficientReserve => "Reserva insuficiente",
            Self::InvariantViolated => "Invariante violado",
            Self::SettlementFailed => "Liquidação recusada",
        }
    }

    /// Mensagem base em português (aceita placeholders `{chave}`).
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "argumento inválido: {reason}",
            Self::AlreadyInitialized => "pool já possui reservas",
            Self::InsufficientReserve => "operação esvaziaria a reserva {side}",
            Self::InvariantViolated => "invariante {invariant} violado; transação abortada",
            Self::SettlementFailed => "ledger recusou a transferência: {reason}",
        }
    }

    /// Erros de chamador podem ser reenviados com inputs corrigidos.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvariantViolated)
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [DexErrorCode] {
        const ALL: &[DexErrorCode] = &[
            DexErrorCode::InvalidArgument,
            DexErrorCode::AlreadyInitialized,
            DexErrorCode::InsufficientReserve,
            DexErrorCode::InvariantViolated,
            DexErrorCode::SettlementFailed,
        ];
        ALL
    }
}

impl fmt::Display for DexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: DexErrorCode) -> &'static str {
    code.message_pt()
}
