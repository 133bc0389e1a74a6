//! Tipo de erro unificado do DEX com formatação estável.
use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::amm::error_catalog::{default_locale_message, DexErrorCode};

const CONTEXT_VALUE_MAX: usize = 256;

/// Texto usado na mensagem de UI quando o contexto não traz o placeholder.
const MISSING_PLACEHOLDER: &str = "?";

fn sanitize_value(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\n' | '\r' | '\t' => cleaned.push(' '),
            _ => cleaned.push(ch),
        }
    }
    if cleaned.chars().count() > CONTEXT_VALUE_MAX {
        let mut truncated = cleaned
            .chars()
            .take(CONTEXT_VALUE_MAX - 1)
            .collect::<String>();
        truncated.push('…');
        truncated
    } else {
        cleaned
    }
}

fn render_template(
    template: &str,
    context: &BTreeMap<String, String>,
    missing: Option<&str>,
) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '{' {
            rendered.push(ch);
            continue;
        }
        let mut key = String::new();
        for next in chars.by_ref() {
            if next == '}' {
                break;
            }
            key.push(next);
        }
        match (context.get(&key), missing) {
            (Some(value), _) if !key.is_empty() => rendered.push_str(value),
            (_, Some(fallback)) if !key.is_empty() => rendered.push_str(fallback),
            _ => {
                rendered.push('{');
                rendered.push_str(&key);
                rendered.push('}');
            }
        }
    }
    rendered
}

#[derive(Serialize)]
struct LogRecord<'a> {
    code: &'static str,
    title: &'static str,
    message: String,
    context: &'a BTreeMap<String, String>,
}

/// Erro do DEX com contexto estruturado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexError {
    pub code: DexErrorCode,
    pub context: BTreeMap<String, String>,
}

impl DexError {
    /// Cria um novo erro sem contexto adicional.
    pub fn new(code: DexErrorCode) -> Self {
        Self {
            code,
            context: BTreeMap::new(),
        }
    }

    /// Adiciona um par chave/valor ao contexto.
    pub fn with_context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let key_string = key.into();
        if !key_string.is_empty() {
            let sanitized = sanitize_value(&value.to_string());
            self.context.insert(key_string, sanitized);
        }
        self
    }

    pub fn code(&self) -> DexErrorCode {
        self.code
    }

    /// `false` apenas para `InvariantViolated`: a transação inteira deve abortar.
    pub fn is_recoverable(&self) -> bool {
        self.code.is_recoverable()
    }

    fn resolved_message(&self) -> String {
        let template = default_locale_message(self.code);
        render_template(template, &self.context, Some(MISSING_PLACEHOLDER))
    }

    /// Mensagem curta para UI.
    pub fn to_user_string(&self) -> String {
        let message = self.resolved_message();
        format!("[{}] {}", self.code.code(), message)
    }

    /// Renderiza um template arbitrário usando o contexto atual.
    /// Placeholders desconhecidos ficam literais.
    pub fn render_with_template(&self, template: &str) -> String {
        render_template(template, &self.context, None)
    }

    /// Serialização estável em JSON para logs.
    pub fn to_log_json(&self) -> String {
        let record = LogRecord {
            code: self.code.code(),
            title: self.code.title(),
            message: self.resolved_message(),
            context: &self.context,
        };
        serde_json::to_string(&record).unwrap_or_else(|_| {
            format!("{{\"code\":\"{}\"}}", self.code.code())
        })
    }
}

impl fmt::Display for DexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_string())
    }
}

impl std::error::Error for DexError {}

impl From<DexErrorCode> for DexError {
    fn from(code: DexErrorCode) -> Self {
        DexError::new(code)
    }
}

/// Resultado padrão para operações do DEX.
pub type Result<T> = std::result::Result<T, DexError>;

#[macro_export]
macro_rules! dex_err {
  ($code:expr) => {{
    $crate::amm::error::DexError::new($code)
  }};
  ($code:expr, $($key:ident => $value:expr),+ $(,)?) => {{
    let mut err = $crate::amm::error::DexError::new($code);
    $(
      err = err.with_context(stringify!($key), $value);
    )+
    err
  }};
  ($code:expr, { $($key:expr => $value:expr),+ $(,)? }) => {{
    let mut err = $crate::amm::error::DexError::new($code);
    $(
      err = err.with_context($key, $value);
    )+
    err
  }};
}

#[macro_export]
macro_rules! dex_bail {
  ($($tt:tt)*) => {
    return Err($crate::dex_err!($($tt)*))
  };
}
