//! Tipos de erro para o crate telegram

use thiserror::Error;

/// Erros do cliente Telegram
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Erro de requisição HTTP (conexão, timeout, corpo inválido)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// A Bot API respondeu com `ok: false` ou status não-2xx
    #[error("Telegram API error (status {status}): {description}")]
    ApiError { status: u16, description: String },

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Erro de configuração
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, TelegramError>;
