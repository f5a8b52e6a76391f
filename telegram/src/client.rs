//! Cliente HTTP para a Telegram Bot API

use crate::error::{Result, TelegramError};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoint público da Bot API
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Todas as mensagens saem com `parse_mode=HTML`
const PARSE_MODE: &str = "HTML";

/// Mensagem confirmada pela API (`result` do `sendMessage`)
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

/// Cliente para enviar mensagens via bot do Telegram
#[derive(Clone)]
pub struct TelegramClient {
    http_client: HttpClient,
    bot_token: String,
    api_base: String,
}

impl TelegramClient {
    /// Cria um novo cliente apontando para a API pública
    ///
    /// # Timeouts
    ///
    /// - Total: 30s
    /// - Connect: 5s
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        Self::with_options(bot_token, DEFAULT_API_BASE, 30, 5)
    }

    /// Cria um cliente com base URL e timeouts customizados
    pub fn with_options(
        bot_token: impl Into<String>,
        api_base: impl Into<String>,
        total_timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(total_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .map_err(|e| TelegramError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            bot_token: bot_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Envia uma mensagem de texto com `parse_mode=HTML`
    ///
    /// Erros de transporte saem sem a URL, que carrega o token do bot.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        // Nunca logar a URL completa: ela carrega o token do bot
        tracing::debug!("POST {}/bot***/sendMessage (chat_id: {})", self.api_base, chat_id);

        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::HttpError(e.without_url()))?;
        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| TelegramError::HttpError(e.without_url()))?;

        let parsed: ApiResponse<SentMessage> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) if (200..300).contains(&status) => return Err(TelegramError::JsonError(e)),
            Err(_) => {
                tracing::error!("Telegram API error ({}): {}", status, raw);
                return Err(TelegramError::ApiError {
                    status,
                    description: raw,
                });
            }
        };

        if !parsed.ok {
            let description = parsed
                .description
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::error!("Telegram API error ({}): {}", status, description);
            return Err(TelegramError::ApiError {
                status: parsed.error_code.unwrap_or(status),
                description,
            });
        }

        parsed.result.ok_or_else(|| TelegramError::ApiError {
            status,
            description: "Response without result".to_string(),
        })
    }

    /// Obtém a URL base configurada
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}
