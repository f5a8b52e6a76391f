//! Cliente da Telegram Bot API
//!
//! Cobre apenas o necessário para o relay de notificações do amoCRM:
//!
//! - `sendMessage` com `parse_mode` (HTML por padrão)
//! - Timeouts de conexão e total configuráveis
//! - Base URL configurável (útil para testes com servidor mock)
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use telegram::TelegramClient;
//!
//! #[tokio::main]
//! async fn main() -> telegram::Result<()> {
//!     let token = std::env::var("TELEGRAM_BOT_TOKEN")
//!         .expect("TELEGRAM_BOT_TOKEN não configurado");
//!
//!     let client = TelegramClient::new(token)?;
//!     client.send_message("-1001234567890", "📝 <b>Создана новая сделка</b>").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;

pub use client::{SentMessage, TelegramClient, DEFAULT_API_BASE};
pub use error::{Result, TelegramError};
