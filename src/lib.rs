// Biblioteca do relay amoCRM → Telegram
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::utils::{AppError, AppResult};

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: services::WebhookDispatcher,
}

impl AppState {
    /// Monta cliente Telegram, cache de status e dispatcher a partir das configurações
    pub fn from_settings(settings: &config::Settings) -> AppResult<Self> {
        let telegram = telegram::TelegramClient::with_options(
            settings.telegram.bot_token.clone(),
            settings.telegram.api_base.clone(),
            settings.telegram.timeout_seconds,
            5,
        )
        .map_err(|e| AppError::ConfigError(format!("Failed to create Telegram client: {}", e)))?;

        let store = services::StatusStore::new(&settings.storage.data_dir);
        let dispatcher = services::WebhookDispatcher::new(settings, telegram, store);

        Ok(Self { dispatcher })
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/webhooks/amocrm/:scope_id", post(handlers::handle_amocrm_webhook))
        .route("/status/:scope_id", get(handlers::get_statuses))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(middleware::panic_response)),
        )
        .with_state(state)
}
