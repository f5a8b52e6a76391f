/// amoCRM → Telegram relay
///
/// - Webhook do amoCRM chega em `/webhooks/amocrm/{scope_id}`
/// - Leads, tarefas e contatos viram mensagens HTML no chat da conta
/// - Status e funis alimentam o cache de nomes de status (um JSON por conta)

use std::sync::Arc;
use tokio::net::TcpListener;

use amocrm_telegram_relay::{config::Settings, create_router, utils::logging::*, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amocrm_telegram_relay=info,telegram=info,tower_http=info".into()),
        )
        .init();

    if dotenv_loaded {
        log_info("✅ Arquivo .env carregado com sucesso");
    }

    let settings = Settings::new()
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    if settings.telegram.bot_token.is_empty() {
        log_warning("⚠️ TELEGRAM_BOT_TOKEN não configurado - envios ao Telegram vão falhar");
    }
    if settings.telegram.default_chat_id.is_empty() {
        log_warning("⚠️ Chat padrão do Telegram não configurado");
    }

    log_info(&format!(
        "📁 Cache de status em '{}' ({} contas com chat próprio)",
        settings.storage.data_dir,
        settings.telegram.chat_ids.len()
    ));

    let app_state = Arc::new(AppState::from_settings(&settings)?);
    let app = create_router(app_state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(settings.server.port);
    let listener = TcpListener::bind(format!("{}:{}", settings.server.host, port)).await?;

    log_server_startup(port);
    log_server_ready(port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("Failed to install Ctrl+C handler: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("Failed to install SIGTERM handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
