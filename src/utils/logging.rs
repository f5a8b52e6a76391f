use tracing::{debug, error, info, warn};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_request_processed(endpoint: &str, status: u16, duration_ms: u64) {
    info!("Request processed: {} - Status: {} - Duration: {}ms",
          endpoint, status, duration_ms);
}

pub fn log_webhook_received(scope_id: &str, sections: &str) {
    info!("📥 Webhook amoCRM recebido (conta {}): seções [{}]", scope_id, sections);
}

pub fn log_telegram_sent(chat_id: &str, message_id: i64) {
    info!("📤 Mensagem enviada ao Telegram: chat {} - message_id {}", chat_id, message_id);
}

pub fn log_telegram_error(chat_id: &str, error: &str) {
    error!("❌ Falha ao enviar mensagem ao Telegram: chat {} - Error: {}", chat_id, error);
}

pub fn log_statuses_saved(scope_id: &str, count: usize) {
    info!("💾 Status de leads da conta {} salvos ({} registros)", scope_id, count);
}

pub fn log_statuses_load_error(scope_id: &str, error: &str) {
    error!("Erro ao carregar status de leads da conta {}: {}", scope_id, error);
}

pub fn log_statuses_save_error(scope_id: &str, error: &str) {
    error!("Erro ao salvar status de leads da conta {}: {}", scope_id, error);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 amoCRM-Telegram relay server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
