use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Instant;

use crate::models::AmoWebhookPayload;
use crate::utils::logging::*;
use crate::utils::AppError;
use crate::AppState;

/// Recebe o webhook do amoCRM de uma conta e repassa as mensagens ao Telegram
///
/// Qualquer falha de parsing vira um único 500 genérico; falhas de envio ao
/// Telegram e do cache de status são tratadas (e logadas) mais abaixo.
pub async fn handle_amocrm_webhook(
    State(state): State<Arc<AppState>>,
    Path(scope_id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let start_time = Instant::now();
    let endpoint = format!("/webhooks/amocrm/{}", scope_id);
    log_request_received(&endpoint, "POST");

    let payload: AmoWebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        log_validation_error("payload", &format!("Invalid JSON (conta {}): {}", scope_id, e));
        AppError::JsonError(e)
    })?;

    log_webhook_received(&scope_id, &payload.sections().join(", "));

    let summary = state.dispatcher.dispatch(&scope_id, &payload).await;

    log_info(&format!(
        "✅ Webhook da conta {} processado: {} enviadas, {} falharam, {} ignoradas, {} status em cache",
        scope_id, summary.sent, summary.failed, summary.skipped, summary.statuses_cached
    ));

    let processing_time = start_time.elapsed().as_millis() as u64;
    log_request_processed(&endpoint, 200, processing_time);

    Ok(Json(json!({
        "status": "success",
        "message": "Webhook обработан успешно"
    })))
}
