use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

/// Mapa de status salvo para a conta (conta desconhecida devolve mapa vazio)
pub async fn get_statuses(
    State(state): State<Arc<AppState>>,
    Path(scope_id): Path<String>,
) -> Json<Value> {
    log_request_received(&format!("/status/{}", scope_id), "GET");

    let statuses = state.dispatcher.store().load(&scope_id).await;

    Json(json!({
        "scope_id": scope_id,
        "statuses": statuses
    }))
}
