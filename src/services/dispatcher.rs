//! Orquestração de um webhook do amoCRM
//!
//! Ordem fixa: leads → tasks → contacts → lead_statuses → pipelines,
//! preservando a ordem dentro de cada lista. Seções de status/funil só
//! aquecem o cache, não geram mensagem.

use serde::Serialize;
use telegram::TelegramClient;

use super::classifier::{classify_contact, classify_lead, classify_task, EventKind, SuccessfulStatuses};
use super::formatter::MessageFormatter;
use super::status_store::StatusStore;
use crate::config::{Settings, TelegramSettings};
use crate::models::{AmoWebhookPayload, StatusEntry};
use crate::utils::logging::*;

/// Resumo do processamento de um webhook (vai para o log, não para a resposta)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub statuses_cached: usize,
}

#[derive(Clone)]
pub struct WebhookDispatcher {
    telegram: TelegramClient,
    formatter: MessageFormatter,
    store: StatusStore,
    routes: TelegramSettings,
    successful: SuccessfulStatuses,
}

impl WebhookDispatcher {
    pub fn new(settings: &Settings, telegram: TelegramClient, store: StatusStore) -> Self {
        let formatter = MessageFormatter::new(store.clone(), settings.amocrm.display_utc_offset_hours);

        Self {
            telegram,
            formatter,
            store,
            routes: settings.telegram.clone(),
            successful: SuccessfulStatuses::new(&settings.amocrm.successful_status_ids),
        }
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Processa o payload inteiro de uma conta
    pub async fn dispatch(&self, scope_id: &str, payload: &AmoWebhookPayload) -> DispatchSummary {
        let chat_id = self.routes.chat_for_scope(scope_id).to_string();
        let mut summary = DispatchSummary::default();

        let messages = self.render_messages(scope_id, payload, &mut summary).await;

        for text in messages {
            match self.telegram.send_message(&chat_id, &text).await {
                Ok(sent) => {
                    log_telegram_sent(&chat_id, sent.message_id);
                    summary.sent += 1;
                }
                Err(e) => {
                    log_telegram_error(&chat_id, &e.to_string());
                    summary.failed += 1;
                }
            }
        }

        summary.statuses_cached = self.warm_status_cache(scope_id, payload).await;

        summary
    }

    /// Classifica e formata leads, tarefas e contatos, na ordem de envio
    pub async fn render_messages(
        &self,
        scope_id: &str,
        payload: &AmoWebhookPayload,
        summary: &mut DispatchSummary,
    ) -> Vec<String> {
        let mut messages = Vec::new();

        for lead in &payload.leads {
            let kind = classify_lead(lead, &self.successful);
            tracing::debug!("Lead {:?} (conta {}) classificado como '{}'", lead.id, scope_id, kind.as_str());

            match kind {
                EventKind::Skipped => summary.skipped += 1,
                kind => messages.push(self.formatter.format_lead(lead, kind, scope_id).await),
            }
        }

        for task in &payload.tasks {
            match classify_task(task) {
                EventKind::Skipped => summary.skipped += 1,
                kind => messages.push(self.formatter.format_task(task, kind)),
            }
        }

        for contact in &payload.contacts {
            match classify_contact(contact) {
                EventKind::Skipped => summary.skipped += 1,
                kind => messages.push(self.formatter.format_contact(contact, kind)),
            }
        }

        messages
    }

    /// Grava no cache os status de `lead_statuses` e de `pipelines[].statuses`
    pub async fn warm_status_cache(&self, scope_id: &str, payload: &AmoWebhookPayload) -> usize {
        let nested = payload.pipelines.iter().flat_map(|pipeline| pipeline.statuses.iter());
        let mut cached = 0;

        for entry in payload.lead_statuses.iter().chain(nested) {
            if self.cache_status(scope_id, entry).await {
                cached += 1;
            }
        }

        cached
    }

    async fn cache_status(&self, scope_id: &str, entry: &StatusEntry) -> bool {
        match (&entry.id, &entry.name) {
            (Some(id), Some(name)) => {
                self.store.update(scope_id, id, name).await;
                true
            }
            _ => false,
        }
    }
}
