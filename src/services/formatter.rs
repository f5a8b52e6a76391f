//! Montagem das mensagens enviadas ao Telegram (`parse_mode=HTML`)
//!
//! Os textos das mensagens ficam em russo, como o time comercial usa no amoCRM.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::Value;

use super::classifier::EventKind;
use super::status_store::StatusStore;
use crate::models::{ContactEvent, LeadEvent, TaskEvent};
use crate::utils::{escape_html, truncate_with_suffix, value_to_text};

/// Limite por campo, bem abaixo dos 4096 caracteres de uma mensagem do Telegram
const MAX_FIELD_BYTES: usize = 1024;

/// Inteiros acima disso em `complete_till` são timestamps Unix
const UNIX_TIMESTAMP_THRESHOLD: i64 = 1_000_000_000;

#[derive(Clone)]
pub struct MessageFormatter {
    store: StatusStore,
    display_offset: FixedOffset,
}

fn field(value: &Value) -> String {
    escape_html(&truncate_with_suffix(&value_to_text(value), MAX_FIELD_BYTES, "…"))
}

fn header(emoji: &str, title: &str) -> String {
    format!("{} <b>{}</b>\n", emoji, title)
}

impl MessageFormatter {
    pub fn new(store: StatusStore, display_utc_offset_hours: i32) -> Self {
        let display_offset = display_utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());

        Self {
            store,
            display_offset,
        }
    }

    /// Mensagem de lead. Se o lead traz `status_name`, o par id/nome vai para o cache
    /// antes de ser usado; senão o nome vem do cache (ou do fallback).
    pub async fn format_lead(&self, lead: &LeadEvent, kind: EventKind, scope_id: &str) -> String {
        let (emoji, title) = match kind {
            EventKind::New => ("📝", "Создана новая сделка"),
            EventKind::Updated => ("🔄", "Обновлена сделка"),
            EventKind::Completed => ("🎉", "Успешно реализованная сделка"),
            EventKind::Skipped => ("ℹ️", "Информация о сделке"),
        };

        let mut message = header(emoji, title);
        message.push_str(&format!(
            "Название: {}\n",
            lead.name.as_ref().map(field).unwrap_or_else(|| "Без названия".to_string())
        ));

        if let Some(price) = &lead.price {
            message.push_str(&format!("Бюджет: {} руб.\n", field(price)));
        }

        if let Some(responsible) = &lead.responsible_user_name {
            message.push_str(&format!("Ответственный: {}\n", field(responsible)));
        }

        if let Some(status_id) = &lead.status_id {
            let status_name = match &lead.status_name {
                Some(name) => {
                    self.store.update(scope_id, status_id, name).await;
                    name.clone()
                }
                None => self.store.get_name(scope_id, status_id).await,
            };
            message.push_str(&format!("Статус: {}\n", escape_html(&status_name)));
        }

        message.trim_end().to_string()
    }

    pub fn format_task(&self, task: &TaskEvent, kind: EventKind) -> String {
        let (emoji, title) = match kind {
            EventKind::New => ("⏰", "Создана новая задача"),
            EventKind::Completed => ("✅", "Задача выполнена"),
            _ => ("📋", "Информация о задаче"),
        };

        let mut message = header(emoji, title);
        message.push_str(&format!(
            "Текст: {}\n",
            task.text.as_ref().map(field).unwrap_or_else(|| "Без описания".to_string())
        ));

        if let Some(deadline) = &task.complete_till {
            message.push_str(&format!("Срок: {}\n", self.format_deadline(deadline)));
        }

        if let Some(responsible) = &task.responsible_user_name {
            message.push_str(&format!("Ответственный: {}\n", field(responsible)));
        }

        message.trim_end().to_string()
    }

    pub fn format_contact(&self, contact: &ContactEvent, kind: EventKind) -> String {
        let title = match kind {
            EventKind::New => "Создан новый контакт",
            _ => "Обновлен контакт",
        };

        let mut message = header("👤", title);
        message.push_str(&format!(
            "Имя: {}\n",
            contact.name.as_ref().map(field).unwrap_or_else(|| "Без имени".to_string())
        ));

        if let Some(phone) = contact.first_field_value("PHONE") {
            message.push_str(&format!("Телефон: {}\n", field(phone)));
        }

        if let Some(email) = contact.first_field_value("EMAIL") {
            message.push_str(&format!("Email: {}\n", field(email)));
        }

        message.trim_end().to_string()
    }

    /// `DD.MM.YYYY HH:MM` para timestamps Unix; qualquer outro valor sai como veio
    fn format_deadline(&self, deadline: &Value) -> String {
        deadline
            .as_i64()
            .filter(|secs| *secs > UNIX_TIMESTAMP_THRESHOLD)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| {
                dt.with_timezone(&self.display_offset)
                    .format("%d.%m.%Y %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| field(deadline))
    }
}
