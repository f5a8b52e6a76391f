//! Classificação de eventos do amoCRM
//!
//! Funções puras: olham apenas para os marcadores do registro e decidem o tipo
//! do evento. A formatação fica em `formatter`.

use crate::models::{ContactEvent, LeadEvent, StatusId, TaskEvent};
use crate::utils::is_truthy;

/// Tipo do evento, decidido pelos marcadores do registro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    New,
    Updated,
    /// Lead em status de sucesso ou tarefa concluída
    Completed,
    /// Nenhum marcador reconhecido: não gera mensagem
    Skipped,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::New => "new",
            EventKind::Updated => "update",
            EventKind::Completed => "completed",
            EventKind::Skipped => "skipped",
        }
    }
}

/// Conjunto de ids de status considerados "venda concluída"
#[derive(Debug, Clone, Default)]
pub struct SuccessfulStatuses(Vec<StatusId>);

impl SuccessfulStatuses {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(ids.into_iter().map(|id| StatusId::from(id.as_ref())).collect())
    }

    pub fn contains(&self, status_id: &StatusId) -> bool {
        self.0.contains(status_id)
    }
}

/// A ordem importa: `add` vence status, status vence `update`
pub fn classify_lead(lead: &LeadEvent, successful: &SuccessfulStatuses) -> EventKind {
    if lead.add {
        EventKind::New
    } else if let Some(status_id) = &lead.status_id {
        if successful.contains(status_id) {
            EventKind::Completed
        } else {
            EventKind::Updated
        }
    } else if lead.update {
        EventKind::Updated
    } else {
        EventKind::Skipped
    }
}

pub fn classify_task(task: &TaskEvent) -> EventKind {
    if task.add {
        EventKind::New
    } else if task.is_completed.as_ref().map_or(false, is_truthy) {
        EventKind::Completed
    } else if task.update {
        EventKind::Updated
    } else {
        EventKind::Skipped
    }
}

pub fn classify_contact(contact: &ContactEvent) -> EventKind {
    if contact.add {
        EventKind::New
    } else if contact.update {
        EventKind::Updated
    } else {
        EventKind::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead(value: serde_json::Value) -> LeadEvent {
        serde_json::from_value(value).unwrap()
    }

    fn task(value: serde_json::Value) -> TaskEvent {
        serde_json::from_value(value).unwrap()
    }

    fn successful() -> SuccessfulStatuses {
        SuccessfulStatuses::new(["142", "143"])
    }

    #[test]
    fn test_lead_add_wins_over_status() {
        let kind = classify_lead(&lead(json!({"add": true, "status_id": 142})), &successful());
        assert_eq!(kind, EventKind::New);
    }

    #[test]
    fn test_lead_successful_status() {
        assert_eq!(classify_lead(&lead(json!({"status_id": 142})), &successful()), EventKind::Completed);
        assert_eq!(classify_lead(&lead(json!({"status_id": "143"})), &successful()), EventKind::Completed);
    }

    #[test]
    fn test_lead_other_status_is_update() {
        let kind = classify_lead(&lead(json!({"status_id": 20001})), &successful());
        assert_eq!(kind, EventKind::Updated);
    }

    #[test]
    fn test_lead_update_marker_and_nothing() {
        assert_eq!(classify_lead(&lead(json!({"update": {}})), &successful()), EventKind::Updated);
        assert_eq!(classify_lead(&lead(json!({"name": "x"})), &successful()), EventKind::Skipped);
        assert_eq!(classify_lead(&lead(json!({"status_id": 0})), &successful()), EventKind::Skipped);
    }

    #[test]
    fn test_task_decision_order() {
        assert_eq!(classify_task(&task(json!({"add": true, "is_completed": true}))), EventKind::New);
        assert_eq!(classify_task(&task(json!({"is_completed": true, "update": true}))), EventKind::Completed);
        assert_eq!(classify_task(&task(json!({"is_completed": "1"}))), EventKind::Completed);
        assert_eq!(classify_task(&task(json!({"is_completed": false, "update": true}))), EventKind::Updated);
        assert_eq!(classify_task(&task(json!({"is_completed": 0}))), EventKind::Skipped);
    }

    #[test]
    fn test_contact_decision() {
        let new: ContactEvent = serde_json::from_value(json!({"add": true, "update": true})).unwrap();
        let updated: ContactEvent = serde_json::from_value(json!({"update": true})).unwrap();
        let other: ContactEvent = serde_json::from_value(json!({"name": "Иван"})).unwrap();

        assert_eq!(classify_contact(&new), EventKind::New);
        assert_eq!(classify_contact(&updated), EventKind::Updated);
        assert_eq!(classify_contact(&other), EventKind::Skipped);
    }
}
