use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::utils::normalization::normalize_status_id;

/// Payload de webhook do amoCRM
///
/// Seções desconhecidas são ignoradas; seções ausentes viram listas vazias.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AmoWebhookPayload {
    #[serde(default)]
    pub leads: Vec<LeadEvent>,
    #[serde(default)]
    pub tasks: Vec<TaskEvent>,
    #[serde(default)]
    pub contacts: Vec<ContactEvent>,
    #[serde(default)]
    pub lead_statuses: Vec<StatusEntry>,
    #[serde(default)]
    pub pipelines: Vec<PipelineEntry>,
}

impl AmoWebhookPayload {
    /// Nomes das seções não vazias, na ordem de processamento
    pub fn sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if !self.leads.is_empty() {
            sections.push("leads");
        }
        if !self.tasks.is_empty() {
            sections.push("tasks");
        }
        if !self.contacts.is_empty() {
            sections.push("contacts");
        }
        if !self.lead_statuses.is_empty() {
            sections.push("lead_statuses");
        }
        if !self.pipelines.is_empty() {
            sections.push("pipelines");
        }
        sections
    }
}

/// Id de status na forma canônica (string), independente de ter vindo como número
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusId(String);

impl StatusId {
    /// Constrói a partir de um valor JSON; `None` para ids "falsos"
    pub fn from_value(value: &Value) -> Option<Self> {
        normalize_status_id(value).map(StatusId)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusId {
    fn from(value: &str) -> Self {
        StatusId::from_value(&Value::String(value.to_string()))
            .unwrap_or_else(|| StatusId(value.to_string()))
    }
}

impl From<i64> for StatusId {
    fn from(value: i64) -> Self {
        StatusId(value.to_string())
    }
}

impl Serialize for StatusId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Marcadores `add`/`update` contam pela presença da chave, qualquer que seja o valor
fn deserialize_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|_| true)
}

fn deserialize_status_id<'de, D>(deserializer: D) -> Result<Option<StatusId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(StatusId::from_value(&value))
}

fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = crate::utils::value_to_text(&value);
    Ok((!text.trim().is_empty()).then_some(text))
}

/// Lead (сделка) do amoCRM
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LeadEvent {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub add: bool,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub update: bool,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub responsible_user_name: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_status_id")]
    pub status_id: Option<StatusId>,
    #[serde(default, deserialize_with = "deserialize_non_empty_string")]
    pub status_name: Option<String>,
}

/// Tarefa (задача) do amoCRM
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaskEvent {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub add: bool,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub update: bool,
    #[serde(default)]
    pub is_completed: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub complete_till: Option<Value>,
    #[serde(default)]
    pub responsible_user_name: Option<Value>,
}

/// Contato do amoCRM
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContactEvent {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub add: bool,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub update: bool,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CustomField {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub values: Vec<CustomFieldValue>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CustomFieldValue {
    #[serde(default)]
    pub value: Option<Value>,
}

impl ContactEvent {
    /// Primeiro valor do campo personalizado com o código indicado (PHONE, EMAIL)
    pub fn first_field_value(&self, code: &str) -> Option<&Value> {
        self.custom_fields
            .iter()
            .filter(|field| field.code.as_deref() == Some(code))
            .find_map(|field| field.values.first())
            .and_then(|v| v.value.as_ref())
    }
}

/// Definição de status (seção `lead_statuses` ou `pipelines[].statuses`)
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StatusEntry {
    #[serde(default, deserialize_with = "deserialize_status_id")]
    pub id: Option<StatusId>,
    #[serde(default, deserialize_with = "deserialize_non_empty_string")]
    pub name: Option<String>,
}

/// Funil (воронка) com seus status
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PipelineEntry {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub statuses: Vec<StatusEntry>,
}
