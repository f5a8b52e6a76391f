//! Cache de status de leads por conta do amoCRM
//!
//! Cada conta (scope) tem seu próprio arquivo JSON em `data_dir`:
//!
//! ```text
//! data/lead_statuses_31415926.json
//! {
//!   "142": { "name": "Успешно реализовано", "first_seen": "...", "last_updated": "..." }
//! }
//! ```
//!
//! Regras:
//! - Falha de leitura (arquivo ausente, corrompido, sem permissão) vira mapa vazio
//! - Falha de escrita é apenas logada; quem chamou continua com o mapa em memória
//! - `first_seen` nunca muda depois de gravado; `last_updated` muda a cada escrita
//! - `update` é serializado por conta dentro do processo (mutex por scope).
//!   Entre processos diferentes no mesmo diretório vale o último que gravar.
//! - O nome do arquivo usa `encode_scope_id`, então contas distintas nunca
//!   compartilham arquivo nem mutex.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

use crate::models::StatusId;
use crate::utils::logging::*;
use crate::utils::normalization::encode_scope_id;
use crate::utils::{AppError, AppResult};

/// Mapa completo de uma conta: status_id -> registro
pub type StatusMap = BTreeMap<String, StatusRecord>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub first_seen: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Aceita RFC 3339 e também o formato ingênuo (sem fuso) dos arquivos antigos, lido como UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
        None => Ok(None),
    }
}

/// Texto exibido quando o nome do status ainda não é conhecido
pub fn fallback_status_name(status_id: &StatusId) -> String {
    format!("Статус {}", status_id)
}

#[derive(Clone)]
pub struct StatusStore {
    data_dir: PathBuf,
    /// Um mutex por scope (já codificado) para serializar load-modify-save.
    /// Só referências fracas: entradas sem `update` em andamento são podadas.
    scope_locks: Arc<Mutex<HashMap<String, Weak<Mutex<()>>>>>,
}

impl StatusStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();

        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            log_warning(&format!(
                "⚠️ Não foi possível criar o diretório de dados {}: {}",
                data_dir.display(),
                e
            ));
        }

        Self {
            data_dir,
            scope_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Caminho do arquivo de status de uma conta
    pub fn file_path(&self, scope_id: &str) -> PathBuf {
        self.data_dir
            .join(format!("lead_statuses_{}.json", encode_scope_id(scope_id)))
    }

    /// Carrega o mapa da conta; qualquer falha vira mapa vazio
    pub async fn load(&self, scope_id: &str) -> StatusMap {
        match self.try_load(scope_id).await {
            Ok(statuses) => statuses,
            Err(e) => {
                log_statuses_load_error(scope_id, &e.to_string());
                StatusMap::new()
            }
        }
    }

    /// Sobrescreve o mapa da conta; falhas são apenas logadas
    pub async fn save(&self, scope_id: &str, statuses: &StatusMap) {
        match self.try_save(scope_id, statuses).await {
            Ok(()) => log_statuses_saved(scope_id, statuses.len()),
            Err(e) => log_statuses_save_error(scope_id, &e.to_string()),
        }
    }

    /// Insere ou atualiza um status e devolve o mapa resultante
    pub async fn update(&self, scope_id: &str, status_id: &StatusId, status_name: &str) -> StatusMap {
        let lock = self.scope_lock(scope_id).await;
        let _guard = lock.lock().await;

        let mut statuses = self.load(scope_id).await;
        let now = Utc::now();

        match statuses.get_mut(status_id.as_str()) {
            Some(record) => {
                record.name = status_name.to_string();
                record.last_updated = Some(now);
            }
            None => {
                statuses.insert(
                    status_id.as_str().to_string(),
                    StatusRecord {
                        name: status_name.to_string(),
                        first_seen: now,
                        last_updated: None,
                    },
                );
            }
        }

        self.save(scope_id, &statuses).await;
        statuses
    }

    /// Nome conhecido do status ou `"Статус {id}"`
    pub async fn get_name(&self, scope_id: &str, status_id: &StatusId) -> String {
        self.load(scope_id)
            .await
            .get(status_id.as_str())
            .map(|record| record.name.clone())
            .unwrap_or_else(|| fallback_status_name(status_id))
    }

    async fn scope_lock(&self, scope_id: &str) -> Arc<Mutex<()>> {
        let key = encode_scope_id(scope_id);
        let mut locks = self.scope_locks.lock().await;

        if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
            return lock;
        }

        locks.retain(|_, lock| lock.strong_count() > 0);

        let lock = Arc::new(Mutex::new(()));
        locks.insert(key, Arc::downgrade(&lock));
        lock
    }

    async fn try_load(&self, scope_id: &str) -> AppResult<StatusMap> {
        let path = self.file_path(scope_id);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StatusMap::new()),
            Err(e) => {
                return Err(AppError::StorageError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Grava em arquivo temporário no mesmo diretório e renomeia por cima do destino
    async fn try_save(&self, scope_id: &str, statuses: &StatusMap) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            AppError::StorageError(format!(
                "Failed to create {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;

        let path = self.file_path(scope_id);
        let tmp_path = self.data_dir.join(format!(
            ".lead_statuses_{}.{}.tmp",
            encode_scope_id(scope_id),
            uuid::Uuid::new_v4()
        ));

        let body = serde_json::to_vec_pretty(statuses)?;

        if let Err(e) = tokio::fs::write(&tmp_path, &body).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::StorageError(format!(
                "Failed to write {}: {}",
                tmp_path.display(),
                e
            )));
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::StorageError(format!(
                "Failed to replace {}: {}",
                path.display(),
                e
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn id(raw: &str) -> StatusId {
        StatusId::from(raw)
    }

    #[tokio::test]
    async fn test_unknown_status_returns_fallback_idempotently() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        let first = store.get_name("42", &id("999")).await;
        let second = store.get_name("42", &id("999")).await;

        assert_eq!(first, "Статус 999");
        assert_eq!(first, second);
        assert!(!store.file_path("42").exists());
    }

    #[tokio::test]
    async fn test_update_keeps_first_seen_and_sets_last_updated() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        let after_first = store.update("42", &id("142"), "Foo").await;
        let created = after_first["142"].clone();
        assert_eq!(created.name, "Foo");
        assert!(created.last_updated.is_none());

        let after_second = store.update("42", &id("142"), "Bar").await;
        let updated = &after_second["142"];
        assert_eq!(updated.name, "Bar");
        assert_eq!(updated.first_seen, created.first_seen);
        assert!(updated.last_updated.is_some());

        assert_eq!(store.get_name("42", &id("142")).await, "Bar");
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        store.update("A", &id("7"), "X").await;

        assert_eq!(store.get_name("A", &id("7")).await, "X");
        assert_eq!(store.get_name("B", &id("7")).await, "Статус 7");
    }

    #[tokio::test]
    async fn test_scopes_with_similar_ids_do_not_share_a_file() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        store.update("a/b", &id("7"), "X").await;

        assert_eq!(store.get_name("a/b", &id("7")).await, "X");
        for other in ["a_b", "a.b", "a b", "a_2Fb"] {
            assert_eq!(store.get_name(other, &id("7")).await, "Статус 7");
            assert_ne!(store.file_path(other), store.file_path("a/b"));
        }
    }

    #[tokio::test]
    async fn test_idle_scope_locks_are_pruned() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        for i in 0..50 {
            store.update(&format!("scope-{}", i), &id("1"), "X").await;
        }

        assert!(store.scope_locks.lock().await.len() <= 1);
    }

    #[tokio::test]
    async fn test_numeric_and_string_ids_share_a_record() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        let numeric = StatusId::from_value(&serde_json::json!(143)).unwrap();
        store.update("42", &numeric, "Закрыто и не реализовано").await;

        assert_eq!(store.get_name("42", &id("143")).await, "Закрыто и не реализовано");
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        let mut statuses = StatusMap::new();
        statuses.insert(
            "142".to_string(),
            StatusRecord {
                name: "Успешно реализовано".to_string(),
                first_seen: Utc::now(),
                last_updated: Some(Utc::now()),
            },
        );
        statuses.insert(
            "20001".to_string(),
            StatusRecord {
                name: "Первичный контакт".to_string(),
                first_seen: Utc::now(),
                last_updated: None,
            },
        );

        store.save("42", &statuses).await;

        assert_eq!(store.load("42").await, statuses);
    }

    #[tokio::test]
    async fn test_file_layout_is_flat_json_object() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        store.update("42", &id("142"), "Won").await;

        let raw = std::fs::read_to_string(dir.path().join("lead_statuses_42.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["142"]["name"], "Won");
        assert!(json["142"]["first_seen"].is_string());
        assert!(json["142"].get("last_updated").is_none());
    }

    #[tokio::test]
    async fn test_corrupted_file_degrades_to_empty_and_is_replaced() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());
        std::fs::write(store.file_path("42"), "{ not json").unwrap();

        assert!(store.load("42").await.is_empty());
        assert_eq!(store.get_name("42", &id("142")).await, "Статус 142");

        let statuses = store.update("42", &id("142"), "Won").await;
        assert_eq!(statuses.len(), 1);
        assert_eq!(store.get_name("42", &id("142")).await, "Won");
    }

    #[tokio::test]
    async fn test_legacy_naive_timestamps_are_accepted() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());
        std::fs::write(
            store.file_path("42"),
            r#"{"142": {"name": "Won", "first_seen": "2024-05-01T10:00:00.123456"}}"#,
        )
        .unwrap();

        let statuses = store.load("42").await;
        assert_eq!(statuses["142"].name, "Won");
        assert_eq!(
            statuses["142"].first_seen.to_rfc3339(),
            "2024-05-01T10:00:00.123456+00:00"
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        // data_dir aponta para um arquivo: nenhuma escrita pode funcionar
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        let store = StatusStore::new(&blocker);

        let statuses = store.update("42", &id("142"), "Won").await;

        assert_eq!(statuses["142"].name, "Won");
        assert!(store.load("42").await.is_empty());
    }

    #[tokio::test]
    async fn test_scope_id_cannot_escape_data_dir() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = StatusStore::new(&data_dir);

        store.update("../outside", &id("1"), "X").await;

        assert!(store.file_path("../outside").starts_with(&data_dir));
        assert!(!dir.path().join("outside").exists());
        assert_eq!(store.get_name("../outside", &id("1")).await, "X");
    }

    #[tokio::test]
    async fn test_concurrent_updates_for_same_scope_are_not_lost() {
        let dir = tempdir().unwrap();
        let store = StatusStore::new(dir.path());

        let handles: Vec<_> = (1..=20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.update("42", &StatusId::from(i as i64), &format!("Этап {}", i)).await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let statuses = store.load("42").await;
        assert_eq!(statuses.len(), 20);
        assert_eq!(statuses["13"].name, "Этап 13");
    }
}
