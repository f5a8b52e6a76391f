use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub amocrm: AmoCrmSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub default_chat_id: String,
    /// Chat de destino por conta do amoCRM (scope_id -> chat_id)
    #[serde(default)]
    pub chat_ids: HashMap<String, String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_dir: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AmoCrmSettings {
    /// Ids de status que marcam o lead como venda concluída
    #[serde(default = "default_successful_status_ids")]
    pub successful_status_ids: Vec<String>,
    /// Fuso usado para exibir prazos de tarefas (horas em relação a UTC)
    #[serde(default = "default_display_utc_offset_hours")]
    pub display_utc_offset_hours: i32,
}

fn default_api_base() -> String {
    telegram::DEFAULT_API_BASE.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_successful_status_ids() -> Vec<String> {
    vec!["142".to_string(), "143".to_string()]
}

fn default_display_utc_offset_hours() -> i32 {
    3
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for AmoCrmSettings {
    fn default() -> Self {
        Self {
            successful_status_ids: default_successful_status_ids(),
            display_utc_offset_hours: default_display_utc_offset_hours(),
        }
    }
}

impl TelegramSettings {
    /// Resolve o chat de destino da conta, caindo no chat padrão
    pub fn chat_for_scope(&self, scope_id: &str) -> &str {
        self.chat_ids
            .get(scope_id)
            .map(|s| s.as_str())
            .unwrap_or(&self.default_chat_id)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Valores padrão para rodar localmente sem arquivo de configuração
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("telegram.bot_token", "")?
            .set_default("telegram.default_chat_id", "")?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente específicas
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            builder = builder.set_override("telegram.bot_token", token)?;
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_DEFAULT_CHAT_ID") {
            builder = builder.set_override("telegram.default_chat_id", chat_id)?;
        }
        if let Ok(data_dir) = std::env::var("STATUS_DATA_DIR") {
            builder = builder.set_override("storage.data_dir", data_dir)?;
        }

        // AMOCRM_RELAY__TELEGRAM__CHAT_IDS__31415926=-100123...
        builder = builder.add_source(
            Environment::with_prefix("AMOCRM_RELAY")
                .prefix_separator("__")
                .separator("__"),
        );

        let s = builder.build()?;

        s.try_deserialize()
    }
}
