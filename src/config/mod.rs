pub mod settings;

pub use settings::{AmoCrmSettings, ServerSettings, Settings, StorageSettings, TelegramSettings};
