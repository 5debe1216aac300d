//! Настройки менеджера: JSON-файл в каталоге данных приложения.
//!
//! Все паузы и таймауты операций вынесены сюда: их значения подобраны
//! эмпирически, и пользователь должен иметь возможность их подправить.

use crate::error::Result;
use crate::paths;
use crate::utils::atomic_write;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ManagerSettings {
    /// Пауза после taskkill: Discord отпускает файловые блокировки не сразу
    pub kill_settle_ms: u64,
    /// Сколько ждать внешний inject-терминал (его завершение не наблюдаемо)
    pub inject_wait_secs: u64,
    /// То же для uninject; обычно быстрее
    pub uninject_wait_secs: u64,
    /// Предел ожидания ответа на диалог подтверждения
    pub confirm_timeout_secs: u64,
    /// Переопределение URL каталога плагинов (None = встроенный)
    pub catalog_url: Option<String>,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            kill_settle_ms: 2000,
            inject_wait_secs: 20,
            uninject_wait_secs: 15,
            confirm_timeout_secs: 120,
            catalog_url: None,
        }
    }
}

impl ManagerSettings {
    pub fn kill_settle(&self) -> Duration {
        Duration::from_millis(self.kill_settle_ms)
    }

    pub fn inject_wait(&self) -> Duration {
        Duration::from_secs(self.inject_wait_secs)
    }

    pub fn uninject_wait(&self) -> Duration {
        Duration::from_secs(self.uninject_wait_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }
}

/// Чтение настроек; отсутствующий или битый файл даёт значения по умолчанию
pub fn load() -> ManagerSettings {
    let path = paths::settings_file();
    match std::fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Settings file is corrupt, using defaults: {}", e);
                ManagerSettings::default()
            }
        },
        Err(_) => ManagerSettings::default(),
    }
}

pub fn save(settings: &ManagerSettings) -> Result<()> {
    let raw = serde_json::to_vec_pretty(settings)?;
    atomic_write(paths::settings_file(), &raw)
}

#[tauri::command]
pub fn get_settings() -> ManagerSettings {
    load()
}

#[tauri::command]
pub fn save_settings(settings: ManagerSettings) -> Result<()> {
    save(&settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_workflow_delays() {
        let cfg = ManagerSettings::default();
        assert_eq!(cfg.kill_settle(), Duration::from_millis(2000));
        assert_eq!(cfg.inject_wait(), Duration::from_secs(20));
        assert_eq!(cfg.uninject_wait(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let cfg: ManagerSettings = serde_json::from_str(r#"{"inject_wait_secs": 5}"#).unwrap();
        assert_eq!(cfg.inject_wait_secs, 5);
        assert_eq!(cfg.confirm_timeout_secs, 120);
    }

    #[test]
    fn test_roundtrip() {
        let mut cfg = ManagerSettings::default();
        cfg.catalog_url = Some("https://example/plugins.json".into());
        let raw = serde_json::to_string(&cfg).unwrap();
        let parsed: ManagerSettings = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, cfg);
    }
}
