use serde::{Deserialize, Serialize};

/// Поддерживаемые клиентские моды
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMod {
    Vencord,
    Equicord,
}

impl ClientMod {
    /// Порядок проверки dev-сборок: первый найденный `src` выигрывает
    pub const ALL: [ClientMod; 2] = [ClientMod::Vencord, ClientMod::Equicord];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Vencord => "Vencord",
            Self::Equicord => "Equicord",
        }
    }

    /// Имя папки установки под roaming-каталогом пользователя
    pub fn dir_name(&self) -> &'static str {
        self.display_name()
    }

    pub fn repo_url(&self) -> &'static str {
        match self {
            Self::Vencord => "https://github.com/Vendicated/Vencord.git",
            Self::Equicord => "https://github.com/Equicord/Equicord.git",
        }
    }

    /// Токен, по которому мод опознаётся в собранном index.js (нижний регистр)
    pub fn signature(&self) -> &'static str {
        match self {
            Self::Vencord => "vencord",
            Self::Equicord => "equicord",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vencord" => Some(Self::Vencord),
            "equicord" => Some(Self::Equicord),
            _ => None,
        }
    }
}

/// Результат определения установки. Всегда вычисляется заново с диска
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationStatus {
    /// Найдена ли папка Discord (любой из вариантов)
    pub discord: bool,
    #[serde(rename = "mod")]
    pub client_mod: Option<ClientMod>,
    pub is_dev_build: bool,
}

impl InstallationStatus {
    pub fn not_found() -> Self {
        Self {
            discord: false,
            client_mod: None,
            is_dev_build: false,
        }
    }

    pub fn bare(discord: bool) -> Self {
        Self {
            discord,
            client_mod: None,
            is_dev_build: false,
        }
    }
}

/// Наличие внешних инструментов. Не кешируется
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub git: bool,
    pub node: bool,
    pub npm: bool,
}

/// Описание плагина из удалённого каталога. Неизменяемое значение
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Уникальный id, используется как имя папки плагина
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    /// Клонируемый git-remote
    pub repository: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Документ каталога плагинов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsData {
    pub name: String,
    pub author: String,
    pub plugins: Vec<PluginDescriptor>,
}

/// Исход inject/uninject: внешний терминал не даёт сигнала завершения,
/// поэтому успех никогда не подтверждается
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectOutcome {
    /// Терминал запущен, выждан настроенный интервал, результат не проверен
    Unverified,
    /// Шаг пропущен (нечего uninject-ить)
    Skipped,
}

/// Какое подтверждение запрашивается у пользователя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmKind {
    Inject,
    Uninject,
}

impl ConfirmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inject => "inject",
            Self::Uninject => "uninject",
        }
    }
}

/// Итог ручной очистки одной версионной папки Discord
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupEntry {
    /// Вариант Discord (Discord, DiscordPTB, DiscordCanary)
    pub host_dir: String,
    /// Имя версионной папки (app-*)
    pub version: String,
    pub removed_app_dir: bool,
    /// Имя бэкапа, восстановленного в app.asar (если был)
    pub restored_archive: Option<String>,
    pub error: Option<String>,
}

/// Отчёт ручной очистки: ошибки по одной установке не прерывают остальные
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    pub entries: Vec<CleanupEntry>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_mod_table() {
        assert_eq!(ClientMod::Vencord.dir_name(), "Vencord");
        assert!(ClientMod::Equicord.repo_url().contains("Equicord/Equicord"));
        assert_eq!(ClientMod::parse("EQUICORD"), Some(ClientMod::Equicord));
        assert_eq!(ClientMod::parse("bd"), None);
    }

    #[test]
    fn test_plugin_descriptor_optional_fields() {
        let json = r#"{
            "id": "foo",
            "name": "Foo",
            "description": "does foo",
            "version": "1.0.0",
            "author": "bar",
            "repository": "https://example/foo.git"
        }"#;
        let plugin: PluginDescriptor = serde_json::from_str(json).unwrap();
        assert!(plugin.files.is_empty());
        assert!(plugin.tags.is_none());
    }

    #[test]
    fn test_installation_status_serializes_mod_key() {
        let status = InstallationStatus {
            discord: true,
            client_mod: Some(ClientMod::Vencord),
            is_dev_build: true,
        };
        let value = serde_json::to_value(status).unwrap();
        assert_eq!(value["mod"], "vencord");
        assert_eq!(value["is_dev_build"], true);
    }
}
