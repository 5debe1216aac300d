//! Фиксированные пути Discord и модов (Windows-соглашения).
//!
//! Все функции с суффиксом `_in` принимают корень явно и используются в
//! тестах; обёртки без суффикса читают окружение.

use crate::error::Result;
use crate::types::ClientMod;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Каталог данных самого менеджера (настройки, логи)
pub static BASE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Варианты установки Discord, в порядке проверки
pub const DISCORD_VARIANTS: [&str; 3] = ["Discord", "DiscordPTB", "DiscordCanary"];

pub fn init_paths(base: PathBuf) -> Result<()> {
    BASE_DIR.set(base.clone()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::AlreadyExists, "BASE_DIR already set")
    })?;

    fs::create_dir_all(base.join("logs"))?;

    Ok(())
}

pub fn get_base_dir() -> &'static Path {
    BASE_DIR.get().expect("BASE_DIR not initialized")
}

pub fn logs_dir() -> PathBuf {
    get_base_dir().join("logs")
}

pub fn settings_file() -> PathBuf {
    get_base_dir().join("settings.json")
}

/// %LOCALAPPDATA%: здесь живут установки Discord
pub fn local_app_data() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LOCALAPPDATA") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    directories::BaseDirs::new().map(|d| d.data_local_dir().to_path_buf())
}

/// %APPDATA%: здесь живут установки модов
pub fn roaming_app_data() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APPDATA") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    directories::BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "roaming data dir not found").into()
        })
}

/// Первый существующий вариант установки Discord под данным корнем
pub fn locate_discord_in(local_root: &Path) -> Option<PathBuf> {
    DISCORD_VARIANTS
        .iter()
        .map(|v| local_root.join(v))
        .find(|p| p.exists())
}

pub fn locate_discord() -> Option<PathBuf> {
    locate_discord_in(&local_app_data()?)
}

pub fn mod_install_dir_in(roaming_root: &Path, client_mod: ClientMod) -> PathBuf {
    roaming_root.join(client_mod.dir_name())
}

pub fn mod_install_dir(client_mod: ClientMod) -> Result<PathBuf> {
    Ok(mod_install_dir_in(&roaming_app_data()?, client_mod))
}

/// Временная папка клонирования при установке плагина
pub fn plugin_stage_dir(plugin_id: &str) -> PathBuf {
    std::env::temp_dir().join("MoonPlugs").join(plugin_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_locate_discord_in_order() {
        let root = tempdir().unwrap();
        assert_eq!(locate_discord_in(root.path()), None);

        fs::create_dir_all(root.path().join("DiscordCanary")).unwrap();
        assert_eq!(
            locate_discord_in(root.path()),
            Some(root.path().join("DiscordCanary"))
        );

        // Stable вариант имеет приоритет над Canary
        fs::create_dir_all(root.path().join("Discord")).unwrap();
        assert_eq!(
            locate_discord_in(root.path()),
            Some(root.path().join("Discord"))
        );
    }

    #[test]
    fn test_mod_install_dir_in() {
        let root = Path::new("/tmp/roaming");
        assert_eq!(
            mod_install_dir_in(root, ClientMod::Equicord),
            root.join("Equicord")
        );
    }

    #[test]
    fn test_plugin_stage_dir_is_namespaced() {
        let dir = plugin_stage_dir("foo");
        assert!(dir.ends_with(Path::new("MoonPlugs").join("foo")));
    }
}
