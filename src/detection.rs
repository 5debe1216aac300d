//! Определение состояния установки.
//!
//! Классификация best-effort и неатомарна: диск читается заново при каждом
//! вызове, ничего не кешируется. Параллельное изменение файловой системы
//! не отслеживается: инструмент однопользовательский.

use crate::paths;
use crate::types::{ClientMod, InstallationStatus};
use std::fs;
use std::path::Path;

/// Классификация установки по явным корням (LOCALAPPDATA / APPDATA)
pub fn detect_in(local_root: &Path, roaming_root: &Path) -> InstallationStatus {
    let Some(discord_dir) = paths::locate_discord_in(local_root) else {
        return InstallationStatus::not_found();
    };

    // Dev-сборка имеет приоритет над упакованной: первый найденный src выигрывает
    for client_mod in ClientMod::ALL {
        if paths::mod_install_dir_in(roaming_root, client_mod)
            .join("src")
            .is_dir()
        {
            return InstallationStatus {
                discord: true,
                client_mod: Some(client_mod),
                is_dev_build: true,
            };
        }
    }

    if let Some(client_mod) = detect_packaged_mod(&discord_dir) {
        return InstallationStatus {
            discord: true,
            client_mod: Some(client_mod),
            is_dev_build: false,
        };
    }

    InstallationStatus::bare(true)
}

/// Поиск сигнатуры мода в собранном index.js новейшей версии.
///
/// «Новейшей» версией считается лексикографически наибольшая папка app-*;
/// для имён версий Discord это лишь приблизительно семантический порядок.
fn detect_packaged_mod(discord_dir: &Path) -> Option<ClientMod> {
    let mut versions: Vec<String> = fs::read_dir(discord_dir)
        .ok()?
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.starts_with("app-"))
        .collect();
    versions.sort();
    let newest = versions.pop()?;

    let index_js = discord_dir
        .join(newest)
        .join("resources")
        .join("app")
        .join("index.js");
    let content = fs::read_to_string(index_js).ok()?.to_lowercase();

    // Equicord первым: его бандл содержит и токен vencord
    for client_mod in [ClientMod::Equicord, ClientMod::Vencord] {
        if content.contains(client_mod.signature()) {
            return Some(client_mod);
        }
    }
    None
}

#[tauri::command]
pub fn detect_installation() -> InstallationStatus {
    let Some(local_root) = paths::local_app_data() else {
        return InstallationStatus::not_found();
    };
    let Ok(roaming_root) = paths::roaming_app_data() else {
        return InstallationStatus::bare(paths::locate_discord_in(&local_root).is_some());
    };
    detect_in(&local_root, &roaming_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn roots() -> (TempDir, TempDir) {
        (TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    fn write_bundle(local: &Path, variant: &str, version: &str, content: &str) {
        let app = local
            .join(variant)
            .join(version)
            .join("resources")
            .join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("index.js"), content).unwrap();
    }

    #[test]
    fn test_no_discord_means_not_found() {
        let (local, roaming) = roots();
        // Dev-сборка на диске не влияет на результат без Discord
        fs::create_dir_all(roaming.path().join("Vencord").join("src")).unwrap();

        let status = detect_in(local.path(), roaming.path());
        assert_eq!(status, InstallationStatus::not_found());
    }

    #[test]
    fn test_dev_build_wins_over_packaged() {
        let (local, roaming) = roots();
        write_bundle(local.path(), "Discord", "app-1.0.9008", "require('equicord')");
        fs::create_dir_all(roaming.path().join("Vencord").join("src")).unwrap();

        let status = detect_in(local.path(), roaming.path());
        assert_eq!(status.client_mod, Some(ClientMod::Vencord));
        assert!(status.is_dev_build);
    }

    #[test]
    fn test_packaged_equicord_detected_before_vencord_token() {
        let (local, roaming) = roots();
        // Бандл Equicord содержит оба токена
        write_bundle(
            local.path(),
            "Discord",
            "app-1.0.9008",
            "/* Equicord, a fork of Vencord */",
        );

        let status = detect_in(local.path(), roaming.path());
        assert_eq!(status.client_mod, Some(ClientMod::Equicord));
        assert!(!status.is_dev_build);
    }

    #[test]
    fn test_newest_version_folder_scanned() {
        let (local, roaming) = roots();
        write_bundle(local.path(), "Discord", "app-1.0.9001", "VENCORD");
        write_bundle(local.path(), "Discord", "app-1.0.9010", "nothing here");

        let status = detect_in(local.path(), roaming.path());
        assert_eq!(status.client_mod, None);
        assert!(status.discord);
    }

    #[test]
    fn test_bare_discord() {
        let (local, roaming) = roots();
        fs::create_dir_all(local.path().join("DiscordPTB")).unwrap();

        let status = detect_in(local.path(), roaming.path());
        assert_eq!(status, InstallationStatus::bare(true));
    }
}
