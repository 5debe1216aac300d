//! Пользовательские плагины на диске.
//!
//! Источником истины для «установлен» служит наличие подпапки в userplugins;
//! отдельного манифеста нет, набор пересчитывается при каждом запросе.

use crate::error::{ManagerError, Result};
use crate::paths;
use crate::types::ClientMod;
use std::fs;
use std::path::{Path, PathBuf};

/// Служебные файлы репозитория, не копируемые в папку плагина
pub const COPY_EXCLUDE: [&str; 6] = [
    ".git",
    "README.md",
    "README.pt-BR.md",
    "LICENSE",
    ".gitignore",
    ".vscode",
];

/// Папка userplugins данного мода. Требует dev-сборку (`src` существует),
/// сама папка создаётся при необходимости
pub fn user_plugins_dir_in(roaming_root: &Path, client_mod: ClientMod) -> Result<PathBuf> {
    let src = paths::mod_install_dir_in(roaming_root, client_mod).join("src");
    if !src.is_dir() {
        return Err(ManagerError::DevBuildNotFound);
    }
    let dir = src.join("userplugins");
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

pub fn user_plugins_dir(client_mod: ClientMod) -> Result<PathBuf> {
    user_plugins_dir_in(&paths::roaming_app_data()?, client_mod)
}

/// Имена подпапок userplugins; пустой список при любой ошибке чтения
pub fn installed_plugins_in(roaming_root: &Path, client_mod: ClientMod) -> Vec<String> {
    let Ok(dir) = user_plugins_dir_in(roaming_root, client_mod) else {
        return Vec::new();
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect()
}

/// Копирует содержимое клона в папку плагина, пропуская служебные файлы
pub fn copy_plugin_files(stage_dir: &Path, plugin_dir: &Path) -> Result<()> {
    fs::create_dir_all(plugin_dir)?;
    for entry in fs::read_dir(stage_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if COPY_EXCLUDE
            .iter()
            .any(|ex| name.to_string_lossy() == *ex)
        {
            continue;
        }
        let src = entry.path();
        let dest = plugin_dir.join(&name);
        if src.is_dir() {
            copy_dir_all(&src, &dest)?;
        } else {
            fs::copy(&src, &dest)?;
        }
    }
    Ok(())
}

fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let dest = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_all(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

#[tauri::command]
pub fn get_installed_plugins(client_mod: ClientMod) -> Vec<String> {
    let Ok(roaming_root) = paths::roaming_app_data() else {
        return Vec::new();
    };
    installed_plugins_in(&roaming_root, client_mod)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_user_plugins_dir_requires_dev_build() {
        let roaming = tempdir().unwrap();
        assert!(matches!(
            user_plugins_dir_in(roaming.path(), ClientMod::Vencord),
            Err(ManagerError::DevBuildNotFound)
        ));

        fs::create_dir_all(roaming.path().join("Vencord").join("src")).unwrap();
        let dir = user_plugins_dir_in(roaming.path(), ClientMod::Vencord).unwrap();
        assert!(dir.is_dir());
        assert!(dir.ends_with(Path::new("src").join("userplugins")));
    }

    #[test]
    fn test_installed_plugins_lists_directories_only() {
        let roaming = tempdir().unwrap();
        let plugins = roaming
            .path()
            .join("Equicord")
            .join("src")
            .join("userplugins");
        fs::create_dir_all(plugins.join("foo")).unwrap();
        fs::create_dir_all(plugins.join("bar")).unwrap();
        fs::write(plugins.join("notes.txt"), "x").unwrap();

        let mut installed = installed_plugins_in(roaming.path(), ClientMod::Equicord);
        installed.sort();
        assert_eq!(installed, vec!["bar", "foo"]);
    }

    #[test]
    fn test_copy_plugin_files_strips_repo_metadata() {
        let stage = tempdir().unwrap();
        let dest = tempdir().unwrap();
        fs::create_dir_all(stage.path().join(".git")).unwrap();
        fs::write(stage.path().join(".git").join("HEAD"), "ref").unwrap();
        fs::write(stage.path().join("README.md"), "readme").unwrap();
        fs::write(stage.path().join("LICENSE"), "mit").unwrap();
        fs::write(stage.path().join("index.ts"), "code").unwrap();
        fs::create_dir_all(stage.path().join("components")).unwrap();
        fs::write(stage.path().join("components").join("ui.tsx"), "ui").unwrap();

        let plugin_dir = dest.path().join("foo");
        copy_plugin_files(stage.path(), &plugin_dir).unwrap();

        assert!(plugin_dir.join("index.ts").is_file());
        assert!(plugin_dir.join("components").join("ui.tsx").is_file());
        assert!(!plugin_dir.join(".git").exists());
        assert!(!plugin_dir.join("README.md").exists());
        assert!(!plugin_dir.join("LICENSE").exists());
    }
}
