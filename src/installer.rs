//! Lifecycle-операции: установка/обновление/удаление мода и плагинов.
//!
//! Каждая операция выполняется как строго последовательный сценарий поверх
//! внешних инструментов (git, pnpm, taskkill). Первый сбой прерывает оставшиеся шаги;
//! шаги не ретраятся. Частичное состояние после позднего сбоя не
//! откатывается, кроме временной папки клонирования плагина.

use crate::discord;
use crate::error::{ManagerError, Result};
use crate::inject;
use crate::operation;
use crate::paths;
use crate::plugins;
use crate::repo;
use crate::settings::{self, ManagerSettings};
use crate::tools;
use crate::types::{CleanupReport, ClientMod, InjectOutcome, PluginDescriptor};
use crate::utils::run_step;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

async fn pnpm_install(dir: &Path, token: &CancellationToken) -> Result<()> {
    run_step(
        "pnpm install",
        "pnpm",
        &["install", "--frozen-lockfile"],
        Some(dir),
        token,
    )
    .await?;
    Ok(())
}

async fn pnpm_build(dir: &Path, token: &CancellationToken) -> Result<()> {
    run_step("pnpm build", "pnpm", &["build"], Some(dir), token).await?;
    Ok(())
}

/// Удаление папки установки. Сначала rmdir (переживает длинные пути и
/// read-only атрибуты лучше), при неудаче нативное рекурсивное удаление
#[cfg(windows)]
async fn remove_dir_robust(path: &Path) -> Result<()> {
    let arg = format!("rmdir /s /q \"{}\"", path.display());
    let status = tokio::process::Command::new("cmd")
        .args(["/C", &arg])
        .output()
        .await;
    match status {
        Ok(out) if out.status.success() && !path.exists() => Ok(()),
        _ => Ok(fs::remove_dir_all(path)?),
    }
}

#[cfg(not(windows))]
async fn remove_dir_robust(path: &Path) -> Result<()> {
    Ok(fs::remove_dir_all(path)?)
}

async fn close_discord(cfg: &ManagerSettings) {
    log::info!("Closing Discord...");
    discord::kill_all(cfg.kill_settle()).await;
}

/// Установка dev-сборки: клон исходников, зависимости, сборка, inject
#[tauri::command]
pub async fn install_dev_build(
    app: tauri::AppHandle,
    client_mod: ClientMod,
) -> Result<InjectOutcome> {
    let guard = operation::begin("install-devbuild")?;
    let token = guard.token();
    let cfg = settings::load();

    log::info!("Starting install of {}...", client_mod.display_name());

    // Гейт инструментов: до любых изменений на диске
    let deps = tools::check_all().await;
    tools::verify_dev_tools(&deps)?;

    let install_path = paths::mod_install_dir(client_mod)?;
    close_discord(&cfg).await;

    if repo::is_repo(&install_path) {
        log::info!("Updating existing installation...");
        repo::reset_hard(&install_path, &token).await?;
        repo::pull(&install_path, &token).await?;
    } else {
        if install_path.exists() {
            log::info!("Removing old folder...");
            remove_dir_robust(&install_path).await?;
        }
        log::info!("Cloning {}...", client_mod.repo_url());
        repo::clone(client_mod.repo_url(), &install_path, &token).await?;
    }

    tools::ensure_pnpm(&token).await?;
    log::info!("Installing dependencies (pnpm install)...");
    pnpm_install(&install_path, &token).await?;

    log::info!("Building (pnpm build)...");
    pnpm_build(&install_path, &token).await?;

    log::info!("Injecting into Discord...");
    log::info!(">>> A terminal window will open - select your Discord and press Enter <<<");
    let outcome = inject::inject(&app, &install_path, &cfg, &token).await?;

    log::info!("Installation complete!");
    Ok(outcome)
}

/// Установка плагина: клон во временную папку, фильтрующее копирование,
/// пересборка мода, reinject
#[tauri::command]
pub async fn install_plugin(
    app: tauri::AppHandle,
    client_mod: ClientMod,
    plugin: PluginDescriptor,
) -> Result<InjectOutcome> {
    let guard = operation::begin("install-plugin")?;
    let token = guard.token();
    let cfg = settings::load();

    let result = install_plugin_steps(&app, client_mod, &plugin, &cfg, &token).await;
    if let Err(e) = &result {
        log::error!("Error: {}", e);
        // Временный клон не должен переживать неудачную установку;
        // частично заполненная папка плагина при позднем сбое остаётся
        let stage_dir = paths::plugin_stage_dir(&plugin.id);
        if stage_dir.exists() {
            let _ = fs::remove_dir_all(&stage_dir);
        }
    }
    result
}

async fn install_plugin_steps(
    app: &tauri::AppHandle,
    client_mod: ClientMod,
    plugin: &PluginDescriptor,
    cfg: &ManagerSettings,
    token: &CancellationToken,
) -> Result<InjectOutcome> {
    let plugins_dir = plugins::user_plugins_dir(client_mod)?;
    let plugin_dir = plugins_dir.join(&plugin.id);
    let stage_dir = paths::plugin_stage_dir(&plugin.id);
    let install_path = paths::mod_install_dir(client_mod)?;

    log::info!("Installing plugin: {}...", plugin.name);
    close_discord(cfg).await;

    if stage_dir.exists() {
        fs::remove_dir_all(&stage_dir)?;
    }
    if plugin_dir.exists() {
        fs::remove_dir_all(&plugin_dir)?;
    }

    log::info!("Cloning {}...", plugin.repository);
    repo::clone(&plugin.repository, &stage_dir, token).await?;

    log::info!("Copying plugin files...");
    plugins::copy_plugin_files(&stage_dir, &plugin_dir)?;
    fs::remove_dir_all(&stage_dir)?;

    log::info!("Rebuilding mod...");
    pnpm_build(&install_path, token).await?;

    log::info!("Reinjecting...");
    log::info!(">>> A terminal window will open - select your Discord and press Enter <<<");
    let outcome = inject::inject(app, &install_path, cfg, token).await?;

    log::info!("Plugin {} installed successfully!", plugin.name);
    Ok(outcome)
}

/// Удаление плагина: убрать папку, пересобрать, reinject
#[tauri::command]
pub async fn uninstall_plugin(
    app: tauri::AppHandle,
    client_mod: ClientMod,
    plugin_id: String,
) -> Result<InjectOutcome> {
    let guard = operation::begin("uninstall-plugin")?;
    let token = guard.token();
    let cfg = settings::load();

    let plugins_dir = plugins::user_plugins_dir(client_mod)?;
    let plugin_dir = plugins_dir.join(&plugin_id);
    let install_path = paths::mod_install_dir(client_mod)?;

    log::info!("Uninstalling plugin: {}...", plugin_id);
    close_discord(&cfg).await;

    if plugin_dir.exists() {
        fs::remove_dir_all(&plugin_dir)?;
    }

    log::info!("Rebuilding mod...");
    pnpm_build(&install_path, &token).await?;

    log::info!("Reinjecting...");
    let outcome = inject::inject(&app, &install_path, &cfg, &token).await?;

    log::info!("Plugin {} removed", plugin_id);
    Ok(outcome)
}

/// Пересборка и reinject без изменения исходников
#[tauri::command]
pub async fn rebuild_mod(app: tauri::AppHandle, client_mod: ClientMod) -> Result<InjectOutcome> {
    let guard = operation::begin("rebuild-mod")?;
    let token = guard.token();
    let cfg = settings::load();

    let install_path = paths::mod_install_dir(client_mod)?;
    close_discord(&cfg).await;

    log::info!("Rebuilding mod...");
    pnpm_build(&install_path, &token).await?;

    log::info!("Reinjecting...");
    inject::inject(&app, &install_path, &cfg, &token).await
}

/// Обновление мода: hard-reset + pull, зависимости, сборка, reinject
#[tauri::command]
pub async fn update_mod(app: tauri::AppHandle, client_mod: ClientMod) -> Result<InjectOutcome> {
    let guard = operation::begin("update-mod")?;
    let token = guard.token();
    let cfg = settings::load();

    let install_path = paths::mod_install_dir(client_mod)?;

    log::info!("Updating {}...", client_mod.display_name());
    close_discord(&cfg).await;

    repo::reset_hard(&install_path, &token).await?;
    repo::pull(&install_path, &token).await?;

    log::info!("Installing dependencies (pnpm install)...");
    pnpm_install(&install_path, &token).await?;

    log::info!("Building (pnpm build)...");
    pnpm_build(&install_path, &token).await?;

    let outcome = inject::inject(&app, &install_path, &cfg, &token).await?;
    log::info!("Update complete!");
    Ok(outcome)
}

/// Полное удаление мода. Внешний uninject выполняется best-effort;
/// авторитетна ручная очистка, которая идёт в любом случае
#[tauri::command]
pub async fn uninstall_mod(app: tauri::AppHandle, client_mod: ClientMod) -> Result<CleanupReport> {
    let guard = operation::begin("uninstall-mod")?;
    let token = guard.token();
    let cfg = settings::load();

    let install_path = paths::mod_install_dir(client_mod)?;

    log::info!("Uninstalling {}...", client_mod.display_name());
    close_discord(&cfg).await;

    match inject::uninject(&app, &install_path, &cfg, &token).await {
        Ok(InjectOutcome::Skipped) => log::info!("Install folder missing, uninject skipped"),
        Ok(InjectOutcome::Unverified) => {}
        Err(e @ ManagerError::Cancelled) => return Err(e),
        Err(e) => log::warn!("External uninject failed, relying on manual cleanup: {}", e),
    }

    let report = inject::clean_injection();
    log::info!(
        "Manual cleanup: {} version folder(s) processed, {} failure(s)",
        report.entries.len(),
        report.failures()
    );

    if install_path.exists() {
        remove_dir_robust(&install_path).await?;
    }

    log::info!("{} uninstalled", client_mod.display_name());
    Ok(report)
}
