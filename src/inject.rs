//! Inject/uninject мода в стартовый бандл Discord.
//!
//! Сам inject выполняет `pnpm inject` в отдельном видимом терминале: этому
//! инструменту нужен интерактивный выбор установки Discord, который отсюда
//! не подать. Терминал запускается fire-and-forget, затем выжидается
//! настроенный интервал; фактический результат не проверяется и наружу
//! отдаётся как `InjectOutcome::Unverified`.

use crate::confirm;
use crate::error::Result;
use crate::paths;
use crate::settings::ManagerSettings;
use crate::types::{CleanupEntry, CleanupReport, ConfirmKind, InjectOutcome};
use crate::utils::sleep_cancellable;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Имена, под которыми инжектор сохраняет оригинальный app.asar
const BACKUP_ARCHIVES: [&str; 2] = ["_app.asar", "_app.asar.backup"];

pub async fn inject(
    app: &tauri::AppHandle,
    install_path: &Path,
    cfg: &ManagerSettings,
    token: &CancellationToken,
) -> Result<InjectOutcome> {
    confirm::request(app, ConfirmKind::Inject, cfg.confirm_timeout(), token).await?;
    spawn_terminal(install_path, "inject")?;
    log::info!(
        "Inject terminal spawned, waiting {}s (completion is not verified)...",
        cfg.inject_wait_secs
    );
    sleep_cancellable(cfg.inject_wait(), token).await?;
    Ok(InjectOutcome::Unverified)
}

/// Uninject пропускается, если папки установки уже нет
pub async fn uninject(
    app: &tauri::AppHandle,
    install_path: &Path,
    cfg: &ManagerSettings,
    token: &CancellationToken,
) -> Result<InjectOutcome> {
    if !install_path.exists() {
        return Ok(InjectOutcome::Skipped);
    }
    confirm::request(app, ConfirmKind::Uninject, cfg.confirm_timeout(), token).await?;
    spawn_terminal(install_path, "uninject")?;
    log::info!(
        "Uninject terminal spawned, waiting {}s (completion is not verified)...",
        cfg.uninject_wait_secs
    );
    sleep_cancellable(cfg.uninject_wait(), token).await?;
    Ok(InjectOutcome::Unverified)
}

#[cfg(windows)]
fn spawn_terminal(install_path: &Path, subcommand: &str) -> Result<()> {
    let script = format!(
        "start cmd /c \"cd /d \"{}\" && pnpm {} && echo. && echo Done! Closing in 3 seconds... && timeout /t 3\"",
        install_path.display(),
        subcommand
    );
    std::process::Command::new("cmd")
        .args(["/C", &script])
        .spawn()?;
    Ok(())
}

#[cfg(not(windows))]
fn spawn_terminal(install_path: &Path, subcommand: &str) -> Result<()> {
    std::process::Command::new("sh")
        .arg("-c")
        .arg(format!(
            "cd \"{}\" && pnpm {}",
            install_path.display(),
            subcommand
        ))
        .spawn()?;
    Ok(())
}

/// Ручная очистка следов инъекции по всем вариантам Discord.
///
/// Страховочная сетка на случай сбоя внешнего uninject: удаляет подложенную
/// папку resources/app и возвращает оригинальный app.asar из бэкапа. Сбой на
/// одной установке не прерывает очистку остальных; каждый исход попадает
/// в отчёт.
pub fn clean_injection_in(local_root: &Path) -> CleanupReport {
    let mut report = CleanupReport::default();
    for variant in paths::DISCORD_VARIANTS {
        let discord_dir = local_root.join(variant);
        if !discord_dir.exists() {
            continue;
        }
        let Ok(entries) = fs::read_dir(&discord_dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(version) = entry.file_name().into_string() else {
                continue;
            };
            if !version.starts_with("app-") {
                continue;
            }
            report
                .entries
                .push(clean_version_dir(variant, &version, &entry.path()));
        }
    }
    report
}

fn clean_version_dir(variant: &str, version: &str, version_dir: &Path) -> CleanupEntry {
    let mut entry = CleanupEntry {
        host_dir: variant.to_string(),
        version: version.to_string(),
        removed_app_dir: false,
        restored_archive: None,
        error: None,
    };
    let resources = version_dir.join("resources");

    let injected_app = resources.join("app");
    if injected_app.exists() {
        match fs::remove_dir_all(&injected_app) {
            Ok(()) => entry.removed_app_dir = true,
            Err(e) => {
                entry.error = Some(format!("remove app dir: {}", e));
                return entry;
            }
        }
    }

    let app_asar = resources.join("app.asar");
    for backup_name in BACKUP_ARCHIVES {
        let backup = resources.join(backup_name);
        if !backup.exists() {
            continue;
        }
        if app_asar.exists() {
            if let Err(e) = fs::remove_file(&app_asar) {
                entry.error = Some(format!("replace app.asar: {}", e));
                return entry;
            }
        }
        match fs::rename(&backup, &app_asar) {
            Ok(()) => entry.restored_archive = Some(backup_name.to_string()),
            Err(e) => entry.error = Some(format!("restore {}: {}", backup_name, e)),
        }
        break;
    }

    entry
}

pub fn clean_injection() -> CleanupReport {
    match paths::local_app_data() {
        Some(local_root) => clean_injection_in(&local_root),
        None => CleanupReport::default(),
    }
}
