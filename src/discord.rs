//! Управление процессом Discord: проверка и best-effort завершение.

use crate::settings;
use std::time::Duration;

/// Имена процессов всех вариантов Discord
pub const PROCESS_NAMES: [&str; 3] = ["Discord.exe", "DiscordPTB.exe", "DiscordCanary.exe"];

#[cfg(windows)]
pub async fn is_running() -> bool {
    let output = tokio::process::Command::new("tasklist")
        .args(["/FI", "IMAGENAME eq Discord.exe"])
        .output()
        .await;
    match output {
        Ok(out) => String::from_utf8_lossy(&out.stdout).contains("Discord.exe"),
        Err(_) => false,
    }
}

#[cfg(not(windows))]
pub async fn is_running() -> bool {
    let output = tokio::process::Command::new("pgrep")
        .args(["-x", "Discord"])
        .output()
        .await;
    matches!(output, Ok(out) if out.status.success())
}

/// Завершает все варианты Discord и выжидает settle-паузу: процесс может
/// держать файловые блокировки ещё какое-то время после taskkill.
/// Ошибки завершения игнорируются (процесс мог и не быть запущен).
pub async fn kill_all(settle: Duration) {
    for name in PROCESS_NAMES {
        kill_by_name(name).await;
    }
    tokio::time::sleep(settle).await;
}

#[cfg(windows)]
async fn kill_by_name(name: &str) {
    let _ = tokio::process::Command::new("taskkill")
        .args(["/F", "/IM", name])
        .output()
        .await;
}

#[cfg(not(windows))]
async fn kill_by_name(name: &str) {
    let base = name.trim_end_matches(".exe");
    let _ = tokio::process::Command::new("pkill")
        .args(["-x", base])
        .output()
        .await;
}

#[tauri::command]
pub async fn check_discord_running() -> bool {
    is_running().await
}

#[tauri::command]
pub async fn kill_discord() -> bool {
    let cfg = settings::load();
    kill_all(Duration::from_millis(cfg.kill_settle_ms)).await;
    true
}
