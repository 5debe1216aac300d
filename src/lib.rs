use chrono::Local;
use std::{fs, io::Write, sync::OnceLock};
use tauri::{Emitter, Manager};

// Global app handle for console event emission
static APP_HANDLE: OnceLock<tauri::AppHandle> = OnceLock::new();

/// Custom writer that emits log entries as Tauri events: the UI console
/// is a live mirror of the log stream
struct ConsoleLogWriter;

impl Write for ConsoleLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(app) = APP_HANDLE.get() {
            if let Ok(log_line) = std::str::from_utf8(buf) {
                if let Some(entry) = parse_log_line(log_line.trim()) {
                    let _ = app.emit("console-log", entry);
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Parse a fern log line into structured data
fn parse_log_line(line: &str) -> Option<serde_json::Value> {
    // Format: [2025-07-01 16:48:12.345 INFO target] message
    if !line.starts_with('[') {
        return None;
    }

    let close_bracket = line.find(']')?;
    let header = &line[1..close_bracket];
    let message = line[close_bracket + 1..].trim();

    let parts: Vec<&str> = header.splitn(4, ' ').collect();
    if parts.len() < 4 {
        return None;
    }

    Some(serde_json::json!({
        "timestamp": format!("{} {}", parts[0], parts[1]),
        "level": parts[2],
        "message": message
    }))
}

// External workspace crates
use moonplugs_core as core;

// Re-export for internal use
use core::{error, types};

// Local modules
mod catalog;
mod confirm;
mod detection;
mod discord;
mod inject;
mod installer;
mod operation;
mod paths;
mod plugins;
mod repo;
mod settings;
mod tools;
mod utils;

use error::{ManagerError, Result};

/// User-Agent для запросов каталога
/// Формат: github_username/project_name/version
pub const USER_AGENT: &str = concat!("srmooon/moonplugs/", env!("CARGO_PKG_VERSION"));

#[tauri::command]
fn open_external(app: tauri::AppHandle, url: String) -> Result<()> {
    use tauri_plugin_opener::OpenerExt;
    app.opener()
        .open_url(url, None::<String>)
        .map_err(|e| ManagerError::ProcessFailed {
            step: "open url".into(),
            message: e.to_string(),
        })
}

#[tauri::command]
fn window_minimize(window: tauri::Window) {
    let _ = window.minimize();
}

#[tauri::command]
fn window_close(window: tauri::Window) {
    let _ = window.close();
}

fn setup_logging(base_dir: &std::path::Path) {
    let logs_dir = base_dir.join("logs");
    let _ = fs::create_dir_all(&logs_dir);

    // Один файл логов на сессию
    let session_id = Local::now().timestamp();
    let log_file = logs_dir.join(format!("manager_{}.log", session_id));

    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .level_for("tao", log::LevelFilter::Warn)
        .level_for("wry", log::LevelFilter::Warn);

    let file_output: fern::Output = match fern::log_file(&log_file) {
        Ok(file) => file.into(),
        Err(_) => fern::Output::writer(Box::new(std::io::sink()), "\n"),
    };

    // ConsoleLogWriter emits events to frontend for real-time console
    let console_output = fern::Output::writer(Box::new(ConsoleLogWriter), "\n");

    #[cfg(debug_assertions)]
    let dispatch = dispatch
        .chain(std::io::stdout())
        .chain(file_output)
        .chain(console_output);

    #[cfg(not(debug_assertions))]
    let dispatch = dispatch.chain(file_output).chain(console_output);

    if dispatch.apply().is_err() {
        eprintln!("Logger already initialized, skipping");
    }
}

pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let base_dir = app.path().app_data_dir().map_err(|e| {
                format!(
                    "Failed to get app data directory: {} - check system permissions",
                    e
                )
            })?;
            fs::create_dir_all(&base_dir).map_err(|e| e.to_string())?;
            paths::init_paths(base_dir.clone()).map_err(|e| e.to_string())?;

            // Set global app handle BEFORE setup_logging so the first
            // lines already reach the UI console
            let _ = APP_HANDLE.set(app.handle().clone());
            setup_logging(&base_dir);

            log::info!("Manager initialized. Base dir: {:?}", base_dir);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Environment & state
            tools::check_dependencies,
            detection::detect_installation,
            discord::check_discord_running,
            discord::kill_discord,
            // Plugin catalog
            catalog::fetch_plugins,
            plugins::get_installed_plugins,
            // Lifecycle operations
            installer::install_dev_build,
            installer::install_plugin,
            installer::uninstall_plugin,
            installer::rebuild_mod,
            installer::update_mod,
            installer::uninstall_mod,
            // Confirmation & cancellation
            confirm::resolve_confirmation,
            operation::cancel_operation,
            // Settings
            settings::get_settings,
            settings::save_settings,
            // Shell
            open_external,
            window_minimize,
            window_close,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_line() {
        let entry = parse_log_line(
            "[2025-07-01 16:48:12.345 INFO moonplugs_lib::installer] Closing Discord...",
        )
        .unwrap();
        assert_eq!(entry["level"], "INFO");
        assert_eq!(entry["timestamp"], "2025-07-01 16:48:12.345");
        assert_eq!(entry["message"], "Closing Discord...");
    }

    #[test]
    fn test_parse_log_line_rejects_garbage() {
        assert!(parse_log_line("not a log line").is_none());
        assert!(parse_log_line("[too short]").is_none());
    }
}
