//! Проверка внешних инструментов (git, node, npm, pnpm).
//!
//! Отсутствие инструмента и его сбой не различаются: любой ненулевой выход
//! или ошибка запуска считаются «не установлен».

use crate::error::{ManagerError, Result};
use crate::types::DependencyStatus;
use crate::utils::{run_step, tool_command};
use tokio_util::sync::CancellationToken;

pub async fn check_tool(program: &str) -> bool {
    let mut cmd = tool_command(program);
    cmd.arg("--version")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());
    match cmd.output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

pub async fn check_all() -> DependencyStatus {
    DependencyStatus {
        git: check_tool("git").await,
        node: check_tool("node").await,
        npm: check_tool("npm").await,
    }
}

/// Гейт перед install-devbuild: падает до каких-либо изменений на диске
pub fn verify_dev_tools(status: &DependencyStatus) -> Result<()> {
    if !status.git {
        return Err(ManagerError::MissingDependency {
            tool: "Git".into(),
            hint: "Download at: https://git-scm.com/download/win".into(),
        });
    }
    if !status.node || !status.npm {
        return Err(ManagerError::MissingDependency {
            tool: "Node.js".into(),
            hint: "Download at: https://nodejs.org/".into(),
        });
    }
    Ok(())
}

/// pnpm ставится глобально через npm, если его ещё нет
pub async fn ensure_pnpm(token: &CancellationToken) -> Result<()> {
    if check_tool("pnpm").await {
        return Ok(());
    }
    log::info!("pnpm not found, installing globally...");
    run_step("pnpm setup", "npm", &["install", "-g", "pnpm"], None, token).await?;
    Ok(())
}

#[tauri::command]
pub async fn check_dependencies() -> DependencyStatus {
    check_all().await
}
