//! Git-операции над репозиториями модов и плагинов.

use crate::error::Result;
use crate::utils::run_step;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub fn is_repo(dir: &Path) -> bool {
    dir.join(".git").exists()
}

pub async fn clone(url: &str, dest: &Path, token: &CancellationToken) -> Result<()> {
    let dest = dest.to_string_lossy();
    run_step("git clone", "git", &["clone", url, &dest], None, token).await?;
    Ok(())
}

/// Сброс локальных изменений: рабочая копия редактируется сборкой мода
pub async fn reset_hard(dir: &Path, token: &CancellationToken) -> Result<()> {
    run_step(
        "git reset",
        "git",
        &["reset", "--hard", "HEAD"],
        Some(dir),
        token,
    )
    .await?;
    Ok(())
}

pub async fn pull(dir: &Path, token: &CancellationToken) -> Result<()> {
    run_step("git pull", "git", &["pull"], Some(dir), token).await?;
    Ok(())
}
