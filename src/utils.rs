use crate::error::{ManagerError, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Команда для внешнего инструмента. На Windows инструменты вроде npm/pnpm
/// являются .cmd-шимами, которые нельзя запустить без интерпретатора
#[cfg(windows)]
pub fn tool_command(program: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.args(["/C", program]);
    cmd
}

#[cfg(not(windows))]
pub fn tool_command(program: &str) -> tokio::process::Command {
    tokio::process::Command::new(program)
}

/// Запуск внешнего процесса с ожиданием завершения.
///
/// Ненулевой код выхода превращается в `ProcessFailed` с обрезанным stderr
/// инструмента в качестве сообщения. Отмена убивает дочерний процесс.
pub async fn run_step(
    step: &str,
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    token: &CancellationToken,
) -> Result<String> {
    if token.is_cancelled() {
        return Err(ManagerError::Cancelled);
    }

    let mut cmd = tool_command(program);
    cmd.args(args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = tokio::select! {
        _ = token.cancelled() => return Err(ManagerError::Cancelled),
        output = cmd.output() => output.map_err(|e| ManagerError::ProcessFailed {
            step: step.to_string(),
            message: e.to_string(),
        })?,
    };

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = if !stderr.trim().is_empty() {
            stderr.trim().to_string()
        } else if !stdout.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            format!("exited with {}", output.status)
        };
        Err(ManagerError::ProcessFailed {
            step: step.to_string(),
            message,
        })
    }
}

/// Сон с возможностью отмены
pub async fn sleep_cancellable(duration: Duration, token: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = token.cancelled() => Err(ManagerError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Безопасное атомарное сохранение файла
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("tmp");

    let mut file = File::create(&tmp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("settings.json");

        atomic_write(&target, b"{}").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"{}");

        // Перезапись не оставляет tmp-файла
        atomic_write(&target, b"{\"a\":1}").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"{\"a\":1}");
        assert!(!target.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_run_step_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let err = run_step("noop", "true", &[], None, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::Cancelled));
    }

    #[tokio::test]
    async fn test_sleep_cancellable_observes_token() {
        let token = CancellationToken::new();
        token.cancel();
        let err = sleep_cancellable(Duration::from_secs(60), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::Cancelled));
    }
}
