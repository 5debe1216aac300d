//! Подтверждения inject/uninject.
//!
//! Внешний inject-инструмент требует интерактивного ввода в отдельном
//! терминале, поэтому перед его запуском операция приостанавливается и ждёт
//! явного ответа пользователя. Каждый запрос несёт correlation id и ограничен
//! таймаутом: забытый диалог не подвешивает операцию навсегда.

use crate::error::{ManagerError, Result};
use crate::types::ConfirmKind;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tauri::Emitter;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

lazy_static! {
    /// Ожидающие ответа запросы, по correlation id
    static ref PENDING: Mutex<HashMap<String, oneshot::Sender<bool>>> =
        Mutex::new(HashMap::new());
}

fn register(id: &str) -> oneshot::Receiver<bool> {
    let (tx, rx) = oneshot::channel();
    let mut pending = PENDING.lock().unwrap_or_else(|e| e.into_inner());
    pending.insert(id.to_string(), tx);
    rx
}

fn unregister(id: &str) {
    let mut pending = PENDING.lock().unwrap_or_else(|e| e.into_inner());
    pending.remove(id);
}

/// Ожидание ответа по зарегистрированному запросу
async fn wait(
    id: &str,
    rx: oneshot::Receiver<bool>,
    timeout: Duration,
    token: &CancellationToken,
) -> Result<()> {
    let outcome = tokio::select! {
        _ = token.cancelled() => Err(ManagerError::Cancelled),
        answer = tokio::time::timeout(timeout, rx) => match answer {
            Err(_) => Err(ManagerError::ConfirmationTimedOut),
            Ok(Err(_)) => Err(ManagerError::ConfirmationDeclined),
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(ManagerError::ConfirmationDeclined),
        },
    };
    unregister(id);
    outcome
}

/// Показывает диалог в UI и ждёт ответа
pub async fn request(
    app: &tauri::AppHandle,
    kind: ConfirmKind,
    timeout: Duration,
    token: &CancellationToken,
) -> Result<()> {
    let id = uuid::Uuid::new_v4().to_string();
    let rx = register(&id);
    let _ = app.emit(
        "confirm-request",
        serde_json::json!({ "id": id, "kind": kind.as_str() }),
    );
    log::info!("Waiting for {} confirmation...", kind.as_str());
    wait(&id, rx, timeout, token).await
}

/// Ответ пользователя из UI. false, если запрос уже не ждёт
/// (таймаут, отмена или повторный клик)
#[tauri::command]
pub fn resolve_confirmation(id: String, accepted: bool) -> bool {
    let sender = {
        let mut pending = PENDING.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&id)
    };
    match sender {
        Some(tx) => tx.send(accepted).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_confirmed_request_resolves() {
        let token = CancellationToken::new();
        let rx = register("req-1");
        assert!(resolve_confirmation("req-1".into(), true));
        assert!(wait("req-1", rx, Duration::from_secs(1), &token).await.is_ok());
    }

    #[tokio::test]
    async fn test_declined_request_errors() {
        let token = CancellationToken::new();
        let rx = register("req-2");
        assert!(resolve_confirmation("req-2".into(), false));
        let err = wait("req-2", rx, Duration::from_secs(1), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::ConfirmationDeclined));
    }

    #[tokio::test]
    async fn test_forgotten_request_times_out() {
        let token = CancellationToken::new();
        let rx = register("req-3");
        let err = wait("req-3", rx, Duration::from_millis(10), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::ConfirmationTimedOut));
        // Запрос снят с учёта, поздний ответ больше не принимается
        assert!(!resolve_confirmation("req-3".into(), true));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_wait() {
        let token = CancellationToken::new();
        token.cancel();
        let rx = register("req-4");
        let err = wait("req-4", rx, Duration::from_secs(5), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::Cancelled));
    }

    #[test]
    fn test_unknown_id_rejected() {
        assert!(!resolve_confirmation("no-such-request".into(), true));
    }
}
