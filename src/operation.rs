//! Одна lifecycle-операция за раз.
//!
//! Бэкенд сам сериализует операции, не полагаясь на дизейбл кнопок в UI:
//! повторный запрос во время выполнения отклоняется с Busy, а не
//! перемешивается с текущим. Установки и плагины делят одни и те же папки,
//! поэтому guard общепроцессный.

use crate::error::{ManagerError, Result};
use lazy_static::lazy_static;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

struct Active {
    name: &'static str,
    token: CancellationToken,
}

lazy_static! {
    static ref ACTIVE: Mutex<Option<Active>> = Mutex::new(None);
}

/// Держатель права на выполнение операции; освобождает слот при Drop
pub struct OperationGuard {
    token: CancellationToken,
}

impl OperationGuard {
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        let mut active = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
        *active = None;
    }
}

/// Захват слота операции. Busy, если другая операция ещё выполняется
pub fn begin(name: &'static str) -> Result<OperationGuard> {
    let mut active = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(running) = active.as_ref() {
        log::warn!("Rejecting {}: {} is still running", name, running.name);
        return Err(ManagerError::Busy {
            operation: running.name.to_string(),
        });
    }
    let token = CancellationToken::new();
    *active = Some(Active {
        name,
        token: token.clone(),
    });
    log::debug!("Operation started: {}", name);
    Ok(OperationGuard { token })
}

/// Отмена текущей операции; имя отменённой операции или None
pub fn cancel_current() -> Option<&'static str> {
    let active = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    active.as_ref().map(|a| {
        a.token.cancel();
        log::info!("Cancelling operation: {}", a.name);
        a.name
    })
}

#[tauri::command]
pub fn cancel_operation() -> Option<&'static str> {
    cancel_current()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Тесты делят один глобальный слот, поэтому идут в одном тесте
    #[test]
    fn test_single_operation_at_a_time() {
        let guard = begin("install-devbuild").unwrap();

        match begin("update-mod") {
            Err(ManagerError::Busy { operation }) => {
                assert_eq!(operation, "install-devbuild");
            }
            other => panic!("expected Busy, got {:?}", other.err().map(|e| e.to_string())),
        }

        // Отмена помечает токен текущей операции
        assert_eq!(cancel_current(), Some("install-devbuild"));
        assert!(guard.token().is_cancelled());

        // После освобождения слот доступен снова
        drop(guard);
        assert!(cancel_current().is_none());
        let guard = begin("update-mod").unwrap();
        assert!(!guard.token().is_cancelled());
    }
}
