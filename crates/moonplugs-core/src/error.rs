use serde::Serialize;
use thiserror::Error;

/// Информация об ошибке с подсказкой для восстановления
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Код ошибки для идентификации
    pub code: String,
    /// Человекочитаемое сообщение
    pub message: String,
    /// Подсказка для исправления
    pub recovery_hint: Option<String>,
    /// Технические детали (для логов)
    pub details: Option<String>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            recovery_hint: None,
            details: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{tool} is not installed")]
    MissingDependency { tool: String, hint: String },

    #[error("Developer build not found")]
    DevBuildNotFound,

    #[error("{step} failed: {message}")]
    ProcessFailed { step: String, message: String },

    #[error("Another operation is already running: {operation}")]
    Busy { operation: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Confirmation timed out")]
    ConfirmationTimedOut,

    #[error("Confirmation declined")]
    ConfirmationDeclined,
}

impl ManagerError {
    /// Возвращает информацию об ошибке с подсказкой для восстановления
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            ManagerError::Io(e) => {
                let hint = if e.kind() == std::io::ErrorKind::PermissionDenied {
                    "Check access permissions to the Discord and mod folders"
                } else {
                    "Ensure the folder is accessible and not locked by another process"
                };
                ErrorInfo::new("IO_ERROR", format!("Filesystem error: {}", e.kind()))
                    .with_hint(hint)
                    .with_details(e.to_string())
            }
            ManagerError::Http(e) => {
                let (message, hint) = if e.is_timeout() {
                    ("Server timeout", "Check your internet connection and try again")
                } else if e.is_connect() {
                    (
                        "Failed to connect to server",
                        "Check your internet connection. The server might be temporarily unavailable",
                    )
                } else {
                    ("Network error", "Check your internet connection")
                };
                ErrorInfo::new("HTTP_ERROR", message)
                    .with_hint(hint)
                    .with_details(e.to_string())
            }
            ManagerError::Json(e) => ErrorInfo::new("JSON_ERROR", "Data processing error")
                .with_hint("The plugin catalog format may have changed. Check for application updates")
                .with_details(e.to_string()),
            ManagerError::MissingDependency { tool, hint } => {
                ErrorInfo::new("MISSING_DEPENDENCY", format!("{} is not installed", tool))
                    .with_hint(hint.clone())
            }
            ManagerError::DevBuildNotFound => {
                ErrorInfo::new("DEV_BUILD_NOT_FOUND", "Developer build not found")
                    .with_hint("Install the developer build first, then manage plugins")
            }
            ManagerError::ProcessFailed { step, message } => {
                ErrorInfo::new("PROCESS_FAILED", format!("{} failed", step))
                    .with_hint("See the console output for the tool's own error message")
                    .with_details(message.clone())
            }
            ManagerError::Busy { operation } => ErrorInfo::new(
                "BUSY",
                format!("Another operation is already running: {}", operation),
            )
            .with_hint("Wait for the current operation to finish or cancel it"),
            ManagerError::Cancelled => ErrorInfo::new("CANCELLED", "Operation cancelled"),
            ManagerError::ConfirmationTimedOut => {
                ErrorInfo::new("CONFIRMATION_TIMEOUT", "Confirmation timed out")
                    .with_hint("Run the operation again and answer the prompt")
            }
            ManagerError::ConfirmationDeclined => {
                ErrorInfo::new("CONFIRMATION_DECLINED", "Confirmation declined")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ManagerError>;

impl serde::Serialize for ManagerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Сериализуем как ErrorInfo для более полной информации
        self.to_error_info().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_carries_hint() {
        let err = ManagerError::MissingDependency {
            tool: "Git".into(),
            hint: "Download at: https://git-scm.com/download/win".into(),
        };
        let info = err.to_error_info();
        assert_eq!(info.code, "MISSING_DEPENDENCY");
        assert_eq!(
            info.recovery_hint.as_deref(),
            Some("Download at: https://git-scm.com/download/win")
        );
    }

    #[test]
    fn test_busy_names_running_operation() {
        let err = ManagerError::Busy {
            operation: "install-devbuild".into(),
        };
        assert!(err.to_error_info().message.contains("install-devbuild"));
    }
}
