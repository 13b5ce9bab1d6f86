use thiserror::Error;

/// Ошибки чтения конфигурации при старте.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Ошибки работы с браузером: загрузка страницы, запросы к DOM, выполнение скриптов.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("navigation to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u128 },
    #[error("query `{selector}` failed: {reason}")]
    Query { selector: String, reason: String },
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("unexpected script result: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Ошибки доставки уведомлений.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("message was not delivered to {failed} of {total} destinations")]
    Delivery { failed: usize, total: usize },
}
