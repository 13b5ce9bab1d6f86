//! browser
//!
//! Граница между мониторингом и движком браузера. Мониторинг и скрейпер работают
//! только с трейтами [`Browser`] и [`PageHandle`], поэтому в тестах движок
//! подменяется заглушкой, а в продакшене используется [`chromium::ChromiumBrowser`].

pub mod chromium;

use async_trait::async_trait;

use crate::config::PageTimeouts;
use crate::error::BrowserError;

pub use chromium::ChromiumBrowser;

/// Источник загруженных страниц.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Открывает новую страницу, переходит по `url` с таймаутом навигации
    /// и ждёт `settle_delay`. Если переход не удался, страница уже закрыта.
    async fn open_page(
        &self,
        url: &str,
        timeouts: PageTimeouts,
    ) -> Result<Box<dyn PageHandle>, BrowserError>;
}

/// Загруженная страница.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Текст первого элемента, подходящего под селектор.
    async fn first_text(&self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Значение атрибута у каждого элемента, подходящего под селектор, в порядке документа.
    async fn attribute_all(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<Option<String>>, BrowserError>;

    /// Выполняет выражение в контексте страницы и возвращает результат как JSON.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    async fn close(&self);
}
