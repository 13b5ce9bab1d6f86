use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{Browser, PageHandle};
use crate::config::PageTimeouts;
use crate::error::BrowserError;

/// Headless Chromium, управляемый через CDP.
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    /// Задача, обрабатывающая события CDP. Без неё браузер не отвечает.
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    pub async fn launch(timeouts: PageTimeouts) -> Result<Self, BrowserError> {
        info!("🌐 Launching headless browser");

        let config = BrowserConfig::builder()
            .request_timeout(timeouts.navigation_timeout)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(BrowserError::Launch)?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {:?}", e);
                }
            }
            info!("Browser event handler finished");
        });

        Ok(Self { browser, handler })
    }

    /// Закрывает браузер вместе со всеми открытыми страницами.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser process: {}", e);
        }
        self.handler.abort();
        info!("🌐 Browser closed");
    }

    async fn navigate(page: &Page, url: &str, timeouts: PageTimeouts) -> Result<(), BrowserError> {
        match tokio::time::timeout(timeouts.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(BrowserError::Timeout {
                    url: url.to_string(),
                    timeout_ms: timeouts.navigation_timeout.as_millis(),
                })
            }
        }

        // Схема зала дорисовывается скриптами уже после загрузки документа
        if timeouts.settle_delay > Duration::ZERO {
            tokio::time::sleep(timeouts.settle_delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn open_page(
        &self,
        url: &str,
        timeouts: PageTimeouts,
    ) -> Result<Box<dyn PageHandle>, BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: format!("failed to create page: {}", e),
            })?;

        let page = ChromiumPage { page };
        if let Err(e) = Self::navigate(&page.page, url, timeouts).await {
            page.close().await;
            return Err(e);
        }

        debug!("Loaded {}", url);
        Ok(Box::new(page))
    }
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn first_text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let query_error = |e: chromiumoxide::error::CdpError| BrowserError::Query {
            selector: selector.to_string(),
            reason: e.to_string(),
        };

        // find_elements возвращает пустой список вместо ошибки, если ничего не найдено
        let elements = self.page.find_elements(selector).await.map_err(query_error)?;
        match elements.first() {
            Some(element) => element.inner_text().await.map_err(query_error),
            None => Ok(None),
        }
    }

    async fn attribute_all(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        let query_error = |e: chromiumoxide::error::CdpError| BrowserError::Query {
            selector: selector.to_string(),
            reason: e.to_string(),
        };

        let elements = self.page.find_elements(selector).await.map_err(query_error)?;
        let mut values = Vec::with_capacity(elements.len());
        for element in &elements {
            values.push(element.attribute(attribute).await.map_err(query_error)?);
        }
        Ok(values)
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;

        Ok(result.into_value::<serde_json::Value>()?)
    }

    async fn close(&self) {
        if let Err(e) = self.page.clone().close().await {
            error!("Failed to close page: {}", e);
        }
    }
}
