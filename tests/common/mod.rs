#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use performance_watch::{
    browser::{Browser, PageHandle},
    config::{Config, PageTimeouts},
    services::{Clock, Notifier},
    BrowserError, NotifyError,
};

/// Страница фейкового сайта.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: Option<String>,
    pub datetime: Option<String>,
    pub hrefs: Vec<String>,
    pub rects: Value,
    pub fail_script: bool,
}

impl FakePage {
    pub fn listing(hrefs: &[&str]) -> Self {
        Self {
            hrefs: hrefs.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn event(title: &str, colors: &[&str]) -> Self {
        Self {
            title: Some(title.to_string()),
            datetime: Some("15.03.2025 19:00".to_string()),
            rects: rects(colors),
            ..Default::default()
        }
    }
}

pub fn rects(colors: &[&str]) -> Value {
    Value::Array(
        colors
            .iter()
            .enumerate()
            .map(|(i, c)| json!({ "index": i, "color": c }))
            .collect(),
    )
}

/// Браузер, отдающий заранее заданные страницы. Неизвестный URL - ошибка навигации.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    pages: Arc<Mutex<HashMap<String, FakePage>>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FakeBrowser {
    pub fn with_page(self, url: &str, page: FakePage) -> Self {
        self.set_page(url, page);
        self
    }

    pub fn set_page(&self, url: &str, page: FakePage) {
        self.pages.lock().unwrap().insert(url.to_string(), page);
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn open_page(
        &self,
        url: &str,
        _timeouts: PageTimeouts,
    ) -> Result<Box<dyn PageHandle>, BrowserError> {
        let page = self
            .pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })?;

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeHandle {
            page,
            closed: self.closed.clone(),
        }))
    }
}

struct FakeHandle {
    page: FakePage,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl PageHandle for FakeHandle {
    async fn first_text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        Ok(match selector {
            "h1" => self.page.title.clone(),
            ".event-date" => self.page.datetime.clone(),
            _ => None,
        })
    }

    async fn attribute_all(
        &self,
        _selector: &str,
        _attribute: &str,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        Ok(self.page.hrefs.iter().cloned().map(Some).collect())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, BrowserError> {
        if self.page.fail_script {
            return Err(BrowserError::Script("Execution context was destroyed".to_string()));
        }
        Ok(self.page.rects.clone())
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Запоминает все сообщения; при `failing` ещё и сообщает об ошибке доставки.
#[derive(Default)]
pub struct RecordingNotifier {
    pub failing: bool,
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.failing {
            return Err(NotifyError::Delivery { failed: 1, total: 1 });
        }
        Ok(())
    }
}

/// Ручные часы: `sleep` сдвигает время мгновенно и отдаёт управление планировщику.
pub struct ManualClock {
    now: Mutex<Instant>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.now.lock().unwrap() += duration;
        tokio::task::yield_now().await;
    }
}

pub fn test_config(listing_urls: &[&str], send_notifications: bool) -> Config {
    let vars: HashMap<&str, String> = [
        ("PERFORMANCE_URLS", listing_urls.join(",")),
        ("IGNORED_COLORS", "rgb(173, 173, 173);rgb(255, 255, 255)".to_string()),
        ("SEND_NOTIFICATIONS", send_notifications.to_string()),
        ("BOT_TOKEN", "test-token".to_string()),
        ("CHAT_IDS", "100".to_string()),
        ("WAIT_TIMEOUT_MS", "0".to_string()),
    ]
    .into_iter()
    .collect();

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config is valid")
}
