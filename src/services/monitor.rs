//! monitor.rs
//!
//! Оркестратор мониторинга спектаклей.
//!
//! Каждый цикл:
//! 1.  Параллельно загружает страницы спектаклей и собирает ссылки на события.
//! 2.  Параллельно проверяет каждое событие: снимает цвета мест со схемы зала и
//!     вычисляет множество свободных мест.
//! 3.  Сравнивает его с результатом прошлого цикла и сообщает о новых местах.
//!
//! Ошибка одной страницы только логируется и не прерывает цикл.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    browser::{Browser, PageHandle},
    config::{Config, MonitorConfig, PageTimeouts, SiteConfig},
    error::BrowserError,
    models::{free_seats, new_seats, EventLink, EventSnapshot, SeatId},
    services::{
        notifier::Notifier,
        scraper,
        ticker::{Clock, CycleTicker, TokioClock},
    },
};

pub const STARTUP_MESSAGE: &str = "🎭 Monitoring multiple performances started.";

pub struct PerformanceMonitor {
    browser: Arc<dyn Browser>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: MonitorConfig,
    timeouts: PageTimeouts,
    site: SiteConfig,
    /// Свободные места каждого события по результатам прошлой проверки.
    previous_free_seats: Mutex<HashMap<String, HashSet<SeatId>>>,
}

impl PerformanceMonitor {
    pub fn new(config: &Config, browser: Arc<dyn Browser>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            browser,
            notifier,
            clock: Arc::new(TokioClock),
            settings: config.monitor.clone(),
            timeouts: config.page,
            site: config.site.clone(),
            previous_free_seats: Mutex::new(HashMap::new()),
        }
    }

    /// Подменяет часы, по которым идёт расписание циклов.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Ссылки на события с одной страницы спектакля. При ошибке - пустой список.
    pub async fn get_event_links_for_perf(&self, listing_url: &str) -> Vec<EventLink> {
        match self.fetch_event_links(listing_url).await {
            Ok(links) => links,
            Err(e) => {
                error!("Error extracting event links for {}: {}", listing_url, e);
                Vec::new()
            }
        }
    }

    async fn fetch_event_links(&self, listing_url: &str) -> Result<Vec<EventLink>, BrowserError> {
        let page = scraper::load_page(self.browser.as_ref(), listing_url, self.timeouts).await?;
        let links = scraper::extract_event_links(page.as_ref(), &self.site).await;
        page.close().await;

        Ok(links?
            .into_iter()
            .map(|event_url| EventLink::new(event_url, listing_url))
            .collect())
    }

    /// Ссылки на события со всех страниц спектаклей; страницы обходятся параллельно.
    pub async fn get_all_event_links(&self) -> Vec<EventLink> {
        let tasks = self
            .settings
            .performance_urls
            .iter()
            .map(|listing_url| self.get_event_links_for_perf(listing_url));

        join_all(tasks).await.into_iter().flatten().collect()
    }

    /// Проверяет одно событие. `None`, если страницу не удалось обработать.
    pub async fn check_event(&self, link: &EventLink) -> Option<EventSnapshot> {
        let page = match scraper::load_page(self.browser.as_ref(), &link.event_url, self.timeouts).await {
            Ok(page) => page,
            Err(e) => {
                error!("Error checking event {}: {}", link.event_url, e);
                return None;
            }
        };

        let result = self.inspect_event(page.as_ref(), link).await;
        page.close().await;

        match result {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("Error checking event {}: {}", link.event_url, e);
                None
            }
        }
    }

    async fn inspect_event(
        &self,
        page: &dyn PageHandle,
        link: &EventLink,
    ) -> Result<EventSnapshot, BrowserError> {
        let mut title = scraper::get_show_title(page).await;
        if title == scraper::TITLE_NOT_FOUND {
            title = scraper::get_fallback_name(&link.listing_url);
        }

        let datetime = scraper::get_event_datetime(page).await;
        let rects = scraper::get_rect_fill_colors(page).await?;
        info!("Event {}: found {} rect elements.", link.event_url, rects.len());

        let free = free_seats(&rects, &self.settings.ignored_colors);

        // Состояние заменяется до отправки, поэтому сбой доставки его не затрагивает
        let new = {
            let mut previous = self.previous_free_seats.lock().await;
            let new = new_seats(&free, previous.get(&link.event_url));
            previous.insert(link.event_url.clone(), free.clone());
            new
        };

        let snapshot = EventSnapshot {
            event_url: link.event_url.clone(),
            listing_url: link.listing_url.clone(),
            title,
            datetime,
            rect_count: rects.len(),
            free_seats: free,
            new_seats: new,
        };

        if !snapshot.new_seats.is_empty() {
            self.report_new_seats(&snapshot).await;
        }

        Ok(snapshot)
    }

    async fn report_new_seats(&self, snapshot: &EventSnapshot) {
        let message = snapshot.notification_text();
        info!("🎟 New seats found for {}: {}", snapshot.title, snapshot.new_seats.len());
        info!("{}", message);

        if !self.settings.send_notifications {
            return;
        }
        if let Err(e) = self.notifier.send_message(&message).await {
            error!("Failed to notify about {}: {}", snapshot.event_url, e);
        }
    }

    /// Свободные места события, запомненные по итогам последней проверки.
    pub async fn previous_free_seats(&self, event_url: &str) -> Option<HashSet<SeatId>> {
        self.previous_free_seats.lock().await.get(event_url).cloned()
    }

    /// Один полный цикл: сбор ссылок и проверка всех найденных событий.
    pub async fn run_cycle(&self) -> Vec<EventSnapshot> {
        let event_links = self.get_all_event_links().await;
        if event_links.is_empty() {
            warn!("No event links found in this cycle");
            return Vec::new();
        }

        // Одно событие может встречаться на нескольких страницах спектаклей
        let mut seen = HashSet::new();
        let unique: Vec<&EventLink> = event_links
            .iter()
            .filter(|link| seen.insert(link.event_url.as_str()))
            .collect();

        let checks = unique.into_iter().map(|link| self.check_event(link));
        join_all(checks).await.into_iter().flatten().collect()
    }

    /// Бесконечный цикл мониторинга. Завершается только отменой снаружи.
    pub async fn run_monitoring(&self) {
        info!("🎭 Monitoring started.");
        if self.settings.send_notifications {
            if let Err(e) = self.notifier.send_message(STARTUP_MESSAGE).await {
                error!("Failed to send startup message: {}", e);
            }
        }

        let mut ticker = CycleTicker::new(
            self.clock.as_ref(),
            self.settings.min_check_interval,
            self.settings.sleep_interval,
        );

        loop {
            ticker.begin_cycle().await;

            let snapshots = self.run_cycle().await;
            let new_total: usize = snapshots.iter().map(|s| s.new_seats.len()).sum();
            info!("🔄 Cycle done: {} events checked, {} new seats", snapshots.len(), new_total);

            ticker.end_cycle().await;
        }
    }
}
