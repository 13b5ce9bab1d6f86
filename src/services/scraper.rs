//! scraper.rs
//!
//! Извлечение данных со страниц спектаклей и событий. Все функции работают
//! с уже загруженной страницей через [`PageHandle`] и не знают, какой браузер
//! стоит за ней.

use std::collections::HashSet;
use tracing::{error, info};
use url::Url;

use crate::{
    browser::{Browser, PageHandle},
    config::{PageTimeouts, SiteConfig},
    error::BrowserError,
    models::RectFill,
};

/// Заглушка, если на странице нет заголовка спектакля.
pub const TITLE_NOT_FOUND: &str = "Вистава (назва не знайдена)";
/// Заглушка, если дата и время события не найдены.
pub const DATETIME_NOT_FOUND: &str = "Дата та час не знайдені";

// Селекторы даты события, в порядке приоритета
const DATETIME_SELECTORS: &[&str] = &[
    ".event-date",
    ".event-datetime",
    "time",
    ".date",
    ".performance-date",
    ".event-info span",
];

// Все прямоугольники схемы зала с вычисленной заливкой
const RECT_FILL_SCRIPT: &str = r#"
    Array.from(document.querySelectorAll('rect'))
        .map((r, i) => ({ index: i, color: getComputedStyle(r).fill }))
"#;

pub async fn load_page(
    browser: &dyn Browser,
    url: &str,
    timeouts: PageTimeouts,
) -> Result<Box<dyn PageHandle>, BrowserError> {
    browser.open_page(url, timeouts).await
}

/// Заголовок спектакля из первого `h1`.
pub async fn get_show_title(page: &dyn PageHandle) -> String {
    match page.first_text("h1").await {
        Ok(Some(text)) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => TITLE_NOT_FOUND.to_string(),
        Err(e) => {
            error!("Error extracting show title: {}", e);
            TITLE_NOT_FOUND.to_string()
        }
    }
}

/// Перебирает селекторы и возвращает первый непустой текст.
pub async fn get_event_datetime(page: &dyn PageHandle) -> String {
    for selector in DATETIME_SELECTORS {
        match page.first_text(selector).await {
            Ok(Some(text)) => {
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
            Ok(None) => {}
            Err(e) => error!(
                "Error extracting event datetime using selector '{}': {}",
                selector, e
            ),
        }
    }
    DATETIME_NOT_FOUND.to_string()
}

/// Ссылки на страницы продажи билетов, без повторов.
pub async fn extract_event_links(
    page: &dyn PageHandle,
    site: &SiteConfig,
) -> Result<Vec<String>, BrowserError> {
    let hrefs = page.attribute_all("a", "href").await?;
    info!("Found {} links on the page.", hrefs.len());

    let base = Url::parse(&site.event_base_url).ok();
    let mut event_links = HashSet::new();

    for href in hrefs.into_iter().flatten() {
        if !href.contains(&site.event_link_marker) {
            continue;
        }
        if href.starts_with("http") {
            event_links.insert(href);
        } else if let Some(full) = base.as_ref().and_then(|b| b.join(&href).ok()) {
            event_links.insert(full.to_string());
        } else {
            event_links.insert(format!("{}{}", site.event_base_url.trim_end_matches('/'), href));
        }
    }

    info!("Extracted {} event links.", event_links.len());
    Ok(event_links.into_iter().collect())
}

/// Последний сегмент пути URL; используется как название, если заголовка нет.
pub fn get_fallback_name(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

pub async fn get_rect_fill_colors(page: &dyn PageHandle) -> Result<Vec<RectFill>, BrowserError> {
    let value = page.evaluate(RECT_FILL_SCRIPT).await?;
    Ok(serde_json::from_value(value)?)
}
