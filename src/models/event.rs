use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::seat::SeatId;

/// Ссылка на страницу события вместе со страницей спектакля, где она найдена.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventLink {
    pub event_url: String,
    pub listing_url: String,
}

impl EventLink {
    pub fn new(event_url: impl Into<String>, listing_url: impl Into<String>) -> Self {
        Self {
            event_url: event_url.into(),
            listing_url: listing_url.into(),
        }
    }
}

// Результат одной проверки страницы события
#[derive(Debug, Clone, Serialize)]
pub struct EventSnapshot {
    pub event_url: String,
    pub listing_url: String,
    pub title: String,
    pub datetime: String,
    pub rect_count: usize,
    pub free_seats: HashSet<SeatId>,
    pub new_seats: HashSet<SeatId>,
}

impl EventSnapshot {
    /// Текст уведомления в разметке Telegram Markdown.
    pub fn notification_text(&self) -> String {
        format!(
            "\n🎭 *{}*\n🕒 {}\n🎟 Нові вільні місця: {}\n🔗 [Перейти до події]({})",
            self.title,
            self.datetime,
            self.new_seats.len(),
            self.event_url
        )
    }
}
