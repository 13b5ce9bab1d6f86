use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use crate::{config::TelegramConfig, error::NotifyError};

/// Канал доставки уведомлений.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Отправляет текст всем адресатам. Сбой для одного адресата не мешает остальным.
    async fn send_message(&self, text: &str) -> Result<(), NotifyError>;
}

// Тело запроса sendMessage Bot API
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Уведомления через Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    http_client: reqwest::Client,
    /// Полный адрес метода sendMessage, включая токен бота.
    endpoint: String,
    chat_ids: Vec<String>,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_ids: Vec<String>, api_url: &str) -> Result<Self, NotifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), bot_token),
            chat_ids,
        })
    }

    pub fn from_config(config: &TelegramConfig) -> Result<Self, NotifyError> {
        Self::new(
            config.bot_token.as_deref().unwrap_or_default(),
            config.chat_ids.clone(),
            &config.api_url,
        )
    }

    async fn send_to(&self, chat_id: &str, text: &str) -> Result<(), reqwest::Error> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        self.http_client
            .post(&self.endpoint)
            .form(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let mut failed = 0;

        for chat_id in &self.chat_ids {
            match self.send_to(chat_id, text).await {
                Ok(()) => info!("📨 Message sent to {}", chat_id),
                Err(e) => {
                    // Токен бота входит в URL, поэтому в лог идёт ошибка без него
                    error!("Error sending message to {}: {}", chat_id, e.without_url());
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(NotifyError::Delivery {
                failed,
                total: self.chat_ids.len(),
            });
        }
        Ok(())
    }
}
