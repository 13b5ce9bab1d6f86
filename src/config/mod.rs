use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

// Страницы спектаклей, которые отслеживаются по умолчанию
pub const DEFAULT_PERFORMANCE_URLS: &[&str] = &[
    "https://ft.org.ua/performances/sluga-dvox-paniv",
    "https://ft.org.ua/performances/vesillia-figaro",
];

// Цвета фона и недоступных мест на схеме зала
pub const DEFAULT_IGNORED_COLORS: &[&str] = &["rgb(173, 173, 173)", "rgb(255, 255, 255)"];

// Главная структура конфигурации - собирается один раз при старте
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub telegram: TelegramConfig,
    pub monitor: MonitorConfig,
    pub page: PageTimeouts,
    pub site: SiteConfig,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_log: String,
}

// Настройки Telegram бота
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_ids: Vec<String>,
    pub api_url: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "***"))
            .field("chat_ids", &self.chat_ids)
            .field("api_url", &self.api_url)
            .finish()
    }
}

// Настройки цикла мониторинга
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub performance_urls: Vec<String>,
    /// Цвета в нижнем регистре; места такого цвета никогда не считаются свободными.
    pub ignored_colors: HashSet<String>,
    /// Пауза после каждого цикла.
    pub sleep_interval: Duration,
    /// Минимальный интервал между началами двух циклов.
    pub min_check_interval: Duration,
    pub send_notifications: bool,
}

// Таймауты загрузки страниц в браузере
#[derive(Debug, Clone, Copy)]
pub struct PageTimeouts {
    pub navigation_timeout: Duration,
    /// Задержка после загрузки, чтобы схема зала успела отрисоваться.
    pub settle_delay: Duration,
}

// Правила поиска ссылок на события
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub event_link_marker: String,
    pub event_base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            event_link_marker: "sales.ft.org.ua/events/".to_string(),
            event_base_url: "https://sales.ft.org.ua".to_string(),
        }
    }
}

impl Default for PageTimeouts {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_millis(60_000),
            settle_delay: Duration::from_millis(1_000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собирает конфигурацию из произвольного источника переменных.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let send_notifications: bool = parse_or(&lookup, "SEND_NOTIFICATIONS", false)?;

        let bot_token = lookup("BOT_TOKEN").filter(|t| !t.trim().is_empty());
        if send_notifications && bot_token.is_none() {
            return Err(ConfigError::Missing("BOT_TOKEN"));
        }

        let performance_urls = match lookup("PERFORMANCE_URLS") {
            Some(raw) => split_list(&raw, ','),
            None => DEFAULT_PERFORMANCE_URLS.iter().map(|s| s.to_string()).collect(),
        };
        if performance_urls.is_empty() {
            return Err(ConfigError::Invalid {
                key: "PERFORMANCE_URLS",
                reason: "at least one listing page is required".to_string(),
            });
        }

        // Цвета содержат запятые, поэтому разделитель - точка с запятой
        let ignored_colors = match lookup("IGNORED_COLORS") {
            Some(raw) => split_list(&raw, ';'),
            None => DEFAULT_IGNORED_COLORS.iter().map(|s| s.to_string()).collect(),
        }
        .into_iter()
        .map(|c| c.to_lowercase())
        .collect();

        let defaults = SiteConfig::default();

        Ok(Config {
            app: AppConfig {
                rust_log: lookup("RUST_LOG")
                    .unwrap_or_else(|| "performance_watch=info".to_string()),
            },
            telegram: TelegramConfig {
                bot_token,
                chat_ids: lookup("CHAT_IDS")
                    .map(|raw| split_list(&raw, ','))
                    .unwrap_or_default(),
                api_url: lookup("TELEGRAM_API_URL")
                    .unwrap_or_else(|| "https://api.telegram.org".to_string()),
            },
            monitor: MonitorConfig {
                performance_urls,
                ignored_colors,
                sleep_interval: Duration::from_secs(parse_or(&lookup, "SLEEP_INTERVAL_SECS", 10)?),
                min_check_interval: Duration::from_secs(parse_or(
                    &lookup,
                    "MIN_CHECK_INTERVAL_SECS",
                    5,
                )?),
                send_notifications,
            },
            page: PageTimeouts {
                navigation_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "NAVIGATION_TIMEOUT_MS",
                    60_000,
                )?),
                settle_delay: Duration::from_millis(parse_or(&lookup, "WAIT_TIMEOUT_MS", 1_000)?),
            },
            site: SiteConfig {
                event_link_marker: lookup("EVENT_LINK_MARKER").unwrap_or(defaults.event_link_marker),
                event_base_url: lookup("EVENT_BASE_URL").unwrap_or(defaults.event_base_url),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_cover_ft_org_ua() {
        let config = from_pairs(&[]).unwrap();

        assert_eq!(config.monitor.sleep_interval, Duration::from_secs(10));
        assert_eq!(config.monitor.min_check_interval, Duration::from_secs(5));
        assert_eq!(config.page.navigation_timeout, Duration::from_millis(60_000));
        assert_eq!(config.page.settle_delay, Duration::from_millis(1_000));
        assert_eq!(config.monitor.performance_urls.len(), 2);
        assert!(config.monitor.ignored_colors.contains("rgb(255, 255, 255)"));
        assert!(!config.monitor.send_notifications);
        assert!(config.telegram.chat_ids.is_empty());
    }

    #[test]
    fn chat_ids_are_split_and_trimmed() {
        let config = from_pairs(&[("CHAT_IDS", " 100, 200,,300 ")]).unwrap();
        assert_eq!(config.telegram.chat_ids, vec!["100", "200", "300"]);
    }

    #[test]
    fn ignored_colors_are_lowercased() {
        let config = from_pairs(&[("IGNORED_COLORS", "RGB(1, 2, 3); rgb(4, 5, 6)")]).unwrap();
        assert!(config.monitor.ignored_colors.contains("rgb(1, 2, 3)"));
        assert!(config.monitor.ignored_colors.contains("rgb(4, 5, 6)"));
        assert_eq!(config.monitor.ignored_colors.len(), 2);
    }

    #[test]
    fn notifications_require_bot_token() {
        let err = from_pairs(&[("SEND_NOTIFICATIONS", "true")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BOT_TOKEN")));

        let config = from_pairs(&[("SEND_NOTIFICATIONS", "true"), ("BOT_TOKEN", "abc")]).unwrap();
        assert!(config.monitor.send_notifications);
    }

    #[test]
    fn invalid_number_is_reported_with_key() {
        let err = from_pairs(&[("SLEEP_INTERVAL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SLEEP_INTERVAL_SECS", .. }));
    }

    #[test]
    fn debug_output_hides_bot_token() {
        let config = from_pairs(&[("BOT_TOKEN", "secret-token")]).unwrap();
        let rendered = format!("{:?}", config.telegram);
        assert!(!rendered.contains("secret-token"));
    }
}
