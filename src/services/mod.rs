pub mod monitor;
pub mod notifier;
pub mod scraper;
pub mod ticker;

pub use monitor::PerformanceMonitor;
pub use notifier::{Notifier, TelegramNotifier};
pub use ticker::{Clock, CycleTicker, TokioClock};
