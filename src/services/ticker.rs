use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// Источник времени для цикла мониторинга.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Реальные часы на таймерах tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Расписание циклов: минимальный интервал между началами и фиксированная пауза после.
pub struct CycleTicker<'a> {
    clock: &'a dyn Clock,
    min_check_interval: Duration,
    sleep_interval: Duration,
    last_start: Option<Instant>,
}

impl<'a> CycleTicker<'a> {
    pub fn new(clock: &'a dyn Clock, min_check_interval: Duration, sleep_interval: Duration) -> Self {
        Self {
            clock,
            min_check_interval,
            sleep_interval,
            last_start: None,
        }
    }

    /// Ждёт, пока с начала прошлого цикла пройдёт `min_check_interval`, и отмечает начало нового.
    pub async fn begin_cycle(&mut self) {
        if let Some(last_start) = self.last_start {
            let elapsed = self.clock.now().saturating_duration_since(last_start);
            if elapsed < self.min_check_interval {
                let remaining = self.min_check_interval - elapsed;
                debug!("Waiting {:?} before next cycle", remaining);
                self.clock.sleep(remaining).await;
            }
        }
        self.last_start = Some(self.clock.now());
    }

    pub async fn end_cycle(&self) {
        self.clock.sleep(self.sleep_interval).await;
    }
}
