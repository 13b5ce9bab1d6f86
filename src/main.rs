use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use performance_watch::{
    browser::ChromiumBrowser,
    config::Config,
    services::{Notifier, PerformanceMonitor, TelegramNotifier},
};

// Вся работа идёт в одном потоке; параллельность - только на ожидании страниц
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(config).await {
        error!("Unexpected error: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        "Starting performance watch for {} pages",
        config.monitor.performance_urls.len()
    );

    let notifier: Arc<dyn Notifier> = Arc::new(
        TelegramNotifier::from_config(&config.telegram).context("Failed to create notifier")?,
    );

    let browser = Arc::new(
        ChromiumBrowser::launch(config.page)
            .await
            .context("Failed to launch browser")?,
    );

    let monitor = PerformanceMonitor::new(&config, browser.clone(), notifier);

    tokio::select! {
        _ = monitor.run_monitoring() => {}
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => warn!("Monitoring stopped by user."),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        },
    }

    // Монитор держит вторую ссылку на браузер
    drop(monitor);
    match Arc::try_unwrap(browser) {
        Ok(browser) => browser.shutdown().await,
        Err(_) => warn!("Browser is still referenced, leaving it to process exit"),
    }

    Ok(())
}
