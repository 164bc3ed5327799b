use std::time::Duration;

use anyhow::Result;
use news_scraper::HeadlineScraper;
use report_mailer::ReportMailer;
use tokio::signal::unix::SignalKind;
use tokio::time::{self, MissedTickBehavior};
use yahoo_client::YahooClient;

mod config;
mod pipeline;
mod schedule;

use config::BriefConfig;
use pipeline::run_report_cycle;
use schedule::{Clock, DailySchedule, SystemClock};

/// Wall-clock poll cadence for the daily trigger.
const POLL_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, init tracing
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    tracing::info!("Starting MarketBrief daily report agent");

    // 2. Load configuration
    let config = BriefConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Watchlist: {} symbols", config.watchlist.len());
    tracing::info!("  News sources: {}", config.news_sources.len());
    tracing::info!(
        "  Report time: {} {}",
        config.report_time.format("%H:%M"),
        config.report_timezone
    );
    tracing::info!("  SMTP relay: {}:{}", config.smtp.host, config.smtp.port);

    // 3. Build pipeline components
    let quotes = YahooClient::new();
    let scraper = HeadlineScraper::new();
    let mailer = ReportMailer::new(&config.smtp)
        .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?;
    tracing::info!("Mailer ready ({} -> {})", config.smtp.from, config.smtp.to);

    // 4. Register the daily trigger
    let clock = SystemClock;
    let mut schedule = DailySchedule::new(
        config.report_time,
        config.report_timezone,
        clock.now_utc(),
    );
    tracing::info!(
        "Reports will be sent daily at {} {}. Press Ctrl+C to stop.",
        config.report_time.format("%H:%M"),
        config.report_timezone
    );

    // Main loop with graceful shutdown (SIGINT + SIGTERM)
    let mut interval = time::interval(Duration::from_secs(POLL_INTERVAL_SECS));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;
    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = clock.now_utc();
                if schedule.due(now) {
                    tracing::info!("Report trigger reached, starting run");
                    let outcome = run_report_cycle(
                        &config,
                        &quotes,
                        &scraper,
                        &mailer,
                        now.with_timezone(&config.report_timezone),
                    )
                    .await;
                    tracing::info!(
                        "Run complete — {} quotes, {} headlines, delivered: {}",
                        outcome.quotes,
                        outcome.headlines,
                        outcome.delivered
                    );
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, exiting gracefully...");
                break;
            }
        }
    }

    tracing::info!("MarketBrief agent shut down.");
    Ok(())
}
