use brief_core::{QuoteSource, ReportSink};
use chrono::DateTime;
use chrono_tz::Tz;
use news_scraper::HeadlineScraper;
use report_builder::build_report;

use crate::config::BriefConfig;

/// What one scheduled run produced. A run always completes; delivery
/// failure is recorded here rather than propagated.
#[derive(Debug, Clone, Copy)]
pub struct CycleOutcome {
    pub quotes: usize,
    pub headlines: usize,
    pub delivered: bool,
}

/// One fetch → scrape → build → send run, strictly in sequence.
pub async fn run_report_cycle(
    config: &BriefConfig,
    quotes: &dyn QuoteSource,
    scraper: &HeadlineScraper,
    sink: &dyn ReportSink,
    now: DateTime<Tz>,
) -> CycleOutcome {
    let quote_rows = quotes.fetch_quotes(&config.watchlist).await;
    tracing::info!("Fetched {} quotes", quote_rows.len());

    let headline_rows = scraper.scrape_all(&config.news_sources).await;
    tracing::info!("Scraped {} headlines", headline_rows.len());

    let report = build_report(&quote_rows, &headline_rows, now);

    let delivered = match sink.deliver(&report).await {
        Ok(()) => {
            tracing::info!("Report delivered via {}", sink.name());
            true
        }
        Err(e) => {
            tracing::error!("Failed to deliver report: {}", e);
            false
        }
    };

    CycleOutcome {
        quotes: quote_rows.len(),
        headlines: headline_rows.len(),
        delivered,
    }
}
