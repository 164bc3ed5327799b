use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::types::{QuoteRecord, Report};

/// Source of session quotes for a watchlist.
///
/// Implementations return exactly one record per requested ticker, in
/// request order; a ticker whose data cannot be obtained becomes the
/// sentinel record rather than an error.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quotes(&self, tickers: &[String]) -> Vec<QuoteRecord>;
}

/// Destination a built report is handed to.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &Report) -> Result<(), DeliveryError>;
    fn name(&self) -> &str;
}
