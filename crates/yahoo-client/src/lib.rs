use std::time::Duration;

use async_trait::async_trait;
use brief_core::{FetchError, QuoteRecord, QuoteSource};
use reqwest::Client;
use serde::Deserialize;

const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Open and close of the most recent trading session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
    pub open: f64,
    pub close: f64,
}

/// Client for Yahoo Finance's v8 chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Self {
        // Yahoo rejects requests without a browser-looking user agent
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Fetch the latest session's open/close for one symbol.
    pub async fn daily_bar(&self, symbol: &str) -> Result<DailyBar, FetchError> {
        let url = format!("{}/v8/finance/chart/{}", BASE_URL, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Api(e.to_string()))?;

        bar_from_chart(&chart, symbol)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for YahooClient {
    async fn fetch_quotes(&self, tickers: &[String]) -> Vec<QuoteRecord> {
        let mut records = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            match self.daily_bar(ticker).await {
                Ok(bar) => records.push(QuoteRecord::from_session(ticker, bar.open, bar.close)),
                Err(e) => {
                    tracing::warn!("Quote fetch failed for {}: {}", ticker, e);
                    records.push(QuoteRecord::unavailable(ticker));
                }
            }
        }

        records
    }
}

/// Pull the session bar out of the chart envelope.
///
/// Yahoo pads the `open`/`close` arrays with nulls for timestamps the
/// session has not reached yet; the last non-null entry is current.
fn bar_from_chart(response: &ChartResponse, symbol: &str) -> Result<DailyBar, FetchError> {
    if let Some(error) = &response.chart.error {
        return Err(FetchError::Api(error.to_string()));
    }

    let quote = response
        .chart
        .result
        .as_deref()
        .and_then(|results| results.first())
        .and_then(|result| result.indicators.quote.first())
        .ok_or_else(|| FetchError::NoData(symbol.to_string()))?;

    let open = last_value(quote.open.as_deref());
    let close = last_value(quote.close.as_deref());

    match (open, close) {
        (Some(open), Some(close)) => Ok(DailyBar { open, close }),
        _ => Err(FetchError::NoData(symbol.to_string())),
    }
}

fn last_value(series: Option<&[Option<f64>]>) -> Option<f64> {
    series?.iter().rev().find_map(|v| *v)
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteBlock {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_json(body: &str) -> ChartResponse {
        serde_json::from_str(body).expect("fixture parses")
    }

    #[test]
    fn test_bar_from_chart_takes_last_non_null() {
        let chart = chart_json(
            r#"{"chart":{"result":[{"indicators":{"quote":[
                {"open":[150.0,null],"close":[151.5,153.0]}
            ]}}],"error":null}}"#,
        );

        let bar = bar_from_chart(&chart, "AAPL").expect("bar");
        assert_eq!(bar.open, 150.0);
        assert_eq!(bar.close, 153.0);
    }

    #[test]
    fn test_bar_from_chart_api_error() {
        let chart = chart_json(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
        );

        assert!(matches!(
            bar_from_chart(&chart, "NOPE"),
            Err(FetchError::Api(_))
        ));
    }

    #[test]
    fn test_bar_from_chart_empty_result() {
        let chart = chart_json(r#"{"chart":{"result":[],"error":null}}"#);

        assert!(matches!(
            bar_from_chart(&chart, "AAPL"),
            Err(FetchError::NoData(_))
        ));
    }

    #[test]
    fn test_bar_from_chart_all_null_series() {
        let chart = chart_json(
            r#"{"chart":{"result":[{"indicators":{"quote":[
                {"open":[null,null],"close":[null,null]}
            ]}}],"error":null}}"#,
        );

        assert!(matches!(
            bar_from_chart(&chart, "AAPL"),
            Err(FetchError::NoData(_))
        ));
    }

    #[test]
    fn test_bar_from_chart_missing_series() {
        let chart = chart_json(
            r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#,
        );

        assert!(matches!(
            bar_from_chart(&chart, "AAPL"),
            Err(FetchError::NoData(_))
        ));
    }

    #[tokio::test]
    #[ignore] // hits the live Yahoo API
    async fn test_fetch_aapl_live() {
        let client = YahooClient::new();
        let bar = client.daily_bar("AAPL").await.expect("live bar");
        assert!(bar.close > 0.0);
    }
}
