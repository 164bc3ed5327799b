use serde::{Deserialize, Serialize};

/// Sentinel rendered for a ticker whose session data could not be obtained.
pub const UNAVAILABLE: &str = "N/A";

/// One row of the stock price table: display-formatted price and
/// percent change from open, or the `"N/A"` sentinel in both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub ticker: String,
    pub price: String,
    pub change: String,
}

impl QuoteRecord {
    /// Build a record from a session's open and close prices.
    ///
    /// A zero open price cannot produce a percent change and yields the
    /// sentinel record instead.
    pub fn from_session(ticker: impl Into<String>, open: f64, close: f64) -> Self {
        let ticker = ticker.into();
        if open == 0.0 {
            return Self::unavailable(ticker);
        }
        Self {
            ticker,
            price: format!("${:.2}", close),
            change: format!("{:.2}%", (close - open) / open * 100.0),
        }
    }

    /// The sentinel record for a ticker with no usable session data.
    pub fn unavailable(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            price: UNAVAILABLE.to_string(),
            change: UNAVAILABLE.to_string(),
        }
    }
}

/// A configured news provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub name: String,
    pub url: String,
}

impl NewsSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One scraped headline, tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineRecord {
    pub source: String,
    pub headline: String,
    pub link: String,
}

/// A named file attached to the outgoing report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// The assembled report, ready for delivery. Never mutated after
/// construction; ownership ends at the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}
