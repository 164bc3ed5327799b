use std::time::Duration;

use brief_core::{HeadlineRecord, NewsSource};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Headline scraper errors.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

/// How to pull headlines out of one provider's markup.
///
/// Extraction is data, not code: a provider is supported by registering
/// a rule, not by adding a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRule {
    /// CSS selector matching the headline anchor elements.
    pub selector: String,
    /// Upper bound on headlines taken from one page.
    pub max_items: usize,
    /// Attribute holding the article link, usually `href`.
    pub link_attr: String,
}

/// Registry mapping a URL-host fragment to its extraction rule.
#[derive(Debug, Clone, Default)]
pub struct SourceRules {
    rules: Vec<(String, ExtractRule)>,
}

impl SourceRules {
    /// The rules shipped by default: Yahoo Finance only. Other configured
    /// sources yield no headlines until a rule is registered for them.
    pub fn builtin() -> Self {
        Self::default().with_rule(
            "finance.yahoo.com",
            ExtractRule {
                selector: "h3 a".to_string(),
                max_items: 5,
                link_attr: "href".to_string(),
            },
        )
    }

    pub fn with_rule(mut self, host: impl Into<String>, rule: ExtractRule) -> Self {
        self.rules.push((host.into().to_lowercase(), rule));
        self
    }

    pub fn rule_for(&self, url: &str) -> Option<&ExtractRule> {
        let url = url.to_lowercase();
        self.rules
            .iter()
            .find(|(host, _)| url.contains(host))
            .map(|(_, rule)| rule)
    }
}

/// Fetches configured news pages and extracts headline/link pairs.
pub struct HeadlineScraper {
    client: Client,
    rules: SourceRules,
}

impl HeadlineScraper {
    pub fn new() -> Self {
        Self::with_rules(SourceRules::builtin())
    }

    pub fn with_rules(rules: SourceRules) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, rules }
    }

    /// Scrape a single source.
    ///
    /// A source without a registered rule is not an error; it yields an
    /// empty list, preserving the configured-but-unextracted behavior.
    pub async fn scrape_source(
        &self,
        source: &NewsSource,
    ) -> Result<Vec<HeadlineRecord>, ScrapeError> {
        let Some(rule) = self.rules.rule_for(&source.url) else {
            tracing::debug!("No extraction rule for {}, skipping", source.name);
            return Ok(Vec::new());
        };

        let response = self.client.get(&source.url).send().await?;

        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                status: response.status().as_u16(),
                url: source.url.clone(),
            });
        }

        let html = response.text().await?;
        Ok(extract_headlines(&html, source, rule))
    }

    /// Scrape every source in configured order, flattening the results.
    /// A failing source is logged and skipped; the rest still contribute.
    pub async fn scrape_all(&self, sources: &[NewsSource]) -> Vec<HeadlineRecord> {
        let mut items = Vec::new();

        for source in sources {
            match self.scrape_source(source).await {
                Ok(found) => {
                    tracing::debug!("{}: {} headlines", source.name, found.len());
                    items.extend(found);
                }
                Err(e) => {
                    tracing::warn!("Error scraping {}: {}", source.name, e);
                }
            }
        }

        items
    }
}

impl Default for HeadlineScraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply an extraction rule to a fetched page.
pub fn extract_headlines(
    html: &str,
    source: &NewsSource,
    rule: &ExtractRule,
) -> Vec<HeadlineRecord> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse(&rule.selector) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid selector {:?} for {}: {}", rule.selector, source.name, e);
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for anchor in document.select(&selector).take(rule.max_items) {
        let headline = anchor
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if headline.is_empty() {
            continue;
        }

        let link = anchor
            .value()
            .attr(&rule.link_attr)
            .map(str::to_string)
            .unwrap_or_else(|| source.url.clone());

        records.push(HeadlineRecord {
            source: source.name.clone(),
            headline,
            link,
        });
    }

    records
}
