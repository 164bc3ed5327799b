use anyhow::{bail, Context, Result};
use brief_core::NewsSource;
use chrono::NaiveTime;
use chrono_tz::Tz;
use report_mailer::SmtpConfig;
use std::env;

const DEFAULT_WATCHLIST: &str = "AAPL,MSFT,GOOGL,AMZN,META,TSLA";
const DEFAULT_NEWS_SOURCES: &str = "Yahoo Finance=https://finance.yahoo.com/news,\
     Bloomberg Markets=https://www.bloomberg.com/markets,\
     CNBC Markets=https://www.cnbc.com/markets/";

/// Immutable agent configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct BriefConfig {
    pub watchlist: Vec<String>,
    pub news_sources: Vec<NewsSource>,
    pub report_time: NaiveTime,
    pub report_timezone: Tz,
    pub smtp: SmtpConfig,
}

impl BriefConfig {
    pub fn from_env() -> Result<Self> {
        let sender = env::var("EMAIL_SENDER").context("EMAIL_SENDER not set")?;
        let password = env::var("EMAIL_PASSWORD").context("EMAIL_PASSWORD not set")?;
        let recipient = env::var("EMAIL_RECIPIENT").context("EMAIL_RECIPIENT not set")?;

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .context("SMTP_PORT must be a port number")?,
            username: sender.clone(),
            password,
            from: sender,
            to: recipient,
        };

        let watchlist = parse_watchlist(
            &env::var("WATCHLIST").unwrap_or_else(|_| DEFAULT_WATCHLIST.to_string()),
        );
        if watchlist.is_empty() {
            bail!("WATCHLIST must contain at least one ticker");
        }

        let news_sources = parse_news_sources(
            &env::var("NEWS_SOURCES").unwrap_or_else(|_| DEFAULT_NEWS_SOURCES.to_string()),
        );

        let report_time = parse_report_time(
            &env::var("REPORT_TIME").unwrap_or_else(|_| "08:00".to_string()),
        )?;

        let tz_name = env::var("REPORT_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let report_timezone: Tz = tz_name
            .parse()
            .map_err(|e| anyhow::anyhow!("REPORT_TIMEZONE {:?} is not an IANA zone: {}", tz_name, e))?;

        Ok(Self {
            watchlist,
            news_sources,
            report_time,
            report_timezone,
            smtp,
        })
    }
}

fn parse_watchlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_news_sources(raw: &str) -> Vec<NewsSource> {
    raw.split(',')
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            match pair.split_once('=') {
                Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => {
                    Some(NewsSource::new(name.trim(), url.trim()))
                }
                _ => {
                    tracing::warn!("Ignoring malformed news source entry {:?}", pair);
                    None
                }
            }
        })
        .collect()
}

fn parse_report_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .with_context(|| format!("REPORT_TIME {:?} is not HH:MM 24-hour", raw))
}
