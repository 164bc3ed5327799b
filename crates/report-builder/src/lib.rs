use std::fmt;

use brief_core::{Attachment, HeadlineRecord, QuoteRecord, Report};
use chrono::{DateTime, TimeZone};

pub const STOCKS_CSV_FILENAME: &str = "stock_prices.csv";
pub const NEWS_CSV_FILENAME: &str = "financial_news.csv";

const QUOTE_HEADERS: [&str; 3] = ["Ticker", "Price", "Change"];
const HEADLINE_HEADERS: [&str; 3] = ["Source", "Headline", "Link"];

/// Assemble the daily report from already-fetched collections.
///
/// Pure transformation: the timestamp is a parameter, identical inputs
/// produce identical output, and any input (including empty collections
/// or all-sentinel quotes) produces a valid report.
pub fn build_report<Tz>(
    quotes: &[QuoteRecord],
    headlines: &[HeadlineRecord],
    now: DateTime<Tz>,
) -> Report
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let subject = format!("Daily Financial Report - {}", now.format("%Y-%m-%d"));

    Report {
        subject,
        html_body: render_html(quotes, headlines, &now),
        attachments: vec![
            Attachment {
                filename: STOCKS_CSV_FILENAME.to_string(),
                content: quotes_csv(quotes),
            },
            Attachment {
                filename: NEWS_CSV_FILENAME.to_string(),
                content: headlines_csv(headlines),
            },
        ],
    }
}

fn render_html<Tz>(quotes: &[QuoteRecord], headlines: &[HeadlineRecord], now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let quote_rows: Vec<[String; 3]> = quotes
        .iter()
        .map(|q| [escape(&q.ticker), escape(&q.price), escape(&q.change)])
        .collect();

    let headline_rows: Vec<[String; 3]> = headlines
        .iter()
        .map(|h| {
            let link = escape(&h.link);
            [
                escape(&h.source),
                escape(&h.headline),
                format!(r#"<a href="{link}" style="color:#3b82f6;">{link}</a>"#),
            ]
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1"></head>
<body style="margin:0;padding:24px;background:#f1f5f9;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;color:#1e293b;">
<h1 style="font-size:22px;margin:0 0 4px;">Daily Financial Report</h1>
<h2 style="font-size:16px;color:#64748b;margin:16px 0 8px;">Stock Prices as of {stamp}</h2>
{quote_table}
<h2 style="font-size:16px;color:#64748b;margin:24px 0 8px;">Top Financial News</h2>
{headline_table}
<p style="color:#94a3b8;font-size:12px;margin-top:24px;">Report generated automatically.</p>
</body>
</html>"#,
        stamp = now.format("%Y-%m-%d %H:%M"),
        quote_table = render_table(&QUOTE_HEADERS, &quote_rows, "No quote data available"),
        headline_table = render_table(&HEADLINE_HEADERS, &headline_rows, "No headlines available"),
    )
}

/// Render one table; `rows` cells are already escaped/rendered HTML.
fn render_table(headers: &[&str; 3], rows: &[[String; 3]], empty_note: &str) -> String {
    let header_cells: String = headers
        .iter()
        .map(|h| format!(r#"<th style="padding:8px 12px;text-align:left;color:#94a3b8;border-bottom:1px solid #e2e8f0;">{h}</th>"#))
        .collect();

    let body: String = if rows.is_empty() {
        format!(
            r#"<tr><td colspan="{}" style="padding:8px 12px;color:#94a3b8;">{}</td></tr>"#,
            headers.len(),
            escape(empty_note)
        )
    } else {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let zebra = if i % 2 == 1 {
                    r#" style="background:#f8fafc;""#
                } else {
                    ""
                };
                let cells: String = row
                    .iter()
                    .map(|cell| format!(r#"<td style="padding:8px 12px;">{cell}</td>"#))
                    .collect();
                format!("<tr{zebra}>{cells}</tr>")
            })
            .collect()
    };

    format!(
        r#"<table style="width:100%;max-width:640px;border-collapse:collapse;background:#ffffff;border-radius:8px;overflow:hidden;">
<tr>{header_cells}</tr>
{body}
</table>"#
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn quotes_csv(quotes: &[QuoteRecord]) -> Vec<u8> {
    csv_bytes(
        &QUOTE_HEADERS,
        quotes
            .iter()
            .map(|q| [q.ticker.clone(), q.price.clone(), q.change.clone()]),
    )
}

fn headlines_csv(headlines: &[HeadlineRecord]) -> Vec<u8> {
    csv_bytes(
        &HEADLINE_HEADERS,
        headlines
            .iter()
            .map(|h| [h.source.clone(), h.headline.clone(), h.link.clone()]),
    )
}

fn csv_bytes(headers: &[&str; 3], rows: impl Iterator<Item = [String; 3]>) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // Writing into a Vec<u8> cannot hit an I/O error
    writer
        .write_record(headers)
        .and_then(|_| {
            for row in rows {
                writer.write_record(&row)?;
            }
            Ok(())
        })
        .expect("CSV write to in-memory buffer");

    writer.into_inner().expect("CSV buffer recovery")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 8, 0, 0).single().expect("valid timestamp")
    }

    fn sample_quotes() -> Vec<QuoteRecord> {
        vec![
            QuoteRecord::from_session("AAPL", 150.0, 153.0),
            QuoteRecord::unavailable("MSFT"),
        ]
    }

    fn sample_headlines() -> Vec<HeadlineRecord> {
        vec![HeadlineRecord {
            source: "Yahoo Finance".to_string(),
            headline: "Markets rise & fall".to_string(),
            link: "https://finance.yahoo.com/news/item".to_string(),
        }]
    }

    #[test]
    fn test_subject_contains_date() {
        let report = build_report(&sample_quotes(), &sample_headlines(), fixed_now());
        assert_eq!(report.subject, "Daily Financial Report - 2025-03-07");
    }

    #[test]
    fn test_body_contains_tables_and_note() {
        let report = build_report(&sample_quotes(), &sample_headlines(), fixed_now());

        assert!(report.html_body.contains("Stock Prices as of 2025-03-07 08:00"));
        assert!(report.html_body.contains("AAPL"));
        assert!(report.html_body.contains("$153.00"));
        assert!(report.html_body.contains("N/A"));
        assert!(report.html_body.contains("Top Financial News"));
        assert!(report.html_body.contains("Markets rise &amp; fall"));
        assert!(report.html_body.contains("Report generated automatically."));
    }

    #[test]
    fn test_build_is_deterministic() {
        let quotes = sample_quotes();
        let headlines = sample_headlines();

        let first = build_report(&quotes, &headlines, fixed_now());
        let second = build_report(&quotes, &headlines, fixed_now());

        assert_eq!(first.html_body, second.html_body);
        assert_eq!(first.attachments, second.attachments);
    }

    #[test]
    fn test_attachment_names_are_deterministic() {
        let report = build_report(&[], &[], fixed_now());

        assert_eq!(report.attachments.len(), 2);
        assert_eq!(report.attachments[0].filename, "stock_prices.csv");
        assert_eq!(report.attachments[1].filename, "financial_news.csv");
    }

    #[test]
    fn test_empty_inputs_still_build() {
        let report = build_report(&[], &[], fixed_now());

        assert!(report.html_body.contains("No quote data available"));
        assert!(report.html_body.contains("No headlines available"));

        let stocks = String::from_utf8(report.attachments[0].content.clone()).expect("utf8");
        assert_eq!(stocks.trim(), "Ticker,Price,Change");
    }

    #[test]
    fn test_quote_csv_round_trip() {
        let quotes = sample_quotes();
        let report = build_report(&quotes, &[], fixed_now());

        let mut reader = csv::Reader::from_reader(report.attachments[0].content.as_slice());
        assert_eq!(
            reader.headers().expect("headers"),
            &csv::StringRecord::from(vec!["Ticker", "Price", "Change"])
        );

        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().expect("rows");
        assert_eq!(rows.len(), quotes.len());
        for (row, quote) in rows.iter().zip(&quotes) {
            assert_eq!(row.get(0), Some(quote.ticker.as_str()));
            assert_eq!(row.get(1), Some(quote.price.as_str()));
            assert_eq!(row.get(2), Some(quote.change.as_str()));
        }
    }

    #[test]
    fn test_headline_csv_round_trip_with_commas() {
        let headlines = vec![HeadlineRecord {
            source: "Yahoo Finance".to_string(),
            headline: "Stocks, bonds, and the \"dollar\" slide".to_string(),
            link: "https://finance.yahoo.com/news/slide".to_string(),
        }];
        let report = build_report(&[], &headlines, fixed_now());

        let mut reader = csv::Reader::from_reader(report.attachments[1].content.as_slice());
        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().expect("rows");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(1), Some(headlines[0].headline.as_str()));
        assert_eq!(rows[0].get(2), Some(headlines[0].link.as_str()));
    }

    #[test]
    fn test_html_is_escaped() {
        let headlines = vec![HeadlineRecord {
            source: "Yahoo Finance".to_string(),
            headline: "<script>alert('x')</script>".to_string(),
            link: "https://finance.yahoo.com/a?b=1&c=2".to_string(),
        }];
        let report = build_report(&[], &headlines, fixed_now());

        assert!(!report.html_body.contains("<script>"));
        assert!(report.html_body.contains("&lt;script&gt;"));
        assert!(report.html_body.contains("b=1&amp;c=2"));
    }

    #[test]
    fn test_timezone_aware_timestamp() {
        let now = fixed_now().with_timezone(&chrono_tz::US::Eastern);
        let report = build_report(&[], &[], now);

        // 08:00 UTC on 2025-03-07 is 03:00 Eastern
        assert!(report.html_body.contains("Stock Prices as of 2025-03-07 03:00"));
        assert_eq!(report.subject, "Daily Financial Report - 2025-03-07");
    }
}
