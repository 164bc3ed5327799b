use thiserror::Error;

/// Errors from the market-data fetch path.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("No data for {0}")]
    NoData(String),
}

/// Errors from report delivery.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("Message error: {0}")]
    Message(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
