use thiserror::Error;
pub type Result<T> = std::result::Result<T, GoogleError>;

#[derive(Error, Debug)]
pub enum GoogleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("No API key provided; set one with GoogleGeocoder::builder(key)")]
    MissingApiKey,
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
