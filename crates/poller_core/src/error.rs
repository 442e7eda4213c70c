use shared::error::PayloadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("invalid data url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to fetch data: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("data endpoint {url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error(transparent)]
    Payload(#[from] PayloadError),
}
