// Error taxonomy for the collection pipeline.
// Window-level fetch failures are a separate type: the pipeline absorbs them
// and only the run summary reflects them.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// One failed window fetch (network failure, non-2xx status, malformed JSON).
/// Non-fatal to a run: the pipeline logs it and the window contributes zero
/// records.
#[derive(Debug, Error)]
#[error("fetch failed for window at local {local_timestamp}: {source}")]
pub struct FetchError {
    pub local_timestamp: NaiveDateTime,
    #[source]
    pub source: reqwest::Error,
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("no API token found; create token.json or set API_TOKEN")]
    MissingToken,

    #[error("API token expired at {expired_at}")]
    ExpiredToken { expired_at: NaiveDateTime },

    #[error("hourly dataset not found: {}", .path.display())]
    DatasetNotFound { path: PathBuf },

    #[error("hourly dataset has no rows: {}", .path.display())]
    EmptyDataset { path: PathBuf },

    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
