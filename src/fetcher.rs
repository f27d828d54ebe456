// One authenticated GET per window against the remote metrics endpoint.

use std::time::Duration;

use tracing::debug;

use crate::error::{CollectError, FetchError};
use crate::models::{MetricsPayload, TimeWindow};

/// Query-parameter timestamp format: UTC, millisecond precision, `Z` suffix.
const UTC_MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub struct MetricsFetcher {
    client: reqwest::Client,
    endpoint_url: String,
}

impl MetricsFetcher {
    pub fn new(endpoint_url: impl Into<String>, timeout: Duration) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint_url: endpoint_url.into(),
        })
    }

    /// Fetches the raw payload for one window. Network failure, non-2xx status
    /// and malformed JSON all map to `FetchError`; whether that aborts
    /// anything is the caller's call (the pipeline skips the window).
    /// No retry and no caching here.
    pub async fn fetch_window(
        &self,
        window: &TimeWindow,
        token: &str,
    ) -> Result<MetricsPayload, FetchError> {
        let from = window.from_utc.format(UTC_MILLIS_FORMAT).to_string();
        let to = window.to_utc.format(UTC_MILLIS_FORMAT).to_string();
        debug!(from_datetime = %from, to_datetime = %to, "metrics API call");

        let fail = |source: reqwest::Error| FetchError {
            local_timestamp: window.local_timestamp,
            source,
        };

        let response = self
            .client
            .get(&self.endpoint_url)
            .query(&[
                ("fromDatetimeInclusive", from.as_str()),
                ("toDatetimeExclusive", to.as_str()),
            ])
            .bearer_auth(token)
            .send()
            .await
            .map_err(fail)?
            .error_for_status()
            .map_err(fail)?;

        response.json::<MetricsPayload>().await.map_err(fail)
    }
}
