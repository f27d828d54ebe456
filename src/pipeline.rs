// Collection pipeline: windows -> fetch -> flatten -> append, then one daily
// aggregation pass over the run's hourly dataset. A failed window fetch is
// counted and skipped; the run only aborts on a missing/expired token or an
// invalid range, both checked before any network activity.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::aggregation;
use crate::config::AppConfig;
use crate::dataset_repo::DatasetRepo;
use crate::error::CollectError;
use crate::fetcher::MetricsFetcher;
use crate::flatten::flatten_window;
use crate::token::ApiToken;
use crate::windows::hourly_windows;

/// Outcome counters of one run. `windows_succeeded < windows_total` means
/// partial data: skipped windows contributed zero rows, and a caller can see
/// that without reading the dataset.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_date: NaiveDate,
    pub windows_total: usize,
    pub windows_succeeded: usize,
    pub records_written: usize,
    pub hourly_dataset: PathBuf,
    pub daily_dataset: Option<PathBuf>,
}

pub struct PipelineConfig {
    pub endpoint_url: String,
    pub request_timeout: Duration,
    pub request_delay: Duration,
    pub timezone_offset_hours: i32,
}

impl PipelineConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            endpoint_url: config.api.endpoint_url.clone(),
            request_timeout: Duration::from_secs(config.api.request_timeout_secs),
            request_delay: Duration::from_millis(config.api.request_delay_ms),
            timezone_offset_hours: config.collection.timezone_offset_hours,
        }
    }
}

pub struct CollectionPipeline {
    fetcher: MetricsFetcher,
    repo: DatasetRepo,
    request_delay: Duration,
    timezone_offset_hours: i32,
}

impl CollectionPipeline {
    pub fn new(config: PipelineConfig, repo: DatasetRepo) -> Result<Self, CollectError> {
        let fetcher = MetricsFetcher::new(config.endpoint_url, config.request_timeout)?;
        Ok(Self {
            fetcher,
            repo,
            request_delay: config.request_delay,
            timezone_offset_hours: config.timezone_offset_hours,
        })
    }

    /// Runs one collection over local dates `[start, end]`. `shutdown_rx`
    /// aborts at the next window boundary; rows already appended stay valid
    /// and the aggregation pass still runs over them.
    pub async fn run(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        token: &ApiToken,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> Result<RunSummary, CollectError> {
        token.ensure_valid(Local::now().naive_local())?;
        let windows = hourly_windows(start, end, self.timezone_offset_hours)?;

        let run_date = Local::now().date_naive();
        let hourly_dataset = self.repo.hourly_path(run_date);
        info!(
            start = %start,
            end = %end,
            windows_total = windows.len(),
            hourly_dataset = %hourly_dataset.display(),
            "collection run starting"
        );

        let mut windows_succeeded = 0usize;
        let mut records_written = 0usize;
        let mut aborted = false;

        for (i, window) in windows.iter().enumerate() {
            match shutdown_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => {
                    info!(
                        processed = i,
                        total = windows.len(),
                        "shutdown requested; stopping at window boundary"
                    );
                    aborted = true;
                    break;
                }
            }

            debug!(
                window = i + 1,
                total = windows.len(),
                local = %window.local_timestamp,
                from_utc = %window.from_utc,
                to_utc = %window.to_utc,
                "fetching window"
            );

            match self.fetcher.fetch_window(window, &token.token).await {
                Ok(payload) => {
                    let stamp = collection_timestamp();
                    let records = flatten_window(window, payload, &stamp);
                    self.repo.append_hourly(run_date, &records)?;
                    windows_succeeded += 1;
                    records_written += records.len();
                }
                Err(e) => {
                    warn!(error = %e, "window fetch failed; skipping");
                }
            }

            // Pace between requests; no delay after the last one.
            if i + 1 < windows.len() {
                tokio::select! {
                    _ = tokio::time::sleep(self.request_delay) => {}
                    _ = &mut shutdown_rx => {
                        info!(
                            processed = i + 1,
                            total = windows.len(),
                            "shutdown requested; stopping at window boundary"
                        );
                        aborted = true;
                    }
                }
                if aborted {
                    break;
                }
            }
        }

        let daily_dataset = match aggregation::run_daily_aggregation(
            &self.repo,
            run_date,
            &collection_timestamp(),
        ) {
            Ok(path) => Some(path),
            Err(CollectError::EmptyDataset { path }) => {
                warn!(path = %path.display(), "no hourly rows to aggregate");
                None
            }
            Err(CollectError::DatasetNotFound { path }) => {
                warn!(path = %path.display(), "hourly dataset missing; no daily rollup");
                None
            }
            Err(e) => return Err(e),
        };

        let summary = RunSummary {
            run_date,
            windows_total: windows.len(),
            windows_succeeded,
            records_written,
            hourly_dataset,
            daily_dataset,
        };
        info!(
            windows_succeeded = summary.windows_succeeded,
            windows_total = summary.windows_total,
            records_written = summary.records_written,
            aborted,
            "collection run finished"
        );
        Ok(summary)
    }
}

/// Local wall-clock stamp recorded on every row written by a run.
fn collection_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
