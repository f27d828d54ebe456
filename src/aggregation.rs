// Daily rollup: group hourly rows by (date, flow), sum counters, average
// gauges. Pure aggregation logic here; file access stays in dataset_repo.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::dataset_repo::DatasetRepo;
use crate::error::CollectError;
use crate::models::{DailyAggregate, FlowMetricRecord};

/// Groups rows by (date, flow_id, flow_name, flow_state) and computes the
/// rollup: sums over exchange counters, arithmetic means over inflight and
/// latency fields (mean of hourly means). Output order follows the sorted
/// group key, so the same input always produces identical output.
pub fn aggregate_daily(
    rows: &[FlowMetricRecord],
    collection_timestamp: &str,
) -> Vec<DailyAggregate> {
    let mut groups: BTreeMap<(&str, &str, &str, &str), Vec<&FlowMetricRecord>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((
                row.date.as_str(),
                row.flow_id.as_str(),
                row.flow_name.as_str(),
                row.flow_state.as_str(),
            ))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((date, flow_id, flow_name, flow_state), rows)| DailyAggregate {
            date: date.to_string(),
            collection_timestamp: collection_timestamp.to_string(),
            flow_id: flow_id.to_string(),
            flow_name: flow_name.to_string(),
            flow_state: flow_state.to_string(),
            total_exchanges: rows.iter().map(|r| r.total_exchanges).sum(),
            successful_exchanges: rows.iter().map(|r| r.successful_exchanges).sum(),
            failed_exchanges: rows.iter().map(|r| r.failed_exchanges).sum(),
            inflight_exchanges: mean(
                &rows.iter().map(|r| r.inflight_exchanges as f64).collect::<Vec<_>>(),
            ),
            avg_response_time_ms: mean(
                &rows.iter().map(|r| r.avg_response_time_ms).collect::<Vec<_>>(),
            ),
            avg_processing_time_ms: mean(
                &rows.iter().map(|r| r.avg_processing_time_ms).collect::<Vec<_>>(),
            ),
        })
        .collect()
}

/// Reads the full hourly dataset for `run_date`, recomputes the daily rollup
/// and replaces the daily dataset. Zero hourly rows fail with `EmptyDataset`
/// and produce no daily file.
#[instrument(skip(repo, collection_timestamp), fields(operation = "daily_aggregation"))]
pub fn run_daily_aggregation(
    repo: &DatasetRepo,
    run_date: NaiveDate,
    collection_timestamp: &str,
) -> Result<PathBuf, CollectError> {
    let rows = repo.read_hourly(run_date)?;
    if rows.is_empty() {
        return Err(CollectError::EmptyDataset {
            path: repo.hourly_path(run_date),
        });
    }
    let daily = aggregate_daily(&rows, collection_timestamp);
    repo.write_daily(run_date, &daily)?;
    info!(
        hourly_rows = rows.len(),
        daily_rows = daily.len(),
        "daily rollup complete"
    );
    Ok(repo.daily_path(run_date))
}

fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / (v.len() as f64)
}
