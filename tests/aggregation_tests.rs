// Daily rollup tests: grouping, sums vs means, determinism, dataset errors

use chrono::NaiveDate;
use flowmetrics::aggregation::{aggregate_daily, run_daily_aggregation};
use flowmetrics::dataset_repo::DatasetRepo;
use flowmetrics::error::CollectError;
use flowmetrics::models::FlowMetricRecord;
use tempfile::TempDir;

const STAMP: &str = "2024-01-02T08:00:00.000000";

fn row(date: &str, flow_id: &str, hour: u32, total: i64, avg_response: f64) -> FlowMetricRecord {
    FlowMetricRecord {
        datetime: format!("{date} {hour:02}:00:00"),
        date: date.into(),
        hour,
        collection_timestamp: STAMP.into(),
        flow_id: flow_id.into(),
        flow_name: format!("{flow_id} name"),
        flow_state: "started".into(),
        total_exchanges: total,
        successful_exchanges: total - 1,
        failed_exchanges: 1,
        inflight_exchanges: 2,
        avg_response_time_ms: avg_response,
        avg_processing_time_ms: avg_response / 2.0,
    }
}

#[test]
fn empty_input_yields_no_groups() {
    assert!(aggregate_daily(&[], STAMP).is_empty());
}

#[test]
fn two_hours_of_one_flow_sum_counters_and_average_gauges() {
    let rows = vec![
        row("2024-01-01", "F1", 0, 10, 100.0),
        row("2024-01-01", "F1", 1, 20, 200.0),
    ];
    let daily = aggregate_daily(&rows, STAMP);
    assert_eq!(daily.len(), 1);
    let d = &daily[0];
    assert_eq!(d.date, "2024-01-01");
    assert_eq!(d.flow_id, "F1");
    assert_eq!(d.collection_timestamp, STAMP);
    assert_eq!(d.total_exchanges, 30);
    assert_eq!(d.successful_exchanges, 28);
    assert_eq!(d.failed_exchanges, 2);
    assert_eq!(d.inflight_exchanges, 2.0);
    assert_eq!(d.avg_response_time_ms, 150.0);
    assert_eq!(d.avg_processing_time_ms, 75.0);
}

#[test]
fn groups_split_by_date_and_flow() {
    let rows = vec![
        row("2024-01-01", "F1", 0, 10, 100.0),
        row("2024-01-01", "F2", 0, 5, 50.0),
        row("2024-01-02", "F1", 0, 7, 70.0),
    ];
    let daily = aggregate_daily(&rows, STAMP);
    assert_eq!(daily.len(), 3);
    // BTreeMap key order: by date, then flow id
    assert_eq!((daily[0].date.as_str(), daily[0].flow_id.as_str()), ("2024-01-01", "F1"));
    assert_eq!((daily[1].date.as_str(), daily[1].flow_id.as_str()), ("2024-01-01", "F2"));
    assert_eq!((daily[2].date.as_str(), daily[2].flow_id.as_str()), ("2024-01-02", "F1"));
}

#[test]
fn flow_state_is_part_of_the_group_key() {
    let mut started = row("2024-01-01", "F1", 0, 10, 100.0);
    let mut stopped = row("2024-01-01", "F1", 1, 20, 200.0);
    started.flow_state = "started".into();
    stopped.flow_state = "stopped".into();

    let daily = aggregate_daily(&[started, stopped], STAMP);
    assert_eq!(daily.len(), 2);
}

#[test]
fn aggregation_is_a_pure_function_of_its_input() {
    let rows = vec![
        row("2024-01-01", "F2", 0, 10, 100.0),
        row("2024-01-01", "F1", 0, 5, 50.0),
        row("2024-01-01", "F1", 1, 5, 150.0),
    ];
    assert_eq!(aggregate_daily(&rows, STAMP), aggregate_daily(&rows, STAMP));
}

#[test]
fn run_writes_daily_file_and_is_idempotent_on_replace() {
    let dir = TempDir::new().unwrap();
    let repo = DatasetRepo::new(dir.path());
    let run_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    repo.append_hourly(
        run_date,
        &[
            row("2024-01-01", "F1", 0, 10, 100.0),
            row("2024-01-01", "F1", 1, 20, 200.0),
        ],
    )
    .unwrap();

    let daily_path = run_daily_aggregation(&repo, run_date, STAMP).unwrap();
    let first = std::fs::read(&daily_path).unwrap();

    // Unchanged hourly input and stamp: byte-identical daily output
    let daily_path = run_daily_aggregation(&repo, run_date, STAMP).unwrap();
    let second = std::fs::read(&daily_path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn run_on_missing_dataset_is_dataset_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = DatasetRepo::new(dir.path());
    let run_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let err = run_daily_aggregation(&repo, run_date, STAMP).unwrap_err();
    assert!(matches!(err, CollectError::DatasetNotFound { .. }));
}

#[test]
fn run_on_header_only_dataset_is_empty_dataset_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let repo = DatasetRepo::new(dir.path());
    let run_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    // A dataset file that exists but holds zero rows
    std::fs::write(
        repo.hourly_path(run_date),
        "datetime,date,hour,collection_timestamp,flow_id,flow_name,flow_state,total_exchanges,successful_exchanges,failed_exchanges,inflight_exchanges,avg_response_time_ms,avg_processing_time_ms\n",
    )
    .unwrap();

    let err = run_daily_aggregation(&repo, run_date, STAMP).unwrap_err();
    assert!(matches!(err, CollectError::EmptyDataset { .. }));
    assert!(!repo.daily_path(run_date).exists());
}
