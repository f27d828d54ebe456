// CSV dataset persistence: append-only hourly history, rewritten daily rollup.
// Files are keyed by the date the RUN executed, not the date of the data, so
// re-collecting an overlapping range on the same day appends duplicate rows.
// Whether dataset identity should instead be per day of data (upsert by
// window) is an open question; the observed append-per-run behavior is kept.
// Single-writer assumption: concurrent runs against one run-date file are not
// safe and must be serialized by the caller.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::error::CollectError;
use crate::models::{DailyAggregate, FlowMetricRecord};

pub struct DatasetRepo {
    data_dir: PathBuf,
}

impl DatasetRepo {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Hourly dataset file for a run date: `{date}_flow_metrics_hourly.csv`.
    pub fn hourly_path(&self, run_date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}_flow_metrics_hourly.csv", run_date.format("%Y-%m-%d")))
    }

    /// Daily dataset file for a run date: `{date}_flow_metrics_daily.csv`.
    pub fn daily_path(&self, run_date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}_flow_metrics_daily.csv", run_date.format("%Y-%m-%d")))
    }

    /// Appends one record batch. Creates the data dir and the file with its
    /// column header on first write; later batches append rows only, so the
    /// header appears exactly once. The writer is flushed before returning:
    /// a crash between batches loses nothing already appended. Rows are never
    /// deduplicated here.
    #[instrument(skip(self, records), fields(repo = "dataset", operation = "append_hourly", record_count = records.len()))]
    pub fn append_hourly(
        &self,
        run_date: NaiveDate,
        records: &[FlowMetricRecord],
    ) -> Result<(), CollectError> {
        if records.is_empty() {
            return Ok(());
        }
        let path = self.hourly_path(run_date);
        let write_header = !path.exists();
        self.ensure_data_dir()?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), "hourly rows appended");
        Ok(())
    }

    /// Full ordered row sequence of the hourly dataset.
    pub fn read_hourly(&self, run_date: NaiveDate) -> Result<Vec<FlowMetricRecord>, CollectError> {
        let path = self.hourly_path(run_date);
        if !path.exists() {
            return Err(CollectError::DatasetNotFound { path });
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Replaces the daily dataset with the given rollup rows.
    #[instrument(skip(self, rows), fields(repo = "dataset", operation = "write_daily", row_count = rows.len()))]
    pub fn write_daily(
        &self,
        run_date: NaiveDate,
        rows: &[DailyAggregate],
    ) -> Result<(), CollectError> {
        self.ensure_data_dir()?;
        let path = self.daily_path(run_date);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), "daily rollup written");
        Ok(())
    }

    fn ensure_data_dir(&self) -> Result<(), std::io::Error> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }
}
