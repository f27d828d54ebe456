// Hourly fetch window: one local wall-clock hour, expressed in UTC for the API.

use chrono::{DateTime, NaiveDateTime, Utc};

/// One hour of local time. Invariants: `to_utc == from_utc + 1h` and
/// `from_utc == local_timestamp - timezone offset`. Windows for a run are
/// contiguous and non-overlapping; they are built once per run and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub from_utc: DateTime<Utc>,
    pub to_utc: DateTime<Utc>,
    pub local_timestamp: NaiveDateTime,
}
