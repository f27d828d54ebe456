// Hourly window generation: local calendar range -> UTC fetch windows.
// The timezone offset is a static config value; DST transitions are not
// handled (an offset change is a config change, not computed per date).

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::error::CollectError;
use crate::models::TimeWindow;

/// Windows from local midnight of `start` through local 23:00 of `end`
/// inclusive, one per hour: exactly `24 * days` windows, contiguous and
/// strictly increasing. `from_utc = local_timestamp - offset`.
pub fn hourly_windows(
    start: NaiveDate,
    end: NaiveDate,
    timezone_offset_hours: i32,
) -> Result<Vec<TimeWindow>, CollectError> {
    if end < start {
        return Err(CollectError::InvalidRange { start, end });
    }

    let offset = Duration::hours(timezone_offset_hours as i64);
    let days = (end - start).num_days() + 1;
    let mut windows = Vec::with_capacity((days * 24) as usize);

    let mut local = start.and_time(NaiveTime::MIN);
    let last = end.and_time(NaiveTime::MIN) + Duration::hours(23);
    while local <= last {
        let from_utc = (local - offset).and_utc();
        windows.push(TimeWindow {
            from_utc,
            to_utc: from_utc + Duration::hours(1),
            local_timestamp: local,
        });
        local += Duration::hours(1);
    }
    Ok(windows)
}
