// Domain models (fetch windows, wire payload, CSV rows)

mod payload;
mod record;
mod window;

pub use payload::MetricsPayload;
pub use record::{DailyAggregate, FlowMetricRecord};
pub use window::TimeWindow;
