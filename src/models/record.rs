// Flattened per-window rows and daily rollup rows. Field order in these
// structs IS the CSV column order.

use serde::{Deserialize, Serialize};

/// Metrics of one flow during one hourly window. Exchange counters are
/// independently reported by the source API: `total_exchanges >=
/// successful_exchanges + failed_exchanges` is NOT guaranteed and consumers
/// must not assume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetricRecord {
    pub datetime: String,
    pub date: String,
    pub hour: u32,
    pub collection_timestamp: String,
    pub flow_id: String,
    pub flow_name: String,
    pub flow_state: String,
    pub total_exchanges: i64,
    pub successful_exchanges: i64,
    pub failed_exchanges: i64,
    pub inflight_exchanges: i64,
    pub avg_response_time_ms: f64,
    pub avg_processing_time_ms: f64,
}

/// One (date, flow) rollup row. Counters are sums over the hourly rows;
/// inflight and latency fields are means of the hourly means, not re-derived
/// from per-exchange data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: String,
    pub collection_timestamp: String,
    pub flow_id: String,
    pub flow_name: String,
    pub flow_state: String,
    pub total_exchanges: i64,
    pub successful_exchanges: i64,
    pub failed_exchanges: i64,
    pub inflight_exchanges: f64,
    pub avg_response_time_ms: f64,
    pub avg_processing_time_ms: f64,
}
