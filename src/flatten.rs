// Flattening: nested flow-entry JSON -> one tabular record per (window, flow).

use std::collections::HashMap;

use chrono::Timelike;
use serde_json::Value;

use crate::models::{FlowMetricRecord, MetricsPayload, TimeWindow};

const METRIC_TOTAL: &str = "total-exchanges";
const METRIC_SUCCESSFUL: &str = "successful-exchanges";
const METRIC_FAILED: &str = "failed-exchanges";
const METRIC_INFLIGHT: &str = "inflight-exchanges";
const METRIC_AVG_RESPONSE: &str = "avg-response-time-millis";
const METRIC_AVG_PROCESSING: &str = "avg-processing-time-millis";

/// Flattens one window's payload into records. Non-object entries are skipped
/// silently; an empty payload yields an empty batch (a no-op downstream).
/// Missing or unmapped metric ids default to zero.
pub fn flatten_window(
    window: &TimeWindow,
    payload: MetricsPayload,
    collection_timestamp: &str,
) -> Vec<FlowMetricRecord> {
    payload
        .into_entries()
        .iter()
        .filter_map(|entry| flatten_entry(window, entry, collection_timestamp))
        .collect()
}

fn flatten_entry(
    window: &TimeWindow,
    entry: &Value,
    collection_timestamp: &str,
) -> Option<FlowMetricRecord> {
    let entry = entry.as_object()?;

    let details = entry.get("flowDetails").and_then(Value::as_object);
    let detail_str = |key: &str| details.and_then(|d| d.get(key)).and_then(Value::as_str);

    // metricId -> value; a later sample wins on a duplicate id
    let mut metrics: HashMap<&str, f64> = HashMap::new();
    if let Some(samples) = entry.get("metrics").and_then(Value::as_array) {
        for sample in samples {
            let Some(id) = sample.get("metricId").and_then(Value::as_str) else {
                continue;
            };
            let value = sample.get("value").and_then(Value::as_f64).unwrap_or(0.0);
            metrics.insert(id, value);
        }
    }
    let metric = |id: &str| metrics.get(id).copied().unwrap_or(0.0);

    Some(FlowMetricRecord {
        datetime: window
            .local_timestamp
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        date: window.local_timestamp.format("%Y-%m-%d").to_string(),
        hour: window.local_timestamp.hour(),
        collection_timestamp: collection_timestamp.to_string(),
        flow_id: detail_str("flowId").unwrap_or("unknown").to_string(),
        flow_name: detail_str("flowName").unwrap_or_default().to_string(),
        flow_state: detail_str("flowState").unwrap_or_default().to_string(),
        total_exchanges: metric(METRIC_TOTAL) as i64,
        successful_exchanges: metric(METRIC_SUCCESSFUL) as i64,
        failed_exchanges: metric(METRIC_FAILED) as i64,
        inflight_exchanges: metric(METRIC_INFLIGHT) as i64,
        avg_response_time_ms: metric(METRIC_AVG_RESPONSE),
        avg_processing_time_ms: metric(METRIC_AVG_PROCESSING),
    })
}
