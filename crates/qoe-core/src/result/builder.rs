//! Assembly of `MeasurementResult` from a run outcome.

use super::model::{MeasurementResult, TaskProgress};
use crate::task::{MeasurementDesc, VIDEO_QOE_TYPE};
use crate::telemetry::{QoeTelemetry, keys};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Metric key carrying the failure message of a failed run.
pub const ERROR_KEY: &str = "error";
/// Failure message of a run that received no telemetry in time.
pub const TIMEOUT_ERROR_MESSAGE: &str = "measurement timeout";

/// How a measurement run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// At least one notification arrived before the deadline.
    Completed(QoeTelemetry),
    /// The deadline elapsed without any notification.
    TimedOut,
}

/// Builds results for one task instance.
///
/// The builder never reads the clock: the caller stamps the timestamp, which
/// keeps `build` a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct ResultBuilder<'a> {
    desc: &'a MeasurementDesc,
    device_id: String,
    properties: Value,
    timestamp_micros: i64,
}

impl<'a> ResultBuilder<'a> {
    pub fn new(
        desc: &'a MeasurementDesc,
        device_id: impl Into<String>,
        properties: Value,
        timestamp_micros: i64,
    ) -> Self {
        Self {
            desc,
            device_id: device_id.into(),
            properties,
            timestamp_micros,
        }
    }

    /// Builds the result for `outcome`.
    ///
    /// # Returns
    ///
    /// - `Completed`: every telemetry field under its metric key
    /// - `TimedOut`: a failed result with only the `error` key
    pub fn build(self, outcome: &ProbeOutcome) -> MeasurementResult {
        let (task_progress, values) = match outcome {
            ProbeOutcome::Completed(telemetry) => {
                (TaskProgress::Completed, telemetry_values(telemetry))
            }
            ProbeOutcome::TimedOut => {
                let mut values = BTreeMap::new();
                values.insert(ERROR_KEY.to_string(), json!(TIMEOUT_ERROR_MESSAGE));
                (TaskProgress::Failed, values)
            }
        };

        MeasurementResult {
            device_id: self.device_id,
            properties: self.properties,
            task_type: VIDEO_QOE_TYPE.to_string(),
            timestamp: self.timestamp_micros,
            task_progress,
            parameters: self.desc.clone(),
            values,
        }
    }
}

fn telemetry_values(telemetry: &QoeTelemetry) -> BTreeMap<String, Value> {
    [
        (keys::IS_SUCCEED, json!(telemetry.is_succeed)),
        (keys::NUM_FRAME_DROPPED, json!(telemetry.num_frame_dropped)),
        (keys::INITIAL_LOADING_TIME, json!(telemetry.initial_loading_time)),
        (keys::REBUFFER_TIME, json!(telemetry.rebuffer_time)),
        (keys::GOODPUT_TIMESTAMP, json!(telemetry.goodput_timestamp)),
        (keys::GOODPUT_VALUE, json!(telemetry.goodput_value)),
        (keys::BITRATE_TIMESTAMP, json!(telemetry.bitrate_timestamp)),
        (keys::BITRATE_VALUE, json!(telemetry.bitrate_value)),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}
