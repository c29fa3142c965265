//! Partial telemetry carried by a single probe notification.

use super::keys;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A partial QoE report. Every field is optional; `None` means the
/// notification did not carry that key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_succeed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_frame_dropped: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_loading_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuffer_time: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodput_timestamp: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodput_value: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_timestamp: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_value: Option<Vec<i64>>,
}

impl VideoUpdate {
    /// Extracts the recognized keys from a loosely typed payload.
    ///
    /// A key whose value has the wrong shape is logged and treated as absent,
    /// so one malformed field never discards the rest of the report.
    pub fn from_extras(extras: &Map<String, Value>) -> Self {
        Self {
            is_succeed: scalar(extras, keys::IS_SUCCEED, Value::as_bool),
            num_frame_dropped: scalar(extras, keys::NUM_FRAME_DROPPED, Value::as_i64),
            initial_loading_time: scalar(extras, keys::INITIAL_LOADING_TIME, Value::as_f64),
            rebuffer_time: sequence(extras, keys::REBUFFER_TIME, Value::as_f64),
            goodput_timestamp: sequence(extras, keys::GOODPUT_TIMESTAMP, as_string),
            goodput_value: sequence(extras, keys::GOODPUT_VALUE, Value::as_f64),
            bitrate_timestamp: sequence(extras, keys::BITRATE_TIMESTAMP, as_string),
            bitrate_value: sequence(extras, keys::BITRATE_VALUE, Value::as_i64),
        }
    }

    /// True if the notification carried none of the recognized keys.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn scalar<T>(
    extras: &Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = extras.get(key)?;
    let converted = convert(value);
    if converted.is_none() {
        tracing::warn!("[VideoUpdate] Ignoring '{}' with unexpected value: {}", key, value);
    }
    converted
}

fn sequence<T>(
    extras: &Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<Vec<T>> {
    let value = extras.get(key)?;
    let converted = value
        .as_array()
        .and_then(|items| items.iter().map(&convert).collect::<Option<Vec<T>>>());
    if converted.is_none() {
        tracing::warn!("[VideoUpdate] Ignoring '{}' with unexpected value: {}", key, value);
    }
    converted
}
