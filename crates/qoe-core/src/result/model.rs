//! Measurement result model.

use crate::error::Result;
use crate::task::MeasurementDesc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Final status of a measurement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskProgress {
    /// The measurement produced telemetry.
    Completed,
    /// The measurement ended without telemetry.
    Failed,
}

/// The immutable result of one measurement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub device_id: String,
    /// Device property snapshot supplied by the framework.
    pub properties: Value,
    pub task_type: String,
    /// Microseconds since the Unix epoch.
    pub timestamp: i64,
    pub task_progress: TaskProgress,
    /// The descriptor the task was created from.
    pub parameters: MeasurementDesc,
    /// Metric name to value. `BTreeMap` keeps the encoding stable.
    pub values: BTreeMap<String, Value>,
}

impl MeasurementResult {
    pub fn is_completed(&self) -> bool {
        self.task_progress == TaskProgress::Completed
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Encodes the result as a JSON document.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
