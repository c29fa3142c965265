//! Synchronized aggregation of partial QoE reports.

use super::update::VideoUpdate;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The accumulated QoE metrics of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QoeTelemetry {
    pub is_succeed: bool,
    pub num_frame_dropped: i64,
    /// Seconds from playback request to first frame.
    pub initial_loading_time: f64,
    /// Durations of each stall, in seconds.
    pub rebuffer_time: Vec<f64>,
    pub goodput_timestamp: Vec<String>,
    pub goodput_value: Vec<f64>,
    pub bitrate_timestamp: Vec<String>,
    pub bitrate_value: Vec<i64>,
}

impl QoeTelemetry {
    /// Applies a partial report. Fields the report does not carry are left
    /// untouched; sequences are replaced wholesale.
    pub fn merge(&mut self, update: &VideoUpdate) {
        if let Some(value) = update.is_succeed {
            self.is_succeed = value;
        }
        if let Some(value) = update.num_frame_dropped {
            self.num_frame_dropped = value;
        }
        if let Some(value) = update.initial_loading_time {
            self.initial_loading_time = value;
        }
        if let Some(values) = &update.rebuffer_time {
            self.rebuffer_time = values.clone();
        }
        if let Some(values) = &update.goodput_timestamp {
            self.goodput_timestamp = values.clone();
        }
        if let Some(values) = &update.goodput_value {
            self.goodput_value = values.clone();
        }
        if let Some(values) = &update.bitrate_timestamp {
            self.bitrate_timestamp = values.clone();
        }
        if let Some(values) = &update.bitrate_value {
            self.bitrate_value = values.clone();
        }
    }

    /// Names of the timestamp/value pairs whose lengths disagree.
    pub fn misaligned_series(&self) -> Vec<&'static str> {
        let mut misaligned = Vec::new();
        if self.goodput_timestamp.len() != self.goodput_value.len() {
            misaligned.push("goodput");
        }
        if self.bitrate_timestamp.len() != self.bitrate_value.len() {
            misaligned.push("bitrate");
        }
        misaligned
    }
}

/// Telemetry buffer shared between a run and its notification callback.
///
/// The callback writes from whatever context the channel delivers on while the
/// run polls `is_result_received`. The flag is published with `Release` after
/// the merge, so a reader that observes it also observes the merged fields.
#[derive(Debug, Default)]
pub struct TelemetryAccumulator {
    telemetry: Mutex<QoeTelemetry>,
    result_received: AtomicBool,
    updates_applied: AtomicUsize,
}

impl TelemetryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one report and marks the result as received.
    ///
    /// Every report is terminal, including one without any recognized key.
    pub fn apply(&self, update: &VideoUpdate) {
        self.lock().merge(update);
        self.updates_applied.fetch_add(1, Ordering::Relaxed);
        self.result_received.store(true, Ordering::Release);
    }

    pub fn is_result_received(&self) -> bool {
        self.result_received.load(Ordering::Acquire)
    }

    /// Number of reports merged so far.
    pub fn updates_applied(&self) -> usize {
        self.updates_applied.load(Ordering::Relaxed)
    }

    /// Copies the current state out of the buffer.
    pub fn snapshot(&self) -> QoeTelemetry {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, QoeTelemetry> {
        // A panicking writer leaves whole-field assignments behind, never a torn field.
        self.telemetry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
