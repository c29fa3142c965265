//! Measurement descriptors.
//!
//! `MeasurementDesc` is the generic envelope the scheduling framework hands to
//! every task. `VideoQoeDesc` is the validated, typed view of that envelope
//! for the video QoE task.

use crate::error::{QoeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type name of the video QoE task.
pub const VIDEO_QOE_TYPE: &str = "video_qoe";
/// Human readable name of the video QoE task.
pub const VIDEO_QOE_DESCRIPTOR: &str = "VIDEOQOE";

/// Parameter key of the manifest locator (required).
pub const PARAM_MANIFEST_URL: &str = "manifestURL";
/// Parameter key of the content identifier.
pub const PARAM_CONTENT_ID: &str = "contentId";
/// Parameter key of the ABR algorithm selector.
pub const PARAM_ABR_TYPE: &str = "ABRType";

/// Generic task description shared by every measurement type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDesc {
    /// Task type tag (e.g. `video_qoe`).
    pub task_type: String,
    /// Key identifying this task instance.
    pub key: String,
    /// Start of the validity window.
    pub start_time: DateTime<Utc>,
    /// End of the validity window, if bounded.
    pub end_time: Option<DateTime<Utc>>,
    /// Sampling interval in seconds.
    pub interval_sec: f64,
    /// Number of repetitions.
    pub count: u64,
    /// Scheduling priority.
    pub priority: u64,
    /// Context sampling interval in seconds.
    pub context_interval_sec: u32,
    /// Task specific string parameters.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Parameters for a video QoE measurement.
///
/// Serializes as its `MeasurementDesc` envelope; deserializing goes through
/// [`VideoQoeDesc::from_measurement_desc`], so a decoded descriptor is always
/// validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MeasurementDesc", into = "MeasurementDesc")]
pub struct VideoQoeDesc {
    pub base: MeasurementDesc,
    /// Locator of the adaptive streaming manifest.
    pub manifest_url: String,
    /// Content id of the video, if the probe needs one.
    pub content_id: Option<String>,
    /// ABR algorithm selector; 0 means unset.
    pub abr_type: u32,
}

impl VideoQoeDesc {
    /// Builds and validates a video QoE descriptor.
    ///
    /// # Errors
    ///
    /// Returns `QoeError::InvalidConfiguration` if `manifestURL` is missing
    /// from `params` or empty. No other parameter can fail construction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        interval_sec: f64,
        count: u64,
        priority: u64,
        context_interval_sec: u32,
        params: HashMap<String, String>,
    ) -> Result<Self> {
        Self::from_measurement_desc(MeasurementDesc {
            task_type: VIDEO_QOE_TYPE.to_string(),
            key: key.into(),
            start_time,
            end_time,
            interval_sec,
            count,
            priority,
            context_interval_sec,
            parameters: params,
        })
    }

    /// Validates a generic envelope into a video QoE descriptor.
    ///
    /// The task type of the envelope is overwritten with `video_qoe`.
    pub fn from_measurement_desc(desc: MeasurementDesc) -> Result<Self> {
        let params = &desc.parameters;

        let manifest_url = match params.get(PARAM_MANIFEST_URL) {
            Some(url) if !url.is_empty() => url.clone(),
            _ => {
                return Err(QoeError::invalid_configuration(format!(
                    "Video QoE task '{}' cannot be created without a video manifest url",
                    desc.key
                )));
            }
        };
        let content_id = params.get(PARAM_CONTENT_ID).cloned();
        let abr_type = parse_abr_type(&desc.key, params.get(PARAM_ABR_TYPE));

        Ok(Self {
            base: MeasurementDesc {
                task_type: VIDEO_QOE_TYPE.to_string(),
                ..desc
            },
            manifest_url,
            content_id,
            abr_type,
        })
    }

    pub fn key(&self) -> &str {
        &self.base.key
    }

    /// Returns the generic envelope of this descriptor.
    pub fn measurement_desc(&self) -> &MeasurementDesc {
        &self.base
    }
}

impl TryFrom<MeasurementDesc> for VideoQoeDesc {
    type Error = QoeError;

    fn try_from(desc: MeasurementDesc) -> Result<Self> {
        Self::from_measurement_desc(desc)
    }
}

impl From<VideoQoeDesc> for MeasurementDesc {
    fn from(desc: VideoQoeDesc) -> Self {
        desc.base
    }
}

/// Only strictly positive integers select an algorithm.
fn parse_abr_type(key: &str, raw: Option<&String>) -> u32 {
    let Some(raw) = raw else {
        return 0;
    };

    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => u32::try_from(value).unwrap_or_else(|_| {
            tracing::warn!("[VideoQoeDesc] {}: ABRType {} out of range, ignored", key, value);
            0
        }),
        Ok(_) => 0,
        Err(e) => {
            tracing::warn!("[VideoQoeDesc] {}: ABRType '{}' is not an integer ({}), ignored", key, raw, e);
            0
        }
    }
}
