//! QoE telemetry reported by the playback probe.
//!
//! - `update`: one partial report (`VideoUpdate`) parsed from a notification
//! - `accumulator`: the synchronized buffer a run merges reports into

mod accumulator;
mod update;

pub use accumulator::{QoeTelemetry, TelemetryAccumulator};
pub use update::VideoUpdate;

/// Names shared by notification payloads and result metrics.
pub mod keys {
    pub const IS_SUCCEED: &str = "isSucceed";
    pub const NUM_FRAME_DROPPED: &str = "numFrameDropped";
    pub const INITIAL_LOADING_TIME: &str = "initialLoadingTime";
    pub const REBUFFER_TIME: &str = "rebufferTime";
    pub const GOODPUT_TIMESTAMP: &str = "goodputTimestamp";
    pub const GOODPUT_VALUE: &str = "goodputValue";
    pub const BITRATE_TIMESTAMP: &str = "bitrateTimestamp";
    pub const BITRATE_VALUE: &str = "bitrateValue";
}
