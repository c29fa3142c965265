//! Task domain module.
//!
//! # Module Structure
//!
//! - `descriptor`: the generic `MeasurementDesc` envelope and the validated
//!   `VideoQoeDesc`
//! - `model`: lifecycle state of a measurement task
//! - `measurement_task`: the trait the scheduling framework drives tasks through

mod descriptor;
mod measurement_task;
mod model;

pub use descriptor::{
    MeasurementDesc, PARAM_ABR_TYPE, PARAM_CONTENT_ID, PARAM_MANIFEST_URL, VIDEO_QOE_DESCRIPTOR,
    VIDEO_QOE_TYPE, VideoQoeDesc,
};
pub use measurement_task::MeasurementTask;
pub use model::TaskState;
