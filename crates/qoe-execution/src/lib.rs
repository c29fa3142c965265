//! Execution layer: runs video QoE measurements against injected
//! collaborators.

pub mod context;
pub mod logging;
pub mod video_qoe_task;

pub use context::ProbeContext;
pub use video_qoe_task::VideoQoeTask;
