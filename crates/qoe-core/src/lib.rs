//! Domain layer of the video QoE measurement task.
//!
//! Holds the descriptors, the telemetry accumulator, the collaborator
//! contracts (notification channel, probe worker, device info) and the result
//! model. Nothing here performs I/O.

pub mod config;
pub mod device;
pub mod error;
pub mod notification;
pub mod result;
pub mod task;
pub mod telemetry;
pub mod worker;

// Re-export common error type
pub use error::{QoeError, Result};
