//! The contract between a measurement task and the scheduling framework.

use super::descriptor::MeasurementDesc;
use crate::error::Result;
use crate::result::MeasurementResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A unit of measurement work the framework can schedule and run.
///
/// # Implementation Notes
///
/// - `call` resolves to exactly one result per invocation unless it fails
///   with a fatal error (cancellation, channel failure).
/// - `stop` is advisory; returning `false` means cancellation had no effect.
#[async_trait]
pub trait MeasurementTask: Send + Sync {
    /// Internal type name (e.g. `video_qoe`).
    fn task_type(&self) -> &'static str;

    /// Human readable descriptor (e.g. `VIDEOQOE`).
    fn descriptor_name(&self) -> &'static str;

    /// Key of the task instance.
    fn key(&self) -> &str;

    /// The envelope this task was created from.
    fn measurement_desc(&self) -> &MeasurementDesc;

    /// Runs the measurement.
    ///
    /// # Arguments
    ///
    /// * `cancel` - Token the framework triggers to interrupt the run
    async fn call(&self, cancel: CancellationToken) -> Result<Vec<MeasurementResult>>;

    /// Best-effort cancellation hook.
    fn stop(&self) -> bool;

    /// Expected duration hint in seconds.
    fn duration(&self) -> u64;

    /// Sets the duration hint; negative values are stored as zero.
    fn set_duration(&self, duration: i64);

    /// Bytes of network data consumed by the measurement.
    fn data_consumed(&self) -> u64;

    /// Creates an independent task from a deep copy of this task's descriptor.
    fn clone_task(&self) -> Box<dyn MeasurementTask>;
}
