//! Task lifecycle model.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a measurement task.
///
/// A run moves `Created -> Running -> (Completed | TimedOut) -> Done`.
/// `Cancelled` ends a run that was interrupted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// The task exists but has not been run.
    Created,
    /// The probe has been started and the task is waiting for telemetry.
    Running,
    /// Telemetry arrived before the deadline.
    Completed,
    /// The deadline elapsed without telemetry.
    TimedOut,
    /// The result has been built and returned.
    Done,
    /// The run was interrupted before an outcome was reached.
    Cancelled,
}
