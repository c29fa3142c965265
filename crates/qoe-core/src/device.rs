//! Device identity attached to every measurement result.

use serde_json::Value;

/// Supplies the device id and the device property snapshot for results.
///
/// The property snapshot is opaque to the measurement task; it is produced by
/// the surrounding framework and copied into the result unchanged.
pub trait DeviceInfoProvider: Send + Sync {
    fn device_id(&self) -> String;

    /// Properties describing the device at the time the task with `task_key`
    /// produces its result.
    fn device_properties(&self, task_key: &str) -> Value;
}
