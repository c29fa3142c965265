//! Collaborators a measurement task runs against.

use qoe_core::device::DeviceInfoProvider;
use qoe_core::notification::NotificationChannel;
use qoe_core::worker::ExternalWorker;
use std::sync::Arc;

/// The probe worker, the channel it reports on, and the device identity.
///
/// Passed to each task explicitly; cloning shares the same collaborators.
#[derive(Clone)]
pub struct ProbeContext {
    pub worker: Arc<dyn ExternalWorker>,
    pub channel: Arc<dyn NotificationChannel>,
    pub device: Arc<dyn DeviceInfoProvider>,
}

impl ProbeContext {
    pub fn new(
        worker: Arc<dyn ExternalWorker>,
        channel: Arc<dyn NotificationChannel>,
        device: Arc<dyn DeviceInfoProvider>,
    ) -> Self {
        Self {
            worker,
            channel,
            device,
        }
    }
}
