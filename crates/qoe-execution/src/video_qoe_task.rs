//! The video QoE measurement task.
//!
//! `VideoQoeTask` starts the playback probe, listens for its progress
//! notifications, and turns whatever arrived before the deadline into exactly
//! one `MeasurementResult`.

use crate::context::ProbeContext;
use async_trait::async_trait;
use qoe_core::config::CoordinatorConfig;
use qoe_core::error::{QoeError, Result};
use qoe_core::notification::{
    Notification, NotificationCallback, SubscriptionGuard, VIDEO_MEASUREMENT_ACTION,
};
use qoe_core::result::{MeasurementResult, ProbeOutcome, ResultBuilder};
use qoe_core::task::{
    MeasurementDesc, MeasurementTask, TaskState, VIDEO_QOE_DESCRIPTOR, VIDEO_QOE_TYPE,
    VideoQoeDesc,
};
use qoe_core::telemetry::{TelemetryAccumulator, VideoUpdate};
use qoe_core::worker::{ContentType, PlaybackRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Measures user-perceived video QoE by playing a stream in an external probe.
pub struct VideoQoeTask {
    desc: VideoQoeDesc,
    context: ProbeContext,
    config: CoordinatorConfig,
    /// Expected duration hint in seconds; never bounds the wait.
    duration: AtomicU64,
    state: Mutex<TaskState>,
}

impl VideoQoeTask {
    /// Creates a task with the default 300 second budget.
    pub fn new(desc: VideoQoeDesc, context: ProbeContext) -> Self {
        Self {
            desc,
            context,
            config: CoordinatorConfig::default(),
            duration: AtomicU64::new(0),
            state: Mutex::new(TaskState::Created),
        }
    }

    /// Creates a task from a generic envelope, validating its parameters.
    ///
    /// # Errors
    ///
    /// Returns `QoeError::InvalidConfiguration` if the envelope has no
    /// manifest url.
    pub fn from_measurement_desc(desc: &MeasurementDesc, context: ProbeContext) -> Result<Self> {
        let desc = VideoQoeDesc::from_measurement_desc(desc.clone())?;
        Ok(Self::new(desc, context))
    }

    /// Replaces the timing configuration.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn desc(&self) -> &VideoQoeDesc {
        &self.desc
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn state(&self) -> TaskState {
        *self.lock_state()
    }

    /// Runs one measurement.
    ///
    /// Subscribes to probe notifications, starts the probe, and waits until a
    /// notification arrives or the deadline elapses. The subscription is
    /// released on every path out of this function, including cancellation
    /// and dropping the returned future.
    ///
    /// # Returns
    ///
    /// A vector holding exactly one result: `Completed` with the accumulated
    /// telemetry, or `Failed` with `error = "measurement timeout"`.
    ///
    /// # Errors
    ///
    /// - `QoeError::Channel` if the subscription cannot be made
    /// - `QoeError::Cancelled` if `cancel` fires before an outcome is reached
    pub async fn run(&self, cancel: CancellationToken) -> Result<Vec<MeasurementResult>> {
        let key = self.desc.key().to_string();
        tracing::info!("[VideoQoeTask] {}: measurement started", key);

        let accumulator = Arc::new(TelemetryAccumulator::new());
        let subscription = SubscriptionGuard::subscribe(
            Arc::clone(&self.context.channel),
            VIDEO_MEASUREMENT_ACTION,
            Self::notification_callback(key.clone(), Arc::clone(&accumulator)),
        )?;
        self.set_state(TaskState::Running);

        let started = Instant::now();
        let waited = match self.start_probe(&key, &cancel).await {
            Ok(()) => self.wait_for_result(&accumulator, started, &cancel).await,
            Err(e) => Err(e),
        };

        tracing::debug!(
            "[VideoQoeTask] {}: result ready? {}",
            key,
            accumulator.is_result_received()
        );
        if let Err(e) = subscription.release() {
            tracing::warn!("[VideoQoeTask] {}: failed to unsubscribe: {}", key, e);
        }

        let outcome = match waited {
            Ok(true) => {
                self.set_state(TaskState::Completed);
                let telemetry = accumulator.snapshot();
                let misaligned = telemetry.misaligned_series();
                if !misaligned.is_empty() {
                    tracing::warn!(
                        "[VideoQoeTask] {}: timestamp/value lengths differ for {:?}",
                        key,
                        misaligned
                    );
                }
                tracing::info!(
                    "[VideoQoeTask] {}: measured QoE data from {} notification(s)",
                    key,
                    accumulator.updates_applied()
                );
                ProbeOutcome::Completed(telemetry)
            }
            Ok(false) => {
                self.set_state(TaskState::TimedOut);
                tracing::info!("[VideoQoeTask] {}: video measurement not finished", key);
                ProbeOutcome::TimedOut
            }
            Err(e) => {
                self.set_state(TaskState::Cancelled);
                tracing::warn!("[VideoQoeTask] {}: measurement interrupted: {}", key, e);
                return Err(e);
            }
        };

        let device = &self.context.device;
        let result = ResultBuilder::new(
            self.desc.measurement_desc(),
            device.device_id(),
            device.device_properties(&key),
            chrono::Utc::now().timestamp_micros(),
        )
        .build(&outcome);

        match result.to_json_string() {
            Ok(json) => tracing::info!("[VideoQoeTask] {}", json),
            Err(e) => tracing::warn!("[VideoQoeTask] {}: result not encodable: {}", key, e),
        }

        self.set_state(TaskState::Done);
        Ok(vec![result])
    }

    fn notification_callback(
        key: String,
        accumulator: Arc<TelemetryAccumulator>,
    ) -> NotificationCallback {
        Arc::new(move |notification: &Notification| {
            let update = VideoUpdate::from_extras(&notification.extras);
            if update.is_empty() {
                tracing::debug!("[VideoQoeTask] {}: notification without QoE fields", key);
            } else {
                tracing::debug!("[VideoQoeTask] {}: result received: {:?}", key, update);
            }
            accumulator.apply(&update);
        })
    }

    /// Launches the probe without waiting for playback.
    ///
    /// A start failure is logged and swallowed: the deadline is the only
    /// backstop for a probe that never reports.
    async fn start_probe(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        let request = PlaybackRequest {
            manifest_url: self.desc.manifest_url.clone(),
            content_id: self.desc.content_id.clone(),
            content_type: ContentType::DashVod,
        };
        tracing::debug!("[VideoQoeTask] {}: starting probe for {}", key, request.manifest_url);

        let started = tokio::select! {
            started = tokio::time::timeout(self.config.deadline(), self.context.worker.start(request)) => started,
            _ = cancel.cancelled() => return Err(QoeError::Cancelled),
        };
        match started {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("[VideoQoeTask] {}: probe failed to start: {}", key, e),
            Err(_) => tracing::error!("[VideoQoeTask] {}: probe start did not return", key),
        }
        Ok(())
    }

    /// Polls the accumulator until a result is received, the deadline passes,
    /// or `cancel` fires.
    ///
    /// Returns `Ok(true)` if a notification arrived in time.
    async fn wait_for_result(
        &self,
        accumulator: &TelemetryAccumulator,
        started: Instant,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let poll_interval = self.config.poll_interval();
        let deadline = started + self.config.deadline();
        let mut ticker = tokio::time::interval_at(started + poll_interval, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if accumulator.is_result_received() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => return Err(QoeError::Cancelled),
            }
        }
    }

    fn set_state(&self, next: TaskState) {
        let mut state = self.lock_state();
        tracing::debug!(
            "[VideoQoeTask] {}: state {:?} -> {:?}",
            self.desc.key(),
            *state,
            next
        );
        *state = next;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, TaskState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MeasurementTask for VideoQoeTask {
    fn task_type(&self) -> &'static str {
        VIDEO_QOE_TYPE
    }

    fn descriptor_name(&self) -> &'static str {
        VIDEO_QOE_DESCRIPTOR
    }

    fn key(&self) -> &str {
        self.desc.key()
    }

    fn measurement_desc(&self) -> &MeasurementDesc {
        self.desc.measurement_desc()
    }

    async fn call(&self, cancel: CancellationToken) -> Result<Vec<MeasurementResult>> {
        self.run(cancel).await
    }

    /// There is nothing that can interrupt a probe once it is playing.
    fn stop(&self) -> bool {
        false
    }

    fn duration(&self) -> u64 {
        self.duration.load(Ordering::Relaxed)
    }

    fn set_duration(&self, duration: i64) {
        self.duration
            .store(u64::try_from(duration).unwrap_or(0), Ordering::Relaxed);
    }

    fn data_consumed(&self) -> u64 {
        0
    }

    fn clone_task(&self) -> Box<dyn MeasurementTask> {
        Box::new(
            Self::new(self.desc.clone(), self.context.clone()).with_config(self.config.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qoe_core::device::DeviceInfoProvider;
    use qoe_core::notification::{NotificationChannel, SubscriptionId};
    use qoe_core::worker::ExternalWorker;
    use serde_json::Value;
    use std::collections::HashMap;

    struct NoopWorker;

    #[async_trait]
    impl ExternalWorker for NoopWorker {
        async fn start(&self, _request: PlaybackRequest) -> Result<()> {
            Ok(())
        }
    }

    struct NoopChannel;

    impl NotificationChannel for NoopChannel {
        fn subscribe(&self, _action: &str, _callback: NotificationCallback) -> Result<SubscriptionId> {
            Ok(SubscriptionId::new())
        }

        fn unsubscribe(&self, _id: SubscriptionId) -> Result<()> {
            Ok(())
        }
    }

    struct NoopDevice;

    impl DeviceInfoProvider for NoopDevice {
        fn device_id(&self) -> String {
            "device".to_string()
        }

        fn device_properties(&self, _task_key: &str) -> Value {
            Value::Null
        }
    }

    fn task() -> VideoQoeTask {
        let params = HashMap::from([(
            "manifestURL".to_string(),
            "http://example/manifest.mpd".to_string(),
        )]);
        let desc =
            VideoQoeDesc::new("task-key", chrono::Utc::now(), None, 60.0, 1, 1, 1, params).unwrap();
        VideoQoeTask::new(
            desc,
            ProbeContext::new(Arc::new(NoopWorker), Arc::new(NoopChannel), Arc::new(NoopDevice)),
        )
    }

    #[test]
    fn test_identity() {
        let task = task();
        assert_eq!(task.task_type(), "video_qoe");
        assert_eq!(task.descriptor_name(), "VIDEOQOE");
        assert_eq!(MeasurementTask::key(&task), "task-key");
        assert_eq!(task.state(), TaskState::Created);
        assert_eq!(task.data_consumed(), 0);
    }

    #[test]
    fn test_duration_is_clamped() {
        let task = task();
        task.set_duration(-5);
        assert_eq!(task.duration(), 0);
        task.set_duration(42);
        assert_eq!(task.duration(), 42);
    }

    #[test]
    fn test_stop_has_no_effect() {
        let task = task();
        assert!(!task.stop());
        assert_eq!(task.state(), TaskState::Created);
    }

    #[test]
    fn test_clone_task_copies_descriptor() {
        let task = task();
        task.set_duration(10);
        let copy = task.clone_task();
        assert_eq!(copy.measurement_desc(), task.measurement_desc());
        assert_eq!(copy.duration(), 0);
    }

    #[test]
    fn test_from_measurement_desc_requires_manifest() {
        let mut envelope = task().measurement_desc().clone();
        envelope.parameters.clear();
        let context =
            ProbeContext::new(Arc::new(NoopWorker), Arc::new(NoopChannel), Arc::new(NoopDevice));
        let err = VideoQoeTask::from_measurement_desc(&envelope, context)
            .err()
            .unwrap();
        assert!(err.is_invalid_configuration());
    }
}
