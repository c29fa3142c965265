//! Playback probe running as a child process.
//!
//! The probe executable receives the playback request as command line
//! arguments and reports progress by writing one JSON `Notification` per line
//! to stdout. Each such line is published on the bus the worker was built
//! with; any other output is ignored. A supervising task owns the child and
//! waits on it once stdout closes, so a child that exits by itself is reaped
//! without a call to `stop`.

use async_trait::async_trait;
use qoe_core::config::ProbeConfig;
use qoe_core::error::{QoeError, Result};
use qoe_core::notification::Notification;
use qoe_core::worker::{ExternalWorker, PlaybackRequest};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use crate::notification_bus::InMemoryNotificationBus;

struct RunningProbe {
    kill: oneshot::Sender<()>,
    supervisor: JoinHandle<()>,
}

impl RunningProbe {
    fn has_exited(&self) -> bool {
        self.supervisor.is_finished()
    }
}

/// Launches the configured probe program and forwards its notifications.
///
/// Notifications are published on the concrete `InMemoryNotificationBus`
/// passed to `new`; the coordinator subscribes to the same bus through the
/// `NotificationChannel` trait.
pub struct ProcessProbeWorker {
    config: ProbeConfig,
    bus: Arc<InMemoryNotificationBus>,
    running: Mutex<Option<RunningProbe>>,
}

impl ProcessProbeWorker {
    pub fn new(config: ProbeConfig, bus: Arc<InMemoryNotificationBus>) -> Self {
        Self {
            config,
            bus,
            running: Mutex::new(None),
        }
    }

    /// Whether the started child process is still alive.
    ///
    /// A child that has exited on its own is forgotten here.
    pub async fn is_running(&self) -> bool {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(RunningProbe::has_exited) {
            *running = None;
        }
        running.is_some()
    }

    fn command(&self, request: &PlaybackRequest) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg("--manifest-url")
            .arg(&request.manifest_url)
            .arg("--content-type")
            .arg(request.content_type.as_str());
        if let Some(content_id) = &request.content_id {
            command.arg("--content-id").arg(content_id);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ExternalWorker for ProcessProbeWorker {
    async fn start(&self, request: PlaybackRequest) -> Result<()> {
        let mut child = self.command(&request).spawn().map_err(|e| {
            QoeError::worker(format!("failed to spawn '{}': {}", self.config.program, e))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| QoeError::internal("probe stdout was not captured"))?;

        tracing::info!(
            "[ProcessProbeWorker] Started '{}' (pid={:?}) for {}",
            self.config.program,
            child.id(),
            request.manifest_url
        );

        let (kill, kill_rx) = oneshot::channel();
        let supervisor = tokio::spawn(supervise(child, stdout, Arc::clone(&self.bus), kill_rx));
        let previous = self
            .running
            .lock()
            .await
            .replace(RunningProbe { kill, supervisor });
        if let Some(previous) = previous {
            if !previous.has_exited() {
                tracing::warn!("[ProcessProbeWorker] Replacing a child that was still running");
            }
            shutdown(previous).await;
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let running = self.running.lock().await.take();
        if let Some(running) = running {
            shutdown(running).await;
        }
        Ok(())
    }
}

async fn shutdown(running: RunningProbe) {
    // The supervisor may already be gone if the child exited.
    let _ = running.kill.send(());
    if let Err(e) = running.supervisor.await {
        tracing::warn!("[ProcessProbeWorker] supervisor task failed: {}", e);
    }
}

/// Forwards stdout notifications until the child closes stdout or a kill is
/// requested, then reaps the child.
async fn supervise(
    mut child: Child,
    stdout: ChildStdout,
    bus: Arc<InMemoryNotificationBus>,
    mut kill: oneshot::Receiver<()>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => publish_line(&bus, &line),
                Ok(None) => {
                    tracing::debug!("[ProcessProbeWorker] probe closed stdout");
                    break;
                }
                Err(e) => {
                    tracing::warn!("[ProcessProbeWorker] failed to read probe output: {}", e);
                    break;
                }
            },
            _ = &mut kill => {
                terminate(&mut child).await;
                return;
            }
        }
    }

    // Sender dropped counts as a kill request, like kill_on_drop.
    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => tracing::debug!("[ProcessProbeWorker] child exited: {}", status),
            Err(e) => tracing::warn!("[ProcessProbeWorker] failed to wait for child: {}", e),
        },
        _ = &mut kill => terminate(&mut child).await,
    }
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::debug!("[ProcessProbeWorker] kill failed: {}", e);
    }
}

fn publish_line(bus: &InMemoryNotificationBus, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<Notification>(line) {
        Ok(notification) => {
            bus.publish(&notification);
        }
        Err(_) => tracing::trace!("[ProcessProbeWorker] probe output: {}", line),
    }
}
