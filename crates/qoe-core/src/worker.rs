//! External playback probe abstraction.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of stream the probe is asked to play. Only on-demand DASH is
/// measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    DashVod,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DashVod => "dash_vod",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the probe needs to start playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackRequest {
    pub manifest_url: String,
    pub content_id: Option<String>,
    pub content_type: ContentType,
}

/// Starts and stops the out-of-process playback probe.
///
/// `start` is fire-and-forget: it returns once the probe has been launched,
/// not when playback finishes. Telemetry comes back through a
/// `NotificationChannel`, never through this trait.
#[async_trait]
pub trait ExternalWorker: Send + Sync {
    /// Launches the probe for `request`.
    async fn start(&self, request: PlaybackRequest) -> Result<()>;

    /// Stops a running probe. The default does nothing.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}
