//! Notification channel abstraction.
//!
//! The playback probe reports progress as loosely structured notifications:
//! an action name plus a bag of named values. This module defines the payload,
//! the channel contract, and `SubscriptionGuard`, which ties a subscription to
//! a scope so it is released exactly once.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Action name of video measurement progress notifications.
pub const VIDEO_MEASUREMENT_ACTION: &str = "qoe.video_measurement.update";

/// A notification delivered by the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Event category the notification belongs to.
    pub action: String,
    /// Named payload values.
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl Notification {
    pub fn new(action: impl Into<String>, extras: Map<String, Value>) -> Self {
        Self {
            action: action.into(),
            extras,
        }
    }
}

/// Handle identifying one subscription on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback invoked for every notification matching a subscription.
///
/// May run on any thread, concurrently with the subscriber's own code.
pub type NotificationCallback = Arc<dyn Fn(&Notification) + Send + Sync>;

/// A source of asynchronously delivered notifications.
///
/// Implementations decide how notifications reach the process (in-memory bus,
/// probe stdout, platform IPC); subscribers only see this contract.
pub trait NotificationChannel: Send + Sync {
    /// Registers `callback` for notifications whose action equals `action`.
    fn subscribe(&self, action: &str, callback: NotificationCallback) -> Result<SubscriptionId>;

    /// Removes a subscription. Once this returns no new invocation of the
    /// callback starts. An invocation already running on another thread may
    /// still be finishing.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<()>;
}

/// A subscription that is released when the guard is released or dropped.
pub struct SubscriptionGuard {
    channel: Arc<dyn NotificationChannel>,
    id: Option<SubscriptionId>,
}

impl SubscriptionGuard {
    /// Subscribes to `action` on `channel`.
    pub fn subscribe(
        channel: Arc<dyn NotificationChannel>,
        action: &str,
        callback: NotificationCallback,
    ) -> Result<Self> {
        let id = channel.subscribe(action, callback)?;
        tracing::debug!("[SubscriptionGuard] Subscribed to '{}' (id={})", action, id);
        Ok(Self {
            channel,
            id: Some(id),
        })
    }

    /// The subscription id, or `None` once released.
    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }

    /// Releases the subscription and reports the channel's answer.
    pub fn release(mut self) -> Result<()> {
        match self.id.take() {
            Some(id) => {
                tracing::debug!("[SubscriptionGuard] Unsubscribing id={}", id);
                self.channel.unsubscribe(id)
            }
            None => Ok(()),
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            tracing::debug!("[SubscriptionGuard] Dropped, unsubscribing id={}", id);
            if let Err(e) = self.channel.unsubscribe(id) {
                tracing::warn!("[SubscriptionGuard] Failed to unsubscribe {}: {}", id, e);
            }
        }
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mock channel recording subscribe/unsubscribe calls
    #[derive(Default)]
    struct MockChannel {
        subscribed: Mutex<Vec<SubscriptionId>>,
        unsubscribed: Mutex<Vec<SubscriptionId>>,
    }

    impl NotificationChannel for MockChannel {
        fn subscribe(&self, _action: &str, _callback: NotificationCallback) -> Result<SubscriptionId> {
            let id = SubscriptionId::new();
            self.subscribed.lock().unwrap().push(id);
            Ok(id)
        }

        fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
            self.unsubscribed.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn noop() -> NotificationCallback {
        Arc::new(|_: &Notification| {})
    }

    #[test]
    fn test_release_unsubscribes_once() {
        let channel = Arc::new(MockChannel::default());
        let guard = SubscriptionGuard::subscribe(channel.clone(), VIDEO_MEASUREMENT_ACTION, noop())
            .unwrap();
        let id = guard.id().unwrap();

        guard.release().unwrap();

        assert_eq!(*channel.unsubscribed.lock().unwrap(), vec![id]);
    }

    #[test]
    fn test_drop_unsubscribes_once() {
        let channel = Arc::new(MockChannel::default());
        {
            let _guard =
                SubscriptionGuard::subscribe(channel.clone(), VIDEO_MEASUREMENT_ACTION, noop())
                    .unwrap();
        }
        assert_eq!(channel.subscribed.lock().unwrap().len(), 1);
        assert_eq!(channel.unsubscribed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_notification_deserializes_without_extras() {
        let notification: Notification =
            serde_json::from_str(r#"{"action":"qoe.video_measurement.update"}"#).unwrap();
        assert_eq!(notification.action, VIDEO_MEASUREMENT_ACTION);
        assert!(notification.extras.is_empty());
    }
}
