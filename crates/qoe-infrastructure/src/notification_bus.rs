//! In-process notification bus.
//!
//! A `NotificationChannel` backed by a subscriber registry. Producers call
//! `publish` from any thread or task; matching callbacks run synchronously on
//! the publisher's context.

use qoe_core::error::{QoeError, Result};
use qoe_core::notification::{
    Notification, NotificationCallback, NotificationChannel, SubscriptionId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Subscriber {
    action: String,
    callback: NotificationCallback,
    // Cleared on unsubscribe; checked before every delivery.
    active: Arc<AtomicBool>,
}

/// Thread-safe registry of notification subscribers.
#[derive(Default)]
pub struct InMemoryNotificationBus {
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
}

impl InMemoryNotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `notification` to every subscriber of its action.
    ///
    /// Callbacks are invoked after the registry lock is released, so a
    /// callback may subscribe or unsubscribe without deadlocking. A
    /// subscription removed while this call is in progress is skipped if its
    /// callback has not started yet.
    ///
    /// # Returns
    ///
    /// The number of callbacks invoked.
    pub fn publish(&self, notification: &Notification) -> usize {
        let targets: Vec<(Arc<AtomicBool>, NotificationCallback)> = self
            .read()
            .values()
            .filter(|subscriber| subscriber.action == notification.action)
            .map(|subscriber| (Arc::clone(&subscriber.active), subscriber.callback.clone()))
            .collect();

        tracing::debug!(
            "[NotificationBus] Publishing '{}' to {} subscriber(s)",
            notification.action,
            targets.len()
        );
        let mut delivered = 0;
        for (active, callback) in &targets {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            callback(notification);
            delivered += 1;
        }
        delivered
    }

    /// Number of live subscriptions across all actions.
    pub fn subscriber_count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SubscriptionId, Subscriber>> {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SubscriptionId, Subscriber>> {
        self.subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationChannel for InMemoryNotificationBus {
    fn subscribe(&self, action: &str, callback: NotificationCallback) -> Result<SubscriptionId> {
        let id = SubscriptionId::new();
        self.write().insert(
            id,
            Subscriber {
                action: action.to_string(),
                callback,
                active: Arc::new(AtomicBool::new(true)),
            },
        );
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        match self.write().remove(&id) {
            Some(subscriber) => {
                subscriber.active.store(false, Ordering::Release);
                Ok(())
            }
            None => Err(QoeError::channel(format!("unknown subscription {}", id))),
        }
    }
}
