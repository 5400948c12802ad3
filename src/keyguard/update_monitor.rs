//! Event bus delivering keyguard update callbacks to registered views.
//!
//! Each registration owns an unbounded channel. Dispatch fans an event out to
//! every live subscriber; dropping or removing a [`Subscription`] takes it out
//! of the registry, so no event reaches a view after it detached.

use async_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Callbacks the monitor delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    TimeChanged,
    KeyguardVisibilityChanged { showing: bool },
}

type Registry = Mutex<Vec<(u64, Sender<MonitorEvent>)>>;

/// Shared handle to the update monitor. Clones refer to the same registry.
#[derive(Clone, Default)]
pub struct UpdateMonitor {
    registry: Arc<Registry>,
    next_id: Arc<AtomicU64>,
}

impl UpdateMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_callback(&self) -> Subscription {
        let (tx, rx) = async_channel::unbounded();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut registry) = self.registry.lock() {
            registry.push((id, tx));
        }
        log::debug!("Update monitor: registered callback {}", id);
        Subscription {
            id,
            events: rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn remove_callback(&self, subscription: Subscription) {
        drop(subscription);
    }

    pub fn dispatch_time_changed(&self) {
        self.dispatch(MonitorEvent::TimeChanged);
    }

    pub fn dispatch_keyguard_visibility_changed(&self, showing: bool) {
        self.dispatch(MonitorEvent::KeyguardVisibilityChanged { showing });
    }

    fn dispatch(&self, event: MonitorEvent) {
        let Ok(mut registry) = self.registry.lock() else {
            log::warn!("Update monitor registry poisoned, dropping {:?}", event);
            return;
        };
        // Receivers that went away without unregistering are pruned here.
        registry.retain(|(_, tx)| tx.try_send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().map(|r| r.len()).unwrap_or(0)
    }
}

/// A live registration. Unsubscribes when dropped.
pub struct Subscription {
    id: u64,
    events: Receiver<MonitorEvent>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next pending event, if any, without blocking.
    pub fn try_next(&self) -> Option<MonitorEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Receiver for awaiting events from an async task.
    ///
    /// The receiver closes once this subscription is dropped.
    pub fn receiver(&self) -> Receiver<MonitorEvent> {
        self.events.clone()
    }

    /// Equivalent to dropping the subscription.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.lock() {
                registry.retain(|(id, _)| *id != self.id);
            }
        }
        log::debug!("Update monitor: removed callback {}", self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
