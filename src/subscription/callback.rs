// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for scene status broadcasts.
//!
//! The coordinator fans poll results out to every registered accessory
//! through the [`StatusBus`]: an explicit observer registry whose
//! callbacks run synchronously, in registration order.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Unique identifier for a subscription.
///
/// Returned when registering a listener; pass it back to unsubscribe.
/// Ids are monotonically increasing, which is also what keeps broadcast
/// delivery in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for scene status callbacks.
type StatusCallback = Arc<dyn Fn(&str, bool) + Send + Sync>;

/// Observer registry for scene status updates.
///
/// Listeners receive `(scene_id, is_active)` pairs. Delivery is
/// synchronous and in registration order; a listener must not block.
/// Cloning the bus shares the underlying registry.
///
/// # Examples
///
/// ```
/// use huescenes_lib::subscription::StatusBus;
///
/// let bus = StatusBus::new();
///
/// let id = bus.subscribe(|scene_id, active| {
///     println!("{scene_id} is now {}", if active { "on" } else { "off" });
/// });
///
/// bus.publish("scene-1", true);
/// bus.unsubscribe(id);
/// ```
pub struct StatusBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Registered listeners, iterated in registration order.
    listeners: RwLock<BTreeMap<SubscriptionId, StatusCallback>>,
}

impl StatusBus {
    /// Creates a new empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(1),
                listeners: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// Registers a listener for scene status updates.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.write().insert(id, Arc::new(callback));
        id
    }

    /// Removes a listener.
    ///
    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.write().remove(&id).is_some()
    }

    /// Removes all listeners.
    pub fn clear(&self) {
        self.inner.listeners.write().clear();
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Delivers a status update to every listener, in registration
    /// order.
    ///
    /// Callbacks are cloned out before invocation so none of them runs
    /// under the registry lock.
    pub fn publish(&self, scene_id: &str, is_active: bool) {
        let callbacks: Vec<StatusCallback> =
            self.inner.listeners.read().values().cloned().collect();
        for callback in callbacks {
            callback(scene_id, is_active);
        }
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StatusBus {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
