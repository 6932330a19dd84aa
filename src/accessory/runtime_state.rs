// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-scene activation state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

/// How long a local activation outranks the bridge-reported status.
///
/// The bridge's status API lags a recall by several seconds; within this
/// window the switch reports "on" from local memory so the user gets
/// immediate positive feedback.
pub(crate) const ACTIVATION_WINDOW: Duration = Duration::from_secs(30);

/// Mutable runtime state of one scene switch.
///
/// Two independent signals live here: the locally remembered activation
/// timestamp and the in-flight guard serializing concurrent activations.
/// Neither is held across an await point.
#[derive(Debug, Default)]
pub(crate) struct RuntimeState {
    /// When this process last successfully recalled the scene.
    last_activated: RwLock<Option<Instant>>,
    /// True only while a recall call is in flight.
    activating: AtomicBool,
}

impl RuntimeState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stamps a successful activation at the current instant.
    pub(crate) fn mark_activated(&self) {
        *self.last_activated.write() = Some(Instant::now());
    }

    /// Forgets the local activation (switch turned off).
    pub(crate) fn clear_activation(&self) {
        *self.last_activated.write() = None;
    }

    /// Returns true while the local activation window is open.
    pub(crate) fn recently_activated(&self) -> bool {
        self.last_activated
            .read()
            .is_some_and(|at| at.elapsed() < ACTIVATION_WINDOW)
    }

    /// Tries to take the in-flight guard.
    ///
    /// Returns true when this caller acquired it; a false return means
    /// another activation is already running and the caller must back
    /// off.
    pub(crate) fn begin_activation(&self) -> bool {
        !self.activating.swap(true, Ordering::SeqCst)
    }

    /// Releases the in-flight guard.
    pub(crate) fn end_activation(&self) {
        self.activating.store(false, Ordering::SeqCst);
    }

    /// Returns true while an activation is in flight.
    pub(crate) fn is_activating(&self) -> bool {
        self.activating.load(Ordering::SeqCst)
    }
}
