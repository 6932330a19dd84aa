// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One scene presented as a binary switch.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SceneConfig;
use crate::error::Result;
use crate::protocol::BridgeClient;
use crate::registry::SwitchHandle;

use super::runtime_state::RuntimeState;

/// Delay before reverting the displayed state after a failed recall.
///
/// The platform updates its own UI optimistically on a toggle; reverting
/// immediately would race that update and be overwritten.
const REVERT_DELAY: Duration = Duration::from_millis(100);

/// Adapts one configured scene to the platform's on/off switch shape.
///
/// The switch owns no network policy of its own; retries live in the
/// [`BridgeClient`]. What it does own is the scene's runtime state: the
/// local activation window and the guard that collapses concurrent
/// activation requests into a single recall.
pub struct SceneSwitch {
    config: SceneConfig,
    client: Arc<BridgeClient>,
    handle: Arc<dyn SwitchHandle>,
    state: RuntimeState,
}

impl SceneSwitch {
    /// Creates a switch for a configured scene.
    pub fn new(
        config: SceneConfig,
        client: Arc<BridgeClient>,
        handle: Arc<dyn SwitchHandle>,
    ) -> Self {
        Self {
            config,
            client,
            handle,
            state: RuntimeState::new(),
        }
    }

    /// Returns the scene id this switch activates.
    #[must_use]
    pub fn scene_id(&self) -> &str {
        &self.config.id
    }

    /// Returns the configured display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns true while an activation is in flight.
    #[must_use]
    pub fn is_activating(&self) -> bool {
        self.state.is_activating()
    }

    /// The platform's "get current value" callback.
    ///
    /// Within 30 seconds of a successful activation the answer is `true`
    /// straight from local memory, no network involved. Beyond the
    /// window the bridge's reported status decides. A failed status
    /// fetch degrades to `false` rather than leaving the switch
    /// indeterminate.
    pub async fn read(&self) -> bool {
        if self.state.recently_activated() {
            return true;
        }

        match self.client.get_scene(&self.config.id).await {
            Ok(scene) => scene.is_active(),
            Err(e) => {
                tracing::warn!(
                    scene_id = %self.config.id,
                    error = %e,
                    "scene status fetch failed, reporting off"
                );
                false
            }
        }
    }

    /// The platform's "set value" callback.
    ///
    /// Turning the switch on recalls the scene with the configured
    /// transition. While a recall is in flight further on-requests are
    /// ignored, first caller wins. On failure the displayed state is
    /// reverted after a short delay and the error surfaces to the
    /// platform as its communication-failure signal.
    ///
    /// Turning the switch off only clears local memory; scenes are
    /// momentary triggers and the bridge has no deactivate call.
    ///
    /// # Errors
    ///
    /// Returns the recall failure when the bridge rejects or cannot be
    /// reached.
    pub async fn write(&self, on: bool) -> Result<()> {
        if !on {
            self.state.clear_activation();
            return Ok(());
        }

        if !self.state.begin_activation() {
            tracing::debug!(
                scene_id = %self.config.id,
                "activation already in flight, ignoring"
            );
            return Ok(());
        }

        let transition_ms = self.config.transition.as_millis();
        let result = self
            .client
            .recall_scene(&self.config.id, Some(transition_ms))
            .await;

        match &result {
            Ok(()) => {
                tracing::debug!(
                    scene_id = %self.config.id,
                    transition_ms,
                    "scene recalled"
                );
                self.state.mark_activated();
            }
            Err(e) => {
                tracing::warn!(
                    scene_id = %self.config.id,
                    error = %e,
                    "scene recall failed, reverting switch"
                );
                self.schedule_revert(!on);
            }
        }

        self.state.end_activation();
        Ok(result?)
    }

    /// Applies a broadcast status update from the poll loop.
    ///
    /// Updates for other scenes are ignored. Matching updates are pushed
    /// straight into the platform's characteristic, bypassing the read
    /// path.
    pub fn handle_status_update(&self, scene_id: &str, is_active: bool) {
        if scene_id != self.config.id {
            return;
        }
        tracing::debug!(scene_id = %scene_id, is_active, "applying broadcast status");
        self.handle.push_state(is_active);
    }

    /// Pushes the opposite state back into the platform after the
    /// platform's own optimistic UI update has settled.
    fn schedule_revert(&self, to: bool) {
        let handle = Arc::clone(&self.handle);
        tokio::spawn(async move {
            tokio::time::sleep(REVERT_DELAY).await;
            handle.push_state(to);
        });
    }
}

impl std::fmt::Debug for SceneSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSwitch")
            .field("scene_id", &self.config.id)
            .field("name", &self.config.name)
            .field("activating", &self.state.is_activating())
            .finish_non_exhaustive()
    }
}
