// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The reconciliation coordinator.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::accessory::SceneSwitch;
use crate::config::PlatformConfig;
use crate::discovery;
use crate::error::{BridgeError, Error, Result};
use crate::protocol::BridgeClient;
use crate::registry::{AccessoryRegistration, DeviceRegistry};
use crate::resource::Scene;
use crate::subscription::StatusBus;

/// Lifecycle state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Nothing has happened yet.
    Uninitialized,
    /// Determining which bridge to talk to.
    ResolvingBridge,
    /// Verifying credentials and connectivity.
    Connecting,
    /// Accessories registered, poll loop running.
    Ready,
    /// Shutdown requested; the poll loop is stopped.
    ShuttingDown,
}

impl CoordinatorState {
    /// Returns true once bootstrap completed successfully.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Owns the bridge client, the configured scenes, and the poll loop.
///
/// The coordinator drives the whole reconciliation cycle: it resolves
/// the bridge during bootstrap, registers one [`SceneSwitch`] per
/// configured scene the bridge knows, and keeps every switch's displayed
/// state in sync with the bridge through a recurring poll that fans
/// status updates out over the [`StatusBus`].
///
/// Bootstrap failures are terminal for the cycle: they are logged and
/// returned, nothing is registered, and recovery requires a
/// configuration change or a process restart.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use huescenes_lib::config::PlatformConfig;
/// use huescenes_lib::coordinator::SceneCoordinator;
/// # use huescenes_lib::registry::{AccessoryRegistration, CachedAccessory, DeviceRegistry, SwitchHandle};
/// # struct MyRegistry;
/// # impl DeviceRegistry for MyRegistry {
/// #     fn cached_accessories(&self) -> Vec<CachedAccessory> { Vec::new() }
/// #     fn register(&self, _: &AccessoryRegistration) -> Arc<dyn SwitchHandle> { unimplemented!() }
/// #     fn unregister(&self, _: uuid::Uuid) {}
/// # }
///
/// # async fn example(config: PlatformConfig) -> huescenes_lib::Result<()> {
/// let registry = Arc::new(MyRegistry);
/// let coordinator = SceneCoordinator::new(config, registry);
///
/// // Fired once by the platform after cached accessories are restored.
/// coordinator.handle_platform_ready().await?;
/// # Ok(())
/// # }
/// ```
pub struct SceneCoordinator {
    config: PlatformConfig,
    registry: Arc<dyn DeviceRegistry>,
    state: RwLock<CoordinatorState>,
    client: RwLock<Option<Arc<BridgeClient>>>,
    switches: RwLock<HashMap<String, Arc<SceneSwitch>>>,
    status_bus: StatusBus,
    poll_busy: Arc<AtomicBool>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl SceneCoordinator {
    /// Creates a coordinator over the given configuration and registry.
    ///
    /// Nothing touches the network until
    /// [`handle_platform_ready`](Self::handle_platform_ready).
    pub fn new(config: PlatformConfig, registry: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            config,
            registry,
            state: RwLock::new(CoordinatorState::Uninitialized),
            client: RwLock::new(None),
            switches: RwLock::new(HashMap::new()),
            status_bus: StatusBus::new(),
            poll_busy: Arc::new(AtomicBool::new(false)),
            poll_task: Mutex::new(None),
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        *self.state.read()
    }

    /// Returns the status bus accessories are subscribed on.
    #[must_use]
    pub fn status_bus(&self) -> &StatusBus {
        &self.status_bus
    }

    /// Returns the switch for a scene id, if one was registered.
    #[must_use]
    pub fn switch(&self, scene_id: &str) -> Option<Arc<SceneSwitch>> {
        self.switches.read().get(scene_id).cloned()
    }

    /// Returns the number of registered switches.
    #[must_use]
    pub fn switch_count(&self) -> usize {
        self.switches.read().len()
    }

    /// Returns true while the poll loop is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll_task.lock().is_some()
    }

    /// Bootstraps the coordinator.
    ///
    /// Fired once by the platform after it finished restoring cached
    /// accessories. Resolves the bridge address (configured value, else
    /// first discovery candidate), requires an API key, verifies
    /// connectivity, registers accessories against the bridge's scene
    /// list, and starts the poll loop.
    ///
    /// # Errors
    ///
    /// Any bootstrap failure is logged and returned; the coordinator
    /// stays out of `Ready` and nothing is registered. There is no
    /// automatic retry.
    pub async fn handle_platform_ready(&self) -> Result<()> {
        self.set_state(CoordinatorState::ResolvingBridge);

        let address = match self.resolve_bridge_address().await {
            Ok(address) => address,
            Err(e) => {
                tracing::error!(error = %e, "bridge resolution failed, platform stays inactive");
                self.set_state(CoordinatorState::Uninitialized);
                return Err(e.into());
            }
        };

        let Some(api_key) = self.config.api_key.clone() else {
            tracing::error!(
                "no API key configured; press the bridge's link button, pair, and set the key"
            );
            self.set_state(CoordinatorState::Uninitialized);
            return Err(Error::MissingApiKey);
        };

        self.set_state(CoordinatorState::Connecting);

        let client = match BridgeClient::new(&address, api_key) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::error!(error = %e, "bridge client construction failed");
                self.set_state(CoordinatorState::Uninitialized);
                return Err(e.into());
            }
        };
        if !client.test_connection().await {
            tracing::error!(address = %address, "bridge connectivity test failed");
            self.set_state(CoordinatorState::Uninitialized);
            return Err(Error::Bridge(BridgeError::Connection(format!(
                "connectivity test against {address} failed"
            ))));
        }

        let bridge_scenes = client.get_scenes().await.map_err(|e| {
            tracing::error!(error = %e, "initial scene fetch failed");
            self.set_state(CoordinatorState::Uninitialized);
            Error::from(e)
        })?;

        self.register_accessories(&client, &bridge_scenes);
        *self.client.write() = Some(Arc::clone(&client));

        self.set_state(CoordinatorState::Ready);
        self.start_polling();
        Ok(())
    }

    /// Starts the recurring poll loop.
    ///
    /// Idempotent: calling while a loop is already running is a no-op.
    /// The first poll fires immediately, then the configured (clamped)
    /// interval applies.
    pub fn start_polling(&self) {
        let mut task = self.poll_task.lock();
        if task.is_some() {
            tracing::debug!("poll loop already running");
            return;
        }

        let Some(client) = self.client.read().clone() else {
            tracing::debug!("no bridge client yet, not polling");
            return;
        };

        let interval = self.config.poll_interval();
        let configured: Vec<String> = self.config.scenes.iter().map(|s| s.id.clone()).collect();
        let bus = self.status_bus.clone();
        let busy = Arc::clone(&self.poll_busy);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.as_duration());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll_once(&client, &configured, &bus, &busy).await;
            }
        });
        *task = Some(handle);

        tracing::debug!(interval = %interval, "poll loop started");
    }

    /// Runs a single poll tick right now.
    ///
    /// Subject to the same overlap protection as the recurring loop: if
    /// a tick is already in flight this call returns without fetching.
    pub async fn poll_now(&self) {
        let Some(client) = self.client.read().clone() else {
            return;
        };
        let configured: Vec<String> = self.config.scenes.iter().map(|s| s.id.clone()).collect();
        poll_once(&client, &configured, &self.status_bus, &self.poll_busy).await;
    }

    /// Stops the poll loop and detaches all broadcast listeners.
    ///
    /// Registered accessories are left alone; the platform owns their
    /// lifetime beyond this process.
    pub fn shutdown(&self) {
        self.set_state(CoordinatorState::ShuttingDown);

        if let Some(task) = self.poll_task.lock().take() {
            task.abort();
        }
        self.status_bus.clear();

        tracing::info!("coordinator shut down");
    }

    /// Resolves the bridge address from configuration or discovery.
    async fn resolve_bridge_address(&self) -> std::result::Result<String, BridgeError> {
        if let Some(address) = &self.config.bridge_address {
            tracing::debug!(address = %address, "using configured bridge address");
            return Ok(address.clone());
        }

        let bridges = discovery::discover_bridges().await?;
        let Some(bridge) = bridges.first() else {
            return Err(BridgeError::Discovery(
                "no bridges found; configure an address".to_string(),
            ));
        };

        tracing::info!(
            bridge_id = %bridge.id,
            address = %bridge.internal_ip_address,
            "using first discovered bridge"
        );
        Ok(bridge.internal_ip_address.clone())
    }

    /// Builds switches for configured scenes the bridge knows and
    /// reconciles the platform's cached registrations.
    fn register_accessories(&self, client: &Arc<BridgeClient>, bridge_scenes: &[Scene]) {
        let mut switches = HashMap::new();

        for scene_config in &self.config.scenes {
            if !bridge_scenes.iter().any(|s| s.id == scene_config.id) {
                tracing::warn!(
                    scene_id = %scene_config.id,
                    name = %scene_config.name,
                    "configured scene not found on bridge, skipping"
                );
                continue;
            }

            let registration =
                AccessoryRegistration::new(&scene_config.id, &scene_config.name);
            let handle = self.registry.register(&registration);
            let switch = Arc::new(SceneSwitch::new(
                scene_config.clone(),
                Arc::clone(client),
                handle,
            ));

            let subscriber = Arc::clone(&switch);
            self.status_bus.subscribe(move |scene_id, is_active| {
                subscriber.handle_status_update(scene_id, is_active);
            });

            tracing::info!(
                scene_id = %scene_config.id,
                name = %scene_config.name,
                "registered scene switch"
            );
            switches.insert(scene_config.id.clone(), switch);
        }

        for cached in self.registry.cached_accessories() {
            if self.config.scene(&cached.scene_id).is_none() {
                tracing::info!(
                    scene_id = %cached.scene_id,
                    "unregistering accessory for removed scene"
                );
                self.registry.unregister(cached.uuid);
            }
        }

        *self.switches.write() = switches;
    }

    fn set_state(&self, state: CoordinatorState) {
        *self.state.write() = state;
    }
}

impl Drop for SceneCoordinator {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.lock().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for SceneCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneCoordinator")
            .field("state", &self.state())
            .field("switches", &self.switch_count())
            .field("polling", &self.is_polling())
            .finish_non_exhaustive()
    }
}

/// One poll tick: fetch, evaluate, broadcast.
///
/// Skips entirely when the previous tick is still in flight; a slow
/// bridge degrades polling frequency instead of piling up requests. A
/// failed fetch ends the tick without broadcasting, so every switch
/// keeps its previous state until the next tick.
async fn poll_once(
    client: &BridgeClient,
    configured: &[String],
    bus: &StatusBus,
    busy: &AtomicBool,
) {
    if busy
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        tracing::debug!("previous poll tick still in flight, skipping");
        return;
    }

    match client.get_scenes().await {
        Ok(scenes) => {
            for scene in &scenes {
                if configured.iter().any(|id| id == &scene.id) {
                    bus.publish(&scene.id, scene.is_active());
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "scene poll failed, keeping previous state");
        }
    }

    busy.store(false, Ordering::SeqCst);
}
