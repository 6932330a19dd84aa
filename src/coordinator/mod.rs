// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene-state reconciliation.
//!
//! The [`SceneCoordinator`] is the central component tying the library
//! together. It owns the bridge client and the set of configured scenes,
//! and runs the reconciliation cycle:
//!
//! - **Bootstrap**: resolve the bridge (configured address or first
//!   discovery candidate), verify the API key and connectivity, and
//!   register one switch per configured scene the bridge knows.
//!   Failures are terminal for the cycle; the user fixes the
//!   configuration or restarts.
//! - **Polling**: a recurring fetch of the bridge's scene list, with
//!   overlap protection, broadcasting `(scene_id, is_active)` to every
//!   registered switch.
//! - **Reconciliation**: cached platform registrations whose scene is no
//!   longer configured are unregistered; newly configured scenes get
//!   fresh registrations.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use huescenes_lib::config::PlatformConfig;
//! use huescenes_lib::coordinator::SceneCoordinator;
//! # use huescenes_lib::registry::{AccessoryRegistration, CachedAccessory, DeviceRegistry, SwitchHandle};
//! # struct MyRegistry;
//! # impl DeviceRegistry for MyRegistry {
//! #     fn cached_accessories(&self) -> Vec<CachedAccessory> { Vec::new() }
//! #     fn register(&self, _: &AccessoryRegistration) -> Arc<dyn SwitchHandle> { unimplemented!() }
//! #     fn unregister(&self, _: uuid::Uuid) {}
//! # }
//!
//! # async fn example(config: PlatformConfig) -> huescenes_lib::Result<()> {
//! let coordinator = SceneCoordinator::new(config, Arc::new(MyRegistry));
//! coordinator.handle_platform_ready().await?;
//!
//! // ... platform runs ...
//!
//! coordinator.shutdown();
//! # Ok(())
//! # }
//! ```

mod scene_coordinator;

pub use scene_coordinator::{CoordinatorState, SceneCoordinator};
