// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device-registry boundary to the host smart-home platform.
//!
//! The host platform owns accessory lifetimes, persists registrations
//! across process restarts, and calls back into the library when a user
//! toggles a switch. The library only needs the narrow surface modeled
//! here: enumerate what the registry restored from cache, register and
//! unregister switches, and push displayed state into a registered
//! switch.
//!
//! Registration identity is a deterministic UUID derived from the scene
//! id, so a restarted process reattaches to the same persisted entries.

use std::sync::Arc;

use uuid::Uuid;

/// Handle to one registered switch's displayed state.
///
/// Pushing a value updates what the platform shows for the switch
/// without going through the read path.
pub trait SwitchHandle: Send + Sync {
    /// Sets the displayed on/off state.
    fn push_state(&self, on: bool);
}

/// The accessory/characteristic layer of the host platform.
pub trait DeviceRegistry: Send + Sync {
    /// Returns the registrations the platform restored from its cache.
    fn cached_accessories(&self) -> Vec<CachedAccessory>;

    /// Registers a switch, reusing a cached entry with the same UUID if
    /// one exists. Returns the handle for pushing displayed state.
    fn register(&self, registration: &AccessoryRegistration) -> Arc<dyn SwitchHandle>;

    /// Removes a registration, cached or live.
    fn unregister(&self, uuid: Uuid);
}

/// Identity and display data for one switch registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryRegistration {
    /// Deterministic registration UUID.
    pub uuid: Uuid,
    /// The scene this switch activates.
    pub scene_id: String,
    /// Name shown to the user.
    pub display_name: String,
}

impl AccessoryRegistration {
    /// Creates a registration for a scene, deriving the UUID.
    pub fn new(scene_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let scene_id = scene_id.into();
        Self {
            uuid: accessory_uuid(&scene_id),
            scene_id,
            display_name: display_name.into(),
        }
    }
}

/// A registration restored from the platform's cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAccessory {
    /// Registration UUID.
    pub uuid: Uuid,
    /// The scene id the entry was created for.
    pub scene_id: String,
}

/// Derives the stable registration UUID for a scene id.
///
/// The same scene id always yields the same UUID, across processes and
/// machines, so cached registry entries survive restarts.
#[must_use]
pub fn accessory_uuid(scene_id: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("hue-scene-switch:{scene_id}").as_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessory_uuid_is_deterministic() {
        assert_eq!(accessory_uuid("scene-1"), accessory_uuid("scene-1"));
    }

    #[test]
    fn accessory_uuid_differs_per_scene() {
        assert_ne!(accessory_uuid("scene-1"), accessory_uuid("scene-2"));
    }

    #[test]
    fn registration_derives_uuid_from_scene_id() {
        let registration = AccessoryRegistration::new("scene-1", "Sunset");
        assert_eq!(registration.uuid, accessory_uuid("scene-1"));
        assert_eq!(registration.display_name, "Sunset");
    }
}
