// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire types for the bridge's CLIP v2 resource API.
//!
//! Every resource response is wrapped in the same envelope of `errors`
//! and `data`; the structs here mirror the bridge's JSON exactly and
//! carry no behavior beyond a few derived accessors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The response envelope every CLIP v2 endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEnvelope<T> {
    /// Errors reported by the bridge; empty on success.
    #[serde(default)]
    pub errors: Vec<ApiError>,
    /// The resources themselves.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> ResourceEnvelope<T> {
    /// Joins all error descriptions, or `None` when the envelope is clean.
    #[must_use]
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.description.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// A single error inside the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable description from the bridge.
    pub description: String,
}

/// Activation status of a scene as the bridge reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneActivation {
    /// The scene is not running.
    Inactive,
    /// The scene is active with fixed light states.
    Static,
    /// The scene is active and cycling through its palette.
    DynamicPalette,
}

impl SceneActivation {
    /// Returns true for either of the active variants.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Static | Self::DynamicPalette)
    }
}

/// Status block of a scene resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneStatus {
    /// Current activation state.
    pub active: Option<SceneActivation>,
    /// When the scene was last recalled, if the bridge remembers.
    pub last_recall: Option<DateTime<Utc>>,
}

/// Metadata block of a scene resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    /// Display name stored on the bridge.
    pub name: Option<String>,
}

/// A scene resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Bridge-assigned scene identifier.
    pub id: String,
    /// Legacy v1 path, when the scene predates CLIP v2.
    pub id_v1: Option<String>,
    /// Scene metadata.
    pub metadata: Option<SceneMetadata>,
    /// Current status; absent on older bridge firmware.
    pub status: Option<SceneStatus>,
}

impl Scene {
    /// Returns true when the bridge reports the scene as running.
    ///
    /// A missing status block counts as inactive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.active)
            .is_some_and(|a| a.is_active())
    }

    /// Returns the display name, falling back to the scene id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// On/off block of a light resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct On {
    /// Whether the light is on.
    pub on: bool,
}

/// Metadata block of a light resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightMetadata {
    /// Display name stored on the bridge.
    pub name: Option<String>,
}

/// A light resource.
///
/// Only the fields scene activation cares about are modeled; the bridge
/// sends many more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    /// Bridge-assigned light identifier.
    pub id: String,
    /// Light metadata.
    pub metadata: Option<LightMetadata>,
    /// On/off state.
    pub on: Option<On>,
}

/// One bridge candidate from the public discovery endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    /// Bridge identifier.
    pub id: String,
    /// LAN address of the bridge.
    #[serde(rename = "internalipaddress")]
    pub internal_ip_address: String,
    /// Port, when the bridge listens off the default.
    pub port: Option<u16>,
}

/// Minimal scene listing entry for the configuration UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    /// Bridge-assigned scene identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl From<&Scene> for SceneSummary {
    fn from(scene: &Scene) -> Self {
        Self {
            id: scene.id.clone(),
            name: scene.display_name().to_string(),
        }
    }
}
