// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types for the scene platform.
//!
//! Configuration arrives already parsed from the host platform. This
//! module provides the constrained value types and the structs the rest
//! of the library consumes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Scene transition duration in minutes (1-60).
///
/// The bridge expects transition durations in milliseconds; the user
/// configures them in whole minutes. The conversion happens exactly once,
/// here.
///
/// # Examples
///
/// ```
/// use huescenes_lib::config::TransitionDuration;
///
/// let duration = TransitionDuration::new(5).unwrap();
/// assert_eq!(duration.minutes(), 5);
/// assert_eq!(duration.as_millis(), 300_000);
///
/// // Invalid values return error
/// assert!(TransitionDuration::new(0).is_err());
/// assert!(TransitionDuration::new(61).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TransitionDuration(u64);

impl TransitionDuration {
    /// Minimum transition duration (1 minute).
    pub const MIN: Self = Self(1);

    /// Maximum transition duration (60 minutes).
    pub const MAX: Self = Self(60);

    /// Creates a new transition duration.
    ///
    /// # Arguments
    ///
    /// * `minutes` - The transition duration in minutes (1-60)
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside 1-60.
    pub fn new(minutes: u64) -> Result<Self, ValueError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&minutes) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN.0,
                max: Self::MAX.0,
                actual: minutes,
            });
        }
        Ok(Self(minutes))
    }

    /// Returns the duration in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u64 {
        self.0
    }

    /// Returns the duration in milliseconds, as the bridge expects it.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0 * 60_000
    }
}

impl TryFrom<u64> for TransitionDuration {
    type Error = ValueError;

    fn try_from(minutes: u64) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<TransitionDuration> for u64 {
    fn from(duration: TransitionDuration) -> Self {
        duration.minutes()
    }
}

impl fmt::Display for TransitionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}min", self.0)
    }
}

/// Bridge polling interval in milliseconds (60 000 - 300 000).
///
/// # Examples
///
/// ```
/// use huescenes_lib::config::PollInterval;
///
/// let interval = PollInterval::new(120_000).unwrap();
/// assert_eq!(interval.as_millis(), 120_000);
///
/// // Out-of-range values are corrected by `clamped`
/// assert_eq!(PollInterval::clamped(30_000).as_millis(), 60_000);
/// assert_eq!(PollInterval::clamped(500_000).as_millis(), 300_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollInterval(u64);

impl PollInterval {
    /// Minimum polling interval (1 minute).
    pub const MIN: Self = Self(60_000);

    /// Maximum polling interval (5 minutes).
    pub const MAX: Self = Self(300_000);

    /// Default polling interval (1 minute).
    pub const DEFAULT: Self = Self(60_000);

    /// Creates a new polling interval.
    ///
    /// # Arguments
    ///
    /// * `millis` - The interval in milliseconds (60 000 - 300 000)
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside the
    /// allowed range.
    pub fn new(millis: u64) -> Result<Self, ValueError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&millis) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN.0,
                max: Self::MAX.0,
                actual: millis,
            });
        }
        Ok(Self(millis))
    }

    /// Creates a polling interval, clamping to the valid range.
    ///
    /// Out-of-range values are corrected and the correction is logged.
    #[must_use]
    pub fn clamped(millis: u64) -> Self {
        let corrected = millis.clamp(Self::MIN.0, Self::MAX.0);
        if corrected != millis {
            tracing::warn!(
                configured = millis,
                corrected,
                "polling interval out of range, corrected"
            );
        }
        Self(corrected)
    }

    /// Returns the interval in milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the interval as a `Duration`.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// One user-configured scene.
///
/// The identifier must match a scene id on the bridge; scenes the bridge
/// does not know are skipped at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// The bridge's scene identifier.
    pub id: String,
    /// Display name for the switch.
    pub name: String,
    /// Transition duration applied when the scene is recalled.
    #[serde(rename = "transitionDuration")]
    pub transition: TransitionDuration,
}

impl SceneConfig {
    /// Creates a new scene configuration.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        transition: TransitionDuration,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            transition,
        }
    }
}

/// Complete platform configuration, as handed over by the host.
///
/// Bridge address and API key are optional: both can be absent on a fresh
/// install, and the coordinator resolves or rejects them during bootstrap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Bridge host or IP address. Resolved via discovery when absent.
    #[serde(rename = "bridgeAddress")]
    pub bridge_address: Option<String>,
    /// Application key for the CLIP v2 API. Required for bootstrap.
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    /// The scenes to expose as switches.
    pub scenes: Vec<SceneConfig>,
    /// Raw polling interval in milliseconds; clamped before use.
    #[serde(rename = "pollingInterval", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Enables verbose logging in the host platform.
    pub debug: bool,
}

fn default_poll_interval_ms() -> u64 {
    PollInterval::DEFAULT.as_millis()
}

impl PlatformConfig {
    /// Returns the polling interval, corrected into the valid range.
    #[must_use]
    pub fn poll_interval(&self) -> PollInterval {
        PollInterval::clamped(self.poll_interval_ms)
    }

    /// Returns the configured scene with the given id, if any.
    #[must_use]
    pub fn scene(&self, id: &str) -> Option<&SceneConfig> {
        self.scenes.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_duration_valid_range() {
        assert!(TransitionDuration::new(1).is_ok());
        assert!(TransitionDuration::new(60).is_ok());
        assert!(TransitionDuration::new(0).is_err());
        assert!(TransitionDuration::new(61).is_err());
    }

    #[test]
    fn transition_duration_millis_conversion() {
        for minutes in 1..=60 {
            let duration = TransitionDuration::new(minutes).unwrap();
            assert_eq!(duration.as_millis(), minutes * 60_000);
        }
    }

    #[test]
    fn transition_duration_display() {
        let duration = TransitionDuration::new(10).unwrap();
        assert_eq!(duration.to_string(), "10min");
    }

    #[test]
    fn transition_duration_deserializes_from_integer() {
        let duration: TransitionDuration = serde_json::from_str("5").unwrap();
        assert_eq!(duration.minutes(), 5);
    }

    #[test]
    fn transition_duration_rejects_invalid_integer() {
        assert!(serde_json::from_str::<TransitionDuration>("0").is_err());
        assert!(serde_json::from_str::<TransitionDuration>("99").is_err());
    }

    #[test]
    fn poll_interval_valid_range() {
        assert!(PollInterval::new(60_000).is_ok());
        assert!(PollInterval::new(300_000).is_ok());
        assert!(PollInterval::new(59_999).is_err());
        assert!(PollInterval::new(300_001).is_err());
    }

    #[test]
    fn poll_interval_clamps_low_values() {
        assert_eq!(PollInterval::clamped(30_000), PollInterval::MIN);
    }

    #[test]
    fn poll_interval_clamps_high_values() {
        assert_eq!(PollInterval::clamped(500_000), PollInterval::MAX);
    }

    #[test]
    fn poll_interval_passes_valid_values_through() {
        assert_eq!(PollInterval::clamped(120_000).as_millis(), 120_000);
    }

    #[test]
    fn platform_config_defaults() {
        let config: PlatformConfig = serde_json::from_str("{}").unwrap();
        assert!(config.bridge_address.is_none());
        assert!(config.api_key.is_none());
        assert!(config.scenes.is_empty());
        assert_eq!(config.poll_interval_ms, 60_000);
        assert!(!config.debug);
    }

    #[test]
    fn platform_config_deserializes_scenes() {
        let json = r#"{
            "bridgeAddress": "192.168.1.2",
            "apiKey": "secret",
            "scenes": [
                {"id": "abc", "name": "Sunset", "transitionDuration": 15}
            ],
            "pollingInterval": 120000
        }"#;
        let config: PlatformConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.bridge_address.as_deref(), Some("192.168.1.2"));
        assert_eq!(config.scenes.len(), 1);
        assert_eq!(config.scenes[0].transition.as_millis(), 900_000);
        assert_eq!(config.poll_interval().as_millis(), 120_000);
    }

    #[test]
    fn platform_config_scene_lookup() {
        let config = PlatformConfig {
            scenes: vec![SceneConfig::new(
                "abc",
                "Sunset",
                TransitionDuration::new(5).unwrap(),
            )],
            ..PlatformConfig::default()
        };

        assert!(config.scene("abc").is_some());
        assert!(config.scene("missing").is_none());
    }
}
