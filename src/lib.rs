// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `HueScenes` Lib - expose Philips Hue scenes as smart-home switches.
//!
//! This library turns lighting scenes stored on a Hue bridge into on/off
//! switches for a smart-home platform, adding the one feature such
//! platforms lack: gradual, multi-minute transitions into a scene
//! instead of instant activation.
//!
//! # What it does
//!
//! - **Bridge client**: the CLIP v2 resource API with classification of
//!   every failure mode and automatic retry of transient ones
//! - **Scene switches**: each configured scene becomes a switch that
//!   recalls the scene with its configured transition when turned on
//! - **Reconciliation**: a recurring poll keeps every switch in sync
//!   with scene changes made outside the platform (Hue app, wall
//!   dimmers, automations)
//! - **Bootstrap**: bridge discovery and link-button pairing for fresh
//!   installs
//!
//! # Quick Start
//!
//! ## Talking to the bridge directly
//!
//! ```no_run
//! use huescenes_lib::protocol::BridgeClient;
//!
//! #[tokio::main]
//! async fn main() -> huescenes_lib::Result<()> {
//!     let client = BridgeClient::new("192.168.1.2", "app-key")?;
//!
//!     for scene in client.get_scenes().await? {
//!         println!("{}: {}", scene.id, scene.display_name());
//!     }
//!
//!     // Recall a scene with a five-minute transition
//!     client.recall_scene("scene-id", Some(300_000)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pairing with a bridge
//!
//! ```no_run
//! use huescenes_lib::discovery;
//!
//! #[tokio::main]
//! async fn main() -> huescenes_lib::Result<()> {
//!     let bridges = discovery::discover_bridges().await?;
//!     let bridge = bridges.first().expect("no bridge on this network");
//!
//!     // Press the bridge's link button first
//!     let key = discovery::create_api_key(
//!         &bridge.internal_ip_address,
//!         "huescenes",
//!         "living-room-pi",
//!     )
//!     .await?;
//!     println!("API key: {key}");
//!     Ok(())
//! }
//! ```
//!
//! ## Running the full platform cycle
//!
//! The coordinator needs an implementation of
//! [`registry::DeviceRegistry`] — the adapter to the host platform's
//! accessory layer — and a [`config::PlatformConfig`]:
//!
//! ```ignore
//! let coordinator = SceneCoordinator::new(config, registry);
//!
//! // Once the platform has restored cached accessories:
//! coordinator.handle_platform_ready().await?;
//!
//! // On platform shutdown:
//! coordinator.shutdown();
//! ```

pub mod accessory;
pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod lister;
pub mod protocol;
pub mod registry;
pub mod resource;
pub mod subscription;

pub use accessory::SceneSwitch;
pub use config::{PlatformConfig, PollInterval, SceneConfig, TransitionDuration};
pub use coordinator::{CoordinatorState, SceneCoordinator};
pub use error::{BridgeError, Error, Result, ValueError};
pub use protocol::{BridgeClient, BridgeClientBuilder, RetryPolicy};
pub use registry::{AccessoryRegistration, CachedAccessory, DeviceRegistry, SwitchHandle};
pub use resource::{DiscoveredBridge, Scene, SceneActivation, SceneStatus, SceneSummary};
pub use subscription::{StatusBus, SubscriptionId};
