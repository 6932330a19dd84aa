// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the reconciliation coordinator, using wiremock
//! and a recording registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use huescenes_lib::config::{PlatformConfig, SceneConfig, TransitionDuration};
use huescenes_lib::coordinator::{CoordinatorState, SceneCoordinator};
use huescenes_lib::error::{BridgeError, Error};
use huescenes_lib::registry::{
    AccessoryRegistration, CachedAccessory, DeviceRegistry, SwitchHandle, accessory_uuid,
};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every state pushed into one switch's characteristic.
#[derive(Default)]
struct RecordingHandle {
    states: Mutex<Vec<bool>>,
}

impl RecordingHandle {
    fn pushed(&self) -> Vec<bool> {
        self.states.lock().unwrap().clone()
    }
}

impl SwitchHandle for RecordingHandle {
    fn push_state(&self, on: bool) {
        self.states.lock().unwrap().push(on);
    }
}

/// In-memory registry recording registrations and unregistrations.
#[derive(Default)]
struct RecordingRegistry {
    cached: Mutex<Vec<CachedAccessory>>,
    registered: Mutex<Vec<AccessoryRegistration>>,
    unregistered: Mutex<Vec<Uuid>>,
    handles: Mutex<HashMap<String, Arc<RecordingHandle>>>,
}

impl RecordingRegistry {
    fn with_cached(cached: Vec<CachedAccessory>) -> Self {
        Self {
            cached: Mutex::new(cached),
            ..Self::default()
        }
    }

    fn registered_scene_ids(&self) -> Vec<String> {
        self.registered
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.scene_id.clone())
            .collect()
    }

    fn unregistered(&self) -> Vec<Uuid> {
        self.unregistered.lock().unwrap().clone()
    }

    fn handle(&self, scene_id: &str) -> Option<Arc<RecordingHandle>> {
        self.handles.lock().unwrap().get(scene_id).cloned()
    }
}

impl DeviceRegistry for RecordingRegistry {
    fn cached_accessories(&self) -> Vec<CachedAccessory> {
        self.cached.lock().unwrap().clone()
    }

    fn register(&self, registration: &AccessoryRegistration) -> Arc<dyn SwitchHandle> {
        let handle = Arc::new(RecordingHandle::default());
        self.handles
            .lock()
            .unwrap()
            .insert(registration.scene_id.clone(), handle.clone());
        self.registered.lock().unwrap().push(registration.clone());
        handle
    }

    fn unregister(&self, uuid: Uuid) {
        self.unregistered.lock().unwrap().push(uuid);
    }
}

fn config_for(server: &MockServer, scene_ids: &[&str]) -> PlatformConfig {
    PlatformConfig {
        bridge_address: Some(server.uri()),
        api_key: Some("test-key".to_string()),
        scenes: scene_ids
            .iter()
            .map(|id| {
                SceneConfig::new(*id, format!("Scene {id}"), TransitionDuration::new(5).unwrap())
            })
            .collect(),
        ..PlatformConfig::default()
    }
}

fn scene_list(entries: &[(&str, &str)]) -> serde_json::Value {
    let data: Vec<serde_json::Value> = entries
        .iter()
        .map(|(id, status)| {
            serde_json::json!({
                "id": id,
                "metadata": {"name": format!("Scene {id}")},
                "status": {"active": status}
            })
        })
        .collect();
    serde_json::json!({"errors": [], "data": data})
}

async fn mount_healthy_bridge(server: &MockServer, entries: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/clip/v2/resource"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/clip/v2/resource/scene"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scene_list(entries)))
        .mount(server)
        .await;
}

/// Waits out the poll loop's immediate first tick.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

// ============================================================================
// Bootstrap
// ============================================================================

mod bootstrap {
    use super::*;

    #[tokio::test]
    async fn registers_configured_scenes_present_on_bridge() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive"), ("scene-2", "static")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1", "scene-2"]), registry.clone());

        coordinator.handle_platform_ready().await.unwrap();

        assert_eq!(coordinator.state(), CoordinatorState::Ready);
        assert_eq!(coordinator.switch_count(), 2);
        assert!(coordinator.is_polling());
        assert_eq!(registry.registered_scene_ids(), vec!["scene-1", "scene-2"]);

        coordinator.shutdown();
    }

    #[tokio::test]
    async fn scene_unknown_to_bridge_is_skipped() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1", "ghost"]), registry.clone());

        coordinator.handle_platform_ready().await.unwrap();

        // The missing scene is skipped, the rest registers normally.
        assert_eq!(coordinator.state(), CoordinatorState::Ready);
        assert_eq!(registry.registered_scene_ids(), vec!["scene-1"]);
        assert!(coordinator.switch("ghost").is_none());

        coordinator.shutdown();
    }

    #[tokio::test]
    async fn stale_cached_accessories_are_unregistered() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive")]).await;

        let stale_uuid = accessory_uuid("removed-scene");
        let registry = Arc::new(RecordingRegistry::with_cached(vec![
            CachedAccessory {
                uuid: accessory_uuid("scene-1"),
                scene_id: "scene-1".to_string(),
            },
            CachedAccessory {
                uuid: stale_uuid,
                scene_id: "removed-scene".to_string(),
            },
        ]));
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());

        coordinator.handle_platform_ready().await.unwrap();

        assert_eq!(registry.unregistered(), vec![stale_uuid]);

        coordinator.shutdown();
    }

    #[tokio::test]
    async fn failed_connectivity_test_is_terminal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clip/v2/resource"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());

        let result = coordinator.handle_platform_ready().await;

        assert!(matches!(
            result,
            Err(Error::Bridge(BridgeError::Connection(_)))
        ));
        assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);
        assert!(registry.registered_scene_ids().is_empty());
        assert!(!coordinator.is_polling());
    }

    #[tokio::test]
    async fn missing_api_key_registers_nothing() {
        let server = MockServer::start().await;

        let config = PlatformConfig {
            api_key: None,
            ..config_for(&server, &["scene-1"])
        };
        let registry = Arc::new(RecordingRegistry::default());
        let coordinator = SceneCoordinator::new(config, registry.clone());

        let result = coordinator.handle_platform_ready().await;

        assert!(matches!(result, Err(Error::MissingApiKey)));
        assert!(registry.registered_scene_ids().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

// ============================================================================
// Polling
// ============================================================================

mod polling {
    use super::*;

    #[tokio::test]
    async fn poll_broadcasts_bridge_status_to_switches() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());
        coordinator.handle_platform_ready().await.unwrap();
        settle().await;

        // The scene turns active outside the platform.
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/clip/v2/resource/scene"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(scene_list(&[("scene-1", "static")])),
            )
            .mount(&server)
            .await;

        coordinator.poll_now().await;

        let handle = registry.handle("scene-1").unwrap();
        assert_eq!(handle.pushed().last(), Some(&true));

        coordinator.shutdown();
    }

    #[tokio::test]
    async fn unconfigured_bridge_scenes_are_not_broadcast() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive"), ("other", "static")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());
        coordinator.handle_platform_ready().await.unwrap();
        settle().await;

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        coordinator.status_bus().subscribe(move |scene_id, active| {
            sink.lock().unwrap().push((scene_id.to_string(), active));
        });

        coordinator.poll_now().await;

        let received = received.lock().unwrap().clone();
        assert_eq!(received, vec![("scene-1".to_string(), false)]);

        coordinator.shutdown();
    }

    #[tokio::test]
    async fn failed_poll_broadcasts_nothing_and_recovers() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());
        coordinator.handle_platform_ready().await.unwrap();
        settle().await;
        let handle = registry.handle("scene-1").unwrap();
        let before = handle.pushed().len();

        // Tick against a failing bridge: no broadcast, state holds.
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/clip/v2/resource/scene"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        coordinator.poll_now().await;
        assert_eq!(handle.pushed().len(), before);

        // The next tick proceeds normally.
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/clip/v2/resource/scene"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(scene_list(&[("scene-1", "static")])),
            )
            .mount(&server)
            .await;

        coordinator.poll_now().await;
        assert_eq!(handle.pushed().last(), Some(&true));

        coordinator.shutdown();
    }

    #[tokio::test]
    async fn overlapping_ticks_fetch_only_once() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());
        coordinator.handle_platform_ready().await.unwrap();
        settle().await;

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/clip/v2/resource/scene"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(scene_list(&[("scene-1", "inactive")]))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        // The second tick starts while the first fetch is unresolved and
        // must not issue another request.
        tokio::join!(coordinator.poll_now(), coordinator.poll_now());

        server.verify().await;
        coordinator.shutdown();
    }

    #[tokio::test]
    async fn second_start_polling_is_a_noop() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());
        coordinator.handle_platform_ready().await.unwrap();
        settle().await;

        // A fresh loop would fire an immediate poll; none may happen.
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/clip/v2/resource/scene"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(scene_list(&[("scene-1", "inactive")])),
            )
            .expect(0)
            .mount(&server)
            .await;

        coordinator.start_polling();
        settle().await;

        server.verify().await;
        assert!(coordinator.is_polling());

        coordinator.shutdown();
    }

    #[tokio::test]
    async fn shutdown_stops_polling_and_detaches_listeners() {
        let server = MockServer::start().await;
        mount_healthy_bridge(&server, &[("scene-1", "inactive")]).await;

        let registry = Arc::new(RecordingRegistry::default());
        let coordinator =
            SceneCoordinator::new(config_for(&server, &["scene-1"]), registry.clone());
        coordinator.handle_platform_ready().await.unwrap();
        settle().await;

        coordinator.shutdown();

        assert_eq!(coordinator.state(), CoordinatorState::ShuttingDown);
        assert!(!coordinator.is_polling());
        assert_eq!(coordinator.status_bus().listener_count(), 0);
        // Accessories stay registered; the platform owns their lifetime.
        assert_eq!(coordinator.switch_count(), 1);
    }
}
