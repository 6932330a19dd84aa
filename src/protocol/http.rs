// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated HTTP client for the bridge's CLIP v2 resource API.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::error::BridgeError;
use crate::resource::{Light, ResourceEnvelope, Scene};

use super::retry::RetryPolicy;

/// Header carrying the application key on every authenticated request.
const APPLICATION_KEY_HEADER: &str = "hue-application-key";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the bridge's CLIP v2 resource API.
///
/// The client is stateless beyond its base URL and application key: no
/// caching, no connection bookkeeping. Transient failures (network
/// errors, HTTP 5xx) are retried with exponential backoff per the
/// configured [`RetryPolicy`]; client-side rejections surface
/// immediately.
///
/// The bridge serves a self-signed certificate, so certificate
/// validation is disabled on this client. The trust decision is scoped
/// to bridge-local traffic; nothing else in the library weakens TLS.
///
/// # Examples
///
/// ```no_run
/// use huescenes_lib::protocol::BridgeClient;
///
/// # async fn example() -> huescenes_lib::Result<()> {
/// let client = BridgeClient::new("192.168.1.2", "app-key")?;
///
/// for scene in client.get_scenes().await? {
///     println!("{}: {}", scene.id, scene.display_name());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BridgeClient {
    base_url: String,
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl BridgeClient {
    /// Creates a new client for the bridge at the given address.
    ///
    /// Plain addresses are turned into `https://{address}/clip/v2`;
    /// addresses already carrying a scheme are used as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        address: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, BridgeError> {
        Self::builder(address, api_key).build()
    }

    /// Returns a builder for a client with custom timeout or retry
    /// settings.
    pub fn builder(
        address: impl Into<String>,
        api_key: impl Into<String>,
    ) -> BridgeClientBuilder {
        BridgeClientBuilder {
            address: address.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Returns the base URL of the resource API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches all scenes known to the bridge.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or when the response envelope
    /// carries errors.
    pub async fn get_scenes(&self) -> Result<Vec<Scene>, BridgeError> {
        let envelope: ResourceEnvelope<Scene> =
            self.request(Method::GET, "/resource/scene", None).await?;
        Ok(envelope.data)
    }

    /// Fetches all lights known to the bridge.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or when the response envelope
    /// carries errors.
    pub async fn get_lights(&self) -> Result<Vec<Light>, BridgeError> {
        let envelope: ResourceEnvelope<Light> =
            self.request(Method::GET, "/resource/light", None).await?;
        Ok(envelope.data)
    }

    /// Fetches a single scene by id.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::NotFound` when the bridge answers with an
    /// empty data array, in addition to the usual failure modes.
    pub async fn get_scene(&self, id: &str) -> Result<Scene, BridgeError> {
        let envelope: ResourceEnvelope<Scene> = self
            .request(Method::GET, &format!("/resource/scene/{id}"), None)
            .await?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::NotFound(format!("Scene {id} not found")))
    }

    /// Recalls (activates) a scene, optionally with a transition.
    ///
    /// A transition of `None` or `0` is omitted from the request body
    /// entirely; the bridge treats absence as its default instant recall.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or when the response envelope
    /// carries errors.
    pub async fn recall_scene(
        &self,
        id: &str,
        transition_ms: Option<u64>,
    ) -> Result<(), BridgeError> {
        let body = Self::recall_body(transition_ms);
        let _: ResourceEnvelope<serde_json::Value> = self
            .request(Method::PUT, &format!("/resource/scene/{id}"), Some(&body))
            .await?;
        Ok(())
    }

    /// Probes bridge connectivity.
    ///
    /// Returns true on any 2xx answer to the resource root. All failures
    /// are swallowed; this is a boolean probe, not a diagnostic call.
    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/resource", self.base_url);
        let result = self
            .client
            .get(&url)
            .header(APPLICATION_KEY_HEADER, &self.api_key)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }

    /// Builds the recall request body, omitting zero/absent durations.
    fn recall_body(transition_ms: Option<u64>) -> serde_json::Value {
        match transition_ms {
            Some(ms) if ms > 0 => serde_json::json!({
                "recall": {"action": "active", "duration": ms}
            }),
            _ => serde_json::json!({"recall": {"action": "active"}}),
        }
    }

    /// Sends a request, retrying transient failures per the policy.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ResourceEnvelope<T>, BridgeError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt = 0;

        loop {
            match self.try_request(&method, &url, body).await {
                Ok(envelope) => return Ok(envelope),
                Err(e) if e.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::debug!(
                        url = %url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "transient bridge error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a single request attempt and classifies the outcome.
    async fn try_request<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ResourceEnvelope<T>, BridgeError> {
        tracing::debug!(method = %method, url = %url, "sending bridge request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(APPLICATION_KEY_HEADER, &self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(BridgeError::from_transport)?;

        if let Some(err) = BridgeError::from_status(response.status()) {
            return Err(err);
        }

        let envelope: ResourceEnvelope<T> =
            response.json().await.map_err(BridgeError::from_transport)?;

        if let Some(summary) = envelope.error_summary() {
            return Err(BridgeError::Api(summary));
        }

        Ok(envelope)
    }
}

/// Builder for a [`BridgeClient`] with custom configuration.
#[derive(Debug)]
pub struct BridgeClientBuilder {
    address: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl BridgeClientBuilder {
    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<BridgeClient, BridgeError> {
        let base = normalize_address(&self.address);

        // The bridge's certificate is self-signed; accepting it is a
        // trust decision scoped to this client instance.
        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(BridgeError::Http)?;

        Ok(BridgeClient {
            base_url: format!("{base}/clip/v2"),
            client,
            api_key: self.api_key,
            retry: self.retry,
        })
    }
}

/// Prefixes bare addresses with `https://`; explicit schemes pass
/// through.
pub(crate) fn normalize_address(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.trim_end_matches('/').to_string()
    } else {
        format!("https://{address}")
    }
}
