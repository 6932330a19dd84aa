// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge discovery and API key pairing.
//!
//! Both operations run before an authenticated client exists:
//!
//! - Discovery queries the vendor's public endpoint, which lists bridges
//!   that have phoned home from the local network.
//! - Pairing posts a device-type string to the bridge's unauthenticated
//!   auth endpoint. The bridge only answers with a key while its link
//!   button was recently pressed; otherwise it reports an error the user
//!   can act on.
//!
//! # Examples
//!
//! ```no_run
//! use huescenes_lib::discovery;
//!
//! # async fn example() -> huescenes_lib::Result<()> {
//! let bridges = discovery::discover_bridges().await?;
//!
//! if let Some(bridge) = bridges.first() {
//!     let key = discovery::create_api_key(
//!         &bridge.internal_ip_address,
//!         "huescenes",
//!         "living-room-pi",
//!     )
//!     .await?;
//!     println!("paired, key: {key}");
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::BridgeError;
use crate::protocol::normalize_address;
use crate::resource::DiscoveredBridge;

/// The vendor's public bridge discovery endpoint.
const DISCOVERY_ENDPOINT: &str = "https://discovery.meethue.com";

/// Timeout for discovery and pairing requests.
const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries the public discovery endpoint for bridges on this network.
///
/// Does not retry; discovery runs once per bootstrap cycle and the user
/// is expected to configure an address if it fails.
///
/// # Errors
///
/// Returns `BridgeError::Discovery` carrying the root cause on any
/// network failure.
pub async fn discover_bridges() -> Result<Vec<DiscoveredBridge>, BridgeError> {
    discover_bridges_at(DISCOVERY_ENDPOINT).await
}

/// Queries a custom discovery endpoint.
///
/// # Errors
///
/// Returns `BridgeError::Discovery` carrying the root cause on any
/// network failure.
pub async fn discover_bridges_at(endpoint: &str) -> Result<Vec<DiscoveredBridge>, BridgeError> {
    tracing::debug!(endpoint = %endpoint, "discovering bridges");

    let client = reqwest::Client::builder()
        .timeout(BOOTSTRAP_TIMEOUT)
        .build()
        .map_err(|e| BridgeError::Discovery(e.to_string()))?;

    let bridges: Vec<DiscoveredBridge> = client
        .get(endpoint)
        .send()
        .await
        .map_err(|e| BridgeError::Discovery(e.to_string()))?
        .error_for_status()
        .map_err(|e| BridgeError::Discovery(e.to_string()))?
        .json()
        .await
        .map_err(|e| BridgeError::Discovery(e.to_string()))?;

    tracing::debug!(count = bridges.len(), "bridge discovery finished");
    Ok(bridges)
}

/// One element of the pairing response array.
#[derive(Debug, Deserialize)]
struct PairingReply {
    success: Option<Vec<PairingSuccess>>,
    error: Option<PairingError>,
}

#[derive(Debug, Deserialize)]
struct PairingSuccess {
    username: String,
}

#[derive(Debug, Deserialize)]
struct PairingError {
    description: String,
}

/// Creates an API key on the bridge.
///
/// The bridge identifies the application as `{app_name}#{device_name}`.
/// The user must press the bridge's link button shortly before this call;
/// otherwise the bridge answers with an error variant whose description
/// is surfaced as [`BridgeError::LinkButton`].
///
/// # Errors
///
/// - `BridgeError::LinkButton` with the bridge's description when the
///   bridge refuses (typically "link button not pressed").
/// - `BridgeError::Protocol` when the response matches neither the
///   success nor the error shape.
/// - Transport-level variants on network failure.
pub async fn create_api_key(
    bridge_address: &str,
    app_name: &str,
    device_name: &str,
) -> Result<String, BridgeError> {
    let base = normalize_address(bridge_address);
    let url = format!("{base}/api");

    tracing::debug!(url = %url, "requesting API key from bridge");

    // The bridge's certificate is self-signed; scoped to this call.
    let client = reqwest::Client::builder()
        .timeout(BOOTSTRAP_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(BridgeError::Http)?;

    let body = serde_json::json!({
        "devicetype": format!("{app_name}#{device_name}"),
    });

    let replies: Vec<PairingReply> = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(BridgeError::from_transport)?
        .json()
        .await
        .map_err(BridgeError::from_transport)?;

    let Some(reply) = replies.into_iter().next() else {
        return Err(BridgeError::Protocol(
            "empty pairing response".to_string(),
        ));
    };

    if let Some(success) = reply.success
        && let Some(entry) = success.into_iter().next()
    {
        return Ok(entry.username);
    }

    if let Some(error) = reply.error {
        return Err(BridgeError::LinkButton(error.description));
    }

    Err(BridgeError::Protocol(
        "pairing response matches neither success nor error shape".to_string(),
    ))
}
