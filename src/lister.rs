// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only scene listing for the configuration UI.
//!
//! The companion configuration server only ever needs one thing from the
//! bridge: the id/name pairs of every scene, so the user can pick which
//! ones to expose. This module is that thin consumer.

use crate::error::{BridgeError, Result};
use crate::discovery;
use crate::protocol::BridgeClient;
use crate::resource::SceneSummary;

/// Lists all scenes on the bridge as `{id, name}` pairs.
///
/// When no address is given the bridge is resolved via discovery, using
/// the first candidate.
///
/// # Errors
///
/// Returns discovery or client errors unchanged; see
/// [`BridgeError`](crate::error::BridgeError).
///
/// # Examples
///
/// ```no_run
/// use huescenes_lib::lister;
///
/// # async fn example() -> huescenes_lib::Result<()> {
/// for scene in lister::list_scenes(Some("192.168.1.2"), "app-key").await? {
///     println!("{}\t{}", scene.id, scene.name);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn list_scenes(address: Option<&str>, api_key: &str) -> Result<Vec<SceneSummary>> {
    let address = match address {
        Some(address) => address.to_string(),
        None => {
            let bridges = discovery::discover_bridges().await?;
            let bridge = bridges.first().ok_or_else(|| {
                BridgeError::Discovery("no bridges found; configure an address".to_string())
            })?;
            bridge.internal_ip_address.clone()
        }
    };

    let client = BridgeClient::new(address, api_key)?;
    let scenes = client.get_scenes().await?;

    Ok(scenes.iter().map(SceneSummary::from).collect())
}
