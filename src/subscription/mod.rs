// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene status subscriptions.
//!
//! The poll loop publishes `(scene_id, is_active)` pairs after each
//! successful bridge fetch; accessories subscribe so external scene
//! changes become visible without the platform re-reading the switch.

mod callback;

pub use callback::{StatusBus, SubscriptionId};
