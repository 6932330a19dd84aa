// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene accessories.
//!
//! Each configured scene becomes one [`SceneSwitch`]: the object the
//! host platform talks to when the user toggles the switch, and the
//! owner of that scene's runtime state. The switch combines two
//! independent "is this scene on" signals — the local activation window
//! and the bridge-reported status — with the local window taking
//! precedence at read time.

mod runtime_state;
mod scene_switch;

pub use scene_switch::SceneSwitch;
