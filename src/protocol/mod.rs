// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge protocol implementation.
//!
//! The bridge speaks plain HTTPS: a versioned resource API under
//! `/clip/v2`, authenticated with an application-key header. This module
//! provides the client for it and the retry policy governing transient
//! failures.

mod http;
mod retry;

pub use http::{BridgeClient, BridgeClientBuilder};
pub use retry::RetryPolicy;

pub(crate) use http::normalize_address;
