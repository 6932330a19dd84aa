// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `HueScenes` library.
//!
//! This module provides the error hierarchy for handling failures across
//! the library: value validation and every class of bridge communication
//! failure, from discovery through scene recall.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when exposing
/// bridge scenes as switches.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the bridge.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Bootstrap requires an API key and none is configured.
    #[error("no API key configured; pair with the bridge and set the key")]
    MissingApiKey,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
        /// The actual value that was provided.
        actual: u64,
    },
}

/// Errors related to bridge communication.
///
/// The bridge is reached over three distinct surfaces — the public
/// discovery endpoint, the unauthenticated pairing endpoint, and the
/// authenticated CLIP v2 resource API — and each contributes variants.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Bridge discovery against the public endpoint failed.
    #[error("bridge discovery failed: {0}")]
    Discovery(String),

    /// The bridge refused to create an API key.
    ///
    /// Carries the bridge's own description, typically
    /// "link button not pressed".
    #[error("{0}")]
    LinkButton(String),

    /// The bridge returned a response that matches no known shape.
    #[error("unexpected bridge response: {0}")]
    Protocol(String),

    /// The response envelope carried one or more errors.
    ///
    /// All error descriptions are joined with a comma.
    #[error("bridge API error: {0}")]
    Api(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The bridge rejected the application key.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The bridge is throttling requests.
    #[error("rate limited")]
    RateLimited,

    /// The bridge answered with a server-side error status.
    #[error("bridge server error (HTTP {0})")]
    Server(u16),

    /// Connection to the bridge could not be established.
    #[error("cannot connect to bridge, check the address: {0}")]
    Connection(String),

    /// The request did not complete within the client timeout.
    #[error("connection to bridge timed out")]
    Timeout,

    /// Any other HTTP-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    /// Returns true if the error is worth retrying.
    ///
    /// Transient failures are network-level problems and server-side
    /// errors; client-side rejections (4xx) are final.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Server(_) | Self::Connection(_) | Self::Timeout => true,
            Self::Http(e) => !e.is_builder() && !e.is_decode(),
            _ => false,
        }
    }

    /// Classifies a reqwest transport error into the taxonomy.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// Classifies an HTTP status code into the taxonomy.
    ///
    /// Returns `None` for success statuses.
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        Some(match status.as_u16() {
            401 | 403 => Self::AuthenticationFailed,
            404 => Self::NotFound("resource not found".to_string()),
            429 => Self::RateLimited,
            code if code >= 500 => Self::Server(code),
            code => Self::Protocol(format!("unexpected HTTP status {code}")),
        })
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
