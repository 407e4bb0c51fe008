// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `midea_lan` library.
//!
//! The hierarchy mirrors how failures are handled at runtime:
//!
//! - [`DecodeError`]: malformed gateway text. Non-fatal, the tick is skipped.
//! - [`GatewayError`]: transport, auth or timeout failures. Non-fatal.
//! - [`CapabilityViolation`]: the host asked for something outside the
//!   device kind's model. Fails that single set call.
//! - [`Error::Initialization`]: the first state fetch failed. Fails the
//!   registration of that one device.

use thiserror::Error;

use crate::event::DeviceId;
use crate::types::{Characteristic, DeviceKind};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The gateway returned text that could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The gateway call itself failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The requested characteristic or value is outside the device model.
    #[error("capability violation: {0}")]
    Capability(#[from] CapabilityViolation),

    /// The platform configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The first state fetch for a device failed, so it was not registered.
    #[error("device {device_id} failed to initialize: {source}")]
    Initialization {
        /// The device that failed.
        device_id: DeviceId,
        /// Why the first fetch failed.
        #[source]
        source: Box<Error>,
    },

    /// Device was not found in the manager.
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),

    /// A device with the same id is already registered.
    #[error("device {0} is already registered")]
    DuplicateDevice(DeviceId),

    /// The persisted context names an appliance type this crate does not drive.
    #[error("unsupported device type {0:#04x}")]
    UnsupportedDeviceType(u32),
}

impl Error {
    /// Wraps `self` as the cause of a failed device initialization.
    #[must_use]
    pub fn into_initialization(self, device_id: DeviceId) -> Self {
        Self::Initialization {
            device_id,
            source: Box::new(self),
        }
    }
}

/// Errors produced while decoding the gateway's state text.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The normalized text is not valid JSON.
    #[error("malformed state text: {0}")]
    Json(#[from] serde_json::Error),

    /// The text decoded, but not to an attribute mapping.
    #[error("expected an attribute mapping, found {0}")]
    NotAMapping(&'static str),

    /// The text decoded to a mapping without any attributes.
    #[error("state text contains no attributes")]
    Empty,

    /// A normalization pattern failed to compile.
    #[error("invalid normalization pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors reported by a [`Gateway`](crate::protocol::Gateway) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The appliance could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The appliance did not answer in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Token/key pair was rejected by the appliance.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The appliance refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// A host request that does not fit the device kind's capability model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CapabilityViolation {
    /// The characteristic is not exposed for this kind of device.
    #[error("{kind} does not expose {characteristic}")]
    Unsupported {
        /// The device kind.
        kind: DeviceKind,
        /// The requested characteristic.
        characteristic: Characteristic,
    },

    /// The characteristic can be read but not written.
    #[error("{0} is read-only")]
    ReadOnly(Characteristic),

    /// The value is not one the device kind accepts.
    #[error("{characteristic} cannot be set to {value}")]
    InvalidValue {
        /// The characteristic being set.
        characteristic: Characteristic,
        /// The rejected value, as received from the host.
        value: String,
    },
}

/// Errors related to loading the platform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for the expected schema.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A numeric bound is inverted or otherwise unusable.
    #[error("invalid {field} range [{min}, {max}]")]
    InvalidRange {
        /// The configuration field.
        field: &'static str,
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },

    /// `appCredentials` names a profile that does not exist.
    #[error("unknown app credentials profile: {0}")]
    UnknownProfile(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::Timeout(5000);
        assert_eq!(err.to_string(), "request timed out after 5000 ms");
    }

    #[test]
    fn error_from_gateway_error() {
        let err: Error = GatewayError::AuthenticationFailed.into();
        assert!(matches!(
            err,
            Error::Gateway(GatewayError::AuthenticationFailed)
        ));
    }

    #[test]
    fn capability_violation_display() {
        let err = CapabilityViolation::Unsupported {
            kind: DeviceKind::Dehumidifier,
            characteristic: Characteristic::TemperatureDisplayUnits,
        };
        assert_eq!(
            err.to_string(),
            "Dehumidifier does not expose TemperatureDisplayUnits"
        );
    }

    #[test]
    fn initialization_keeps_cause() {
        let id = DeviceId::new("12345");
        let err = Error::from(GatewayError::Timeout(10)).into_initialization(id.clone());

        let Error::Initialization { device_id, source } = err else {
            panic!("expected initialization error");
        };
        assert_eq!(device_id, id);
        assert!(matches!(*source, Error::Gateway(GatewayError::Timeout(10))));
    }

    #[test]
    fn unsupported_device_type_display() {
        assert_eq!(
            Error::UnsupportedDeviceType(0xfc).to_string(),
            "unsupported device type 0xfc"
        );
    }
}
