// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams to the device gateway and the host framework.
//!
//! Discovery, cloud pairing and the LAN wire protocol live behind
//! [`Gateway`]; this crate only asks it for a device's state text and hands
//! it attribute deltas. The host framework receives pushed values through
//! [`Host`].
//!
//! Both traits are used from spawned tasks, so their futures must be `Send`.
//! Implementations may still write plain `async fn`:
//!
//! ```
//! use midea_lan::error::GatewayError;
//! use midea_lan::protocol::{DeviceIdentity, Gateway};
//! use midea_lan::state::StateDelta;
//!
//! struct Offline;
//!
//! impl Gateway for Offline {
//!     async fn fetch_state(&self, _: &DeviceIdentity) -> Result<String, GatewayError> {
//!         Err(GatewayError::ConnectionFailed("offline".into()))
//!     }
//!
//!     async fn send_state(&self, _: &DeviceIdentity, _: &StateDelta) -> Result<(), GatewayError> {
//!         Ok(())
//!     }
//! }
//! ```

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::event::DeviceId;
use crate::state::StateDelta;
use crate::types::{Characteristic, CharacteristicValue};

/// What the gateway needs to reach one appliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Appliance id.
    pub id: DeviceId,
    /// LAN address.
    pub address: String,
    /// Session token.
    pub token: String,
    /// Session key.
    pub key: String,
}

impl DeviceIdentity {
    /// Creates an identity without credentials.
    #[must_use]
    pub fn new(id: impl Into<DeviceId>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            token: String::new(),
            key: String::new(),
        }
    }

    /// Sets the token/key pair.
    #[must_use]
    pub fn with_credentials(mut self, token: impl Into<String>, key: impl Into<String>) -> Self {
        self.token = token.into();
        self.key = key.into();
        self
    }
}

/// Transport to the appliances.
///
/// Calls for the same device are never issued concurrently by this crate;
/// calls for different devices may be.
pub trait Gateway: Send + Sync + 'static {
    /// Reads the current state text of a device.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the device cannot be reached or refuses.
    fn fetch_state(
        &self,
        identity: &DeviceIdentity,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Writes changed attributes to a device.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the device cannot be reached or refuses.
    fn send_state(
        &self,
        identity: &DeviceIdentity,
        delta: &StateDelta,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// The host framework's outbound channel.
pub trait Host: Send + Sync + 'static {
    /// Pushes a characteristic value. Must not block.
    fn update_characteristic(
        &self,
        device_id: &DeviceId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    );
}
