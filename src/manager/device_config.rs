// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registration records for the device manager.

use serde::{Deserialize, Serialize};

use crate::config::DeviceEntry;
use crate::error::Error;
use crate::event::DeviceId;
use crate::protocol::DeviceIdentity;
use crate::types::DeviceKind;

/// Everything needed to register one appliance.
///
/// Usually produced by discovery, or restored from the configuration's
/// `devices` list.
///
/// # Examples
///
/// ```
/// use midea_lan::manager::DeviceContext;
/// use midea_lan::types::DeviceKind;
///
/// let context = DeviceContext::new("150633093847123", DeviceKind::Dehumidifier, "192.168.1.40")
///     .with_name("Basement")
///     .with_credentials("token", "key");
///
/// assert_eq!(context.device_kind().unwrap(), DeviceKind::Dehumidifier);
/// assert_eq!(context.display_name(), "Basement");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceContext {
    /// Appliance id.
    pub device_id: DeviceId,
    /// Appliance type code as reported by discovery.
    #[serde(
        rename = "type",
        alias = "kind",
        deserialize_with = "crate::types::deserialize_type_code"
    )]
    pub kind: u32,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// LAN address.
    #[serde(alias = "ip")]
    pub address: String,
    /// Session token.
    #[serde(default)]
    pub token: String,
    /// Session key.
    #[serde(default)]
    pub key: String,
}

impl DeviceContext {
    /// Creates a context without name or credentials.
    #[must_use]
    pub fn new(device_id: impl Into<DeviceId>, kind: DeviceKind, address: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kind: kind.code(),
            name: String::new(),
            address: address.into(),
            token: String::new(),
            key: String::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the token/key pair.
    #[must_use]
    pub fn with_credentials(mut self, token: impl Into<String>, key: impl Into<String>) -> Self {
        self.token = token.into();
        self.key = key.into();
        self
    }

    /// Returns the name, or the id when no name is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.device_id.as_str()
        } else {
            &self.name
        }
    }

    /// Resolves the type code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDeviceType`] for anything but an air
    /// conditioner or a dehumidifier.
    pub fn device_kind(&self) -> Result<DeviceKind, Error> {
        DeviceKind::try_from(self.kind)
    }

    /// Returns what the gateway needs to reach the device.
    #[must_use]
    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.device_id.clone(), self.address.clone())
            .with_credentials(self.token.clone(), self.key.clone())
    }

    /// Renders the entry to paste into the configuration's `devices` list.
    #[must_use]
    pub fn config_snippet(&self) -> String {
        serde_json::to_string_pretty(&DeviceEntry::from(self)).unwrap_or_default()
    }
}
