// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance kinds driven by this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// The kind of climate appliance behind a session.
///
/// Midea identifies appliance families by a one-byte type code. Only the two
/// climate families are supported; any other code is rejected when the
/// device is registered.
///
/// # Examples
///
/// ```
/// use midea_lan::types::DeviceKind;
///
/// assert_eq!(DeviceKind::try_from(0xAC_u32).unwrap(), DeviceKind::AirConditioner);
/// assert_eq!("dh".parse::<DeviceKind>().unwrap(), DeviceKind::Dehumidifier);
/// assert!(DeviceKind::try_from(0xFC_u32).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Split or portable air conditioner (type `0xAC`).
    AirConditioner,
    /// Dehumidifier (type `0xA1`).
    Dehumidifier,
}

impl DeviceKind {
    /// Type code of air conditioners.
    pub const AIR_CONDITIONER_CODE: u32 = 0xAC;

    /// Type code of dehumidifiers.
    pub const DEHUMIDIFIER_CODE: u32 = 0xA1;

    /// Returns the Midea type code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::AirConditioner => Self::AIR_CONDITIONER_CODE,
            Self::Dehumidifier => Self::DEHUMIDIFIER_CODE,
        }
    }

    /// Returns the model name reported to the host.
    #[must_use]
    pub const fn model(self) -> &'static str {
        match self {
            Self::AirConditioner => "Air Conditioner",
            Self::Dehumidifier => "Dehumidifier",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AirConditioner => "AirConditioner",
            Self::Dehumidifier => "Dehumidifier",
        })
    }
}

impl TryFrom<u32> for DeviceKind {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            Self::AIR_CONDITIONER_CODE => Ok(Self::AirConditioner),
            Self::DEHUMIDIFIER_CODE => Ok(Self::Dehumidifier),
            other => Err(Error::UnsupportedDeviceType(other)),
        }
    }
}

/// Parses the type notation used by discovery: `"ac"`, `"dh"`, a decimal
/// code such as `"172"`, or a hex code such as `"0xa1"`.
impl FromStr for DeviceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "ac" => return Ok(Self::AirConditioner),
            "dh" => return Ok(Self::Dehumidifier),
            _ => {}
        }

        let code = match s.strip_prefix("0x") {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => s.parse::<u32>(),
        }
        .map_err(|_| Error::UnsupportedDeviceType(0))?;

        Self::try_from(code)
    }
}

/// Reads a type code written either as a number or in discovery notation.
///
/// Unknown numeric codes pass through and are rejected at registration;
/// unknown names fail here.
pub(crate) fn deserialize_type_code<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TypeCode {
        Code(u32),
        Name(String),
    }

    match TypeCode::deserialize(deserializer)? {
        TypeCode::Code(code) => Ok(code),
        TypeCode::Name(name) => name
            .parse::<DeviceKind>()
            .map(DeviceKind::code)
            .map_err(serde::de::Error::custom),
    }
}
