// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operational modes as reported in the raw `mode` attribute.

use serde::{Deserialize, Serialize};

/// Air conditioner operational mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcMode {
    /// Off.
    Off = 0,
    /// Device picks heating or cooling.
    Auto = 1,
    /// Cooling.
    Cooling = 2,
    /// Dry.
    Dry = 3,
    /// Heating.
    Heating = 4,
    /// Fan only, no compressor.
    FanOnly = 5,
}

impl AcMode {
    /// Returns the raw attribute value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self as i64
    }

    /// Maps a raw attribute value to a mode.
    #[must_use]
    pub const fn from_raw(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Auto),
            2 => Some(Self::Cooling),
            3 => Some(Self::Dry),
            4 => Some(Self::Heating),
            5 => Some(Self::FanOnly),
            _ => None,
        }
    }
}

/// Dehumidifier operational mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DehumidifierMode {
    /// Off.
    Off = 0,
    /// Runs until the target humidity is reached.
    Auto = 1,
    /// Runs regardless of the target.
    Continuous = 2,
    /// Clothes drying.
    Dryer = 3,
    /// Maximum extraction.
    Maximum = 4,
}

impl DehumidifierMode {
    /// Returns the raw attribute value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self as i64
    }

    /// Maps a raw attribute value to a mode.
    #[must_use]
    pub const fn from_raw(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Auto),
            2 => Some(Self::Continuous),
            3 => Some(Self::Dryer),
            4 => Some(Self::Maximum),
            _ => None,
        }
    }

    /// Returns `true` for modes that extract moisture unconditionally.
    #[must_use]
    pub const fn always_dehumidifies(self) -> bool {
        matches!(self, Self::Continuous | Self::Dryer | Self::Maximum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ac_mode_raw_values() {
        assert_eq!(AcMode::Cooling.raw(), 2);
        assert_eq!(AcMode::from_raw(4), Some(AcMode::Heating));
        assert_eq!(AcMode::from_raw(9), None);
    }

    #[test]
    fn dehumidifier_mode_raw_values() {
        assert_eq!(DehumidifierMode::from_raw(1), Some(DehumidifierMode::Auto));
        assert_eq!(DehumidifierMode::Maximum.raw(), 4);
        assert_eq!(DehumidifierMode::from_raw(-1), None);
    }

    #[test]
    fn unconditional_modes() {
        assert!(DehumidifierMode::Continuous.always_dehumidifies());
        assert!(DehumidifierMode::Dryer.always_dehumidifies());
        assert!(DehumidifierMode::Maximum.always_dehumidifies());
        assert!(!DehumidifierMode::Auto.always_dehumidifies());
        assert!(!DehumidifierMode::Off.always_dehumidifies());
    }
}
