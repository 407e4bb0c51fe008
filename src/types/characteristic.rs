// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing characteristics and their values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A semantic characteristic exposed to the host framework.
///
/// Which characteristics exist for a device is decided by its kind, see
/// [`Capabilities`](crate::Capabilities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    /// Power on/off.
    Active,
    /// Swing louvres.
    SwingMode,
    /// Fan speed as a percentage.
    RotationSpeed,

    /// What the air conditioner is doing right now.
    CurrentHeaterCoolerState,
    /// What the air conditioner was asked to do.
    TargetHeaterCoolerState,
    /// Indoor temperature.
    CurrentTemperature,
    /// Outdoor unit temperature.
    OutdoorTemperature,
    /// Set point while cooling.
    CoolingThresholdTemperature,
    /// Set point while heating.
    HeatingThresholdTemperature,
    /// Celsius or Fahrenheit on the unit's display.
    TemperatureDisplayUnits,
    /// Fan-only operation switch.
    FanActive,

    /// What the dehumidifier is doing right now.
    CurrentHumidifierDehumidifierState,
    /// What the dehumidifier was asked to do.
    TargetHumidifierDehumidifierState,
    /// Measured relative humidity.
    CurrentRelativeHumidity,
    /// Target relative humidity.
    RelativeHumidityDehumidifierThreshold,
    /// Water tank fill level.
    WaterLevel,
    /// Water tank full alarm.
    TankFull,
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A characteristic value as exchanged with the host.
///
/// Hosts transport enumerated states as small integer codes (see
/// [`crate::types::Active`] and friends), percentages and temperatures as
/// numbers, and flags as booleans. Incoming values are interpreted leniently:
/// a boolean `true` is accepted where the code `1` is expected and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    /// A flag.
    Bool(bool),
    /// An integer or enumerated code.
    Int(i64),
    /// A measurement.
    Float(f64),
}

impl CharacteristicValue {
    /// Returns the value as a number.
    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            // Codes and percentages are far below 2^52.
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(i as f64),
            Self::Float(f) if f.is_finite() => Some(f),
            Self::Float(_) => None,
        }
    }

    /// Returns the value as an integer code.
    ///
    /// Floats are accepted only when they carry no fractional part.
    #[must_use]
    pub fn as_code(self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(b)),
            Self::Int(i) => Some(i),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                #[allow(clippy::cast_possible_truncation)]
                let code = f as i64;
                Some(code)
            }
            Self::Float(_) => None,
        }
    }

    /// Returns `true` when the value means "on" (`1` or `true`).
    #[must_use]
    pub fn is_on(self) -> bool {
        self.as_code() == Some(1)
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u8> for CharacteristicValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
