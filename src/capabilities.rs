// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-kind characteristic sets.
//!
//! A device's kind decides which characteristics the host sees, which of them
//! can be written, and the numeric range or valid codes the host should offer.
//! Requests for anything outside the set are rejected with a
//! [`CapabilityViolation`] before any projection runs.
//!
//! # Examples
//!
//! ```
//! use midea_lan::Capabilities;
//! use midea_lan::config::SyncSettings;
//! use midea_lan::types::{Characteristic, DeviceKind};
//!
//! let caps = Capabilities::for_kind(DeviceKind::Dehumidifier, &SyncSettings::default());
//!
//! assert!(caps.supports(Characteristic::WaterLevel));
//! assert!(!caps.supports(Characteristic::CurrentTemperature));
//! assert!(caps.check_writable(Characteristic::WaterLevel).is_err());
//! ```

use serde::Serialize;

use crate::config::SyncSettings;
use crate::error::CapabilityViolation;
use crate::event::DeviceId;
use crate::types::{
    Characteristic, DeviceKind, TargetDehumidifierState, TargetHeaterCoolerState,
    TemperatureDisplayUnits,
};

/// Host-facing properties of one characteristic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacteristicProps {
    /// The characteristic.
    pub characteristic: Characteristic,
    /// Whether the host may write it.
    pub writable: bool,
    /// Lowest value offered.
    pub min: Option<f64>,
    /// Highest value offered.
    pub max: Option<f64>,
    /// Slider step.
    pub step: Option<f64>,
    /// Accepted codes, for enumerated characteristics that restrict them.
    pub valid_values: Option<Vec<u8>>,
}

impl CharacteristicProps {
    fn read_only(characteristic: Characteristic) -> Self {
        Self {
            characteristic,
            writable: false,
            min: None,
            max: None,
            step: None,
            valid_values: None,
        }
    }

    fn writable(characteristic: Characteristic) -> Self {
        Self {
            writable: true,
            ..Self::read_only(characteristic)
        }
    }

    fn with_range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    fn with_valid_values(mut self, values: &[u8]) -> Self {
        self.valid_values = Some(values.to_vec());
        self
    }
}

/// The characteristic set of one device kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    kind: DeviceKind,
    props: Vec<CharacteristicProps>,
}

impl Capabilities {
    /// Builds the characteristic set for `kind`.
    #[must_use]
    pub fn for_kind(kind: DeviceKind, settings: &SyncSettings) -> Self {
        let props = match kind {
            DeviceKind::AirConditioner => air_conditioner(settings),
            DeviceKind::Dehumidifier => dehumidifier(),
        };
        Self { kind, props }
    }

    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Lists the exposed characteristics.
    pub fn characteristics(&self) -> impl Iterator<Item = Characteristic> + '_ {
        self.props.iter().map(|p| p.characteristic)
    }

    /// Returns the properties of `characteristic`, if exposed.
    #[must_use]
    pub fn props(&self, characteristic: Characteristic) -> Option<&CharacteristicProps> {
        self.props
            .iter()
            .find(|p| p.characteristic == characteristic)
    }

    /// Returns `true` if `characteristic` is exposed.
    #[must_use]
    pub fn supports(&self, characteristic: Characteristic) -> bool {
        self.props(characteristic).is_some()
    }

    /// Checks that `characteristic` can be read.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityViolation::Unsupported`] if it is not exposed.
    pub fn check_readable(&self, characteristic: Characteristic) -> Result<(), CapabilityViolation> {
        if self.supports(characteristic) {
            Ok(())
        } else {
            tracing::warn!(kind = %self.kind, %characteristic, "Characteristic not supported");
            Err(CapabilityViolation::Unsupported {
                kind: self.kind,
                characteristic,
            })
        }
    }

    /// Checks that `characteristic` can be written.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityViolation::Unsupported`] if it is not exposed, or
    /// [`CapabilityViolation::ReadOnly`] if it cannot be written.
    pub fn check_writable(&self, characteristic: Characteristic) -> Result<(), CapabilityViolation> {
        self.check_readable(characteristic)?;
        match self.props(characteristic) {
            Some(props) if props.writable => Ok(()),
            _ => {
                tracing::warn!(kind = %self.kind, %characteristic, "Characteristic is read-only");
                Err(CapabilityViolation::ReadOnly(characteristic))
            }
        }
    }
}

fn air_conditioner(settings: &SyncSettings) -> Vec<CharacteristicProps> {
    let t = settings.temperature;
    vec![
        CharacteristicProps::writable(Characteristic::Active),
        CharacteristicProps::read_only(Characteristic::CurrentHeaterCoolerState),
        CharacteristicProps::writable(Characteristic::TargetHeaterCoolerState).with_valid_values(&[
            TargetHeaterCoolerState::Auto.code(),
            TargetHeaterCoolerState::Heat.code(),
            TargetHeaterCoolerState::Cool.code(),
        ]),
        CharacteristicProps::read_only(Characteristic::CurrentTemperature)
            .with_range(-100.0, 100.0, 0.1),
        CharacteristicProps::read_only(Characteristic::OutdoorTemperature)
            .with_range(-100.0, 100.0, 0.1),
        CharacteristicProps::writable(Characteristic::CoolingThresholdTemperature)
            .with_range(t.min, t.max, t.step),
        CharacteristicProps::writable(Characteristic::HeatingThresholdTemperature)
            .with_range(t.min, t.max, t.step),
        CharacteristicProps::writable(Characteristic::RotationSpeed).with_range(0.0, 100.0, 1.0),
        CharacteristicProps::writable(Characteristic::SwingMode),
        CharacteristicProps::writable(Characteristic::TemperatureDisplayUnits).with_valid_values(
            &[
                TemperatureDisplayUnits::Celsius.code(),
                TemperatureDisplayUnits::Fahrenheit.code(),
            ],
        ),
        CharacteristicProps::writable(Characteristic::FanActive),
    ]
}

fn dehumidifier() -> Vec<CharacteristicProps> {
    vec![
        CharacteristicProps::writable(Characteristic::Active),
        CharacteristicProps::read_only(Characteristic::CurrentHumidifierDehumidifierState),
        CharacteristicProps::writable(Characteristic::TargetHumidifierDehumidifierState)
            .with_valid_values(&[TargetDehumidifierState::Dehumidifier.code()]),
        CharacteristicProps::read_only(Characteristic::CurrentRelativeHumidity)
            .with_range(0.0, 100.0, 1.0),
        // The slider spans 0..100 so the host shows what was requested;
        // device bounds are applied when the value is set.
        CharacteristicProps::writable(Characteristic::RelativeHumidityDehumidifierThreshold)
            .with_range(0.0, 100.0, 5.0),
        CharacteristicProps::writable(Characteristic::RotationSpeed).with_range(0.0, 100.0, 1.0),
        CharacteristicProps::writable(Characteristic::SwingMode),
        CharacteristicProps::read_only(Characteristic::WaterLevel).with_range(0.0, 100.0, 1.0),
        CharacteristicProps::read_only(Characteristic::TankFull),
    ]
}

/// Identification shown by the host for an accessory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessoryInfo {
    /// Display name.
    pub name: String,
    /// Always `Midea`.
    pub manufacturer: &'static str,
    /// Model name derived from the kind.
    pub model: &'static str,
    /// The appliance id.
    pub serial_number: String,
    /// This crate's version.
    pub firmware_revision: &'static str,
}

impl AccessoryInfo {
    /// Builds the accessory information for a device.
    #[must_use]
    pub fn new(device_id: &DeviceId, kind: DeviceKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: "Midea",
            model: kind.model(),
            serial_number: device_id.to_string(),
            firmware_revision: env!("CARGO_PKG_VERSION"),
        }
    }
}
