// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air conditioner projection.

use serde::Serialize;

use super::SetOutcome;
use super::common::{self, json_number, require_code, require_number, same_number};
use crate::error::CapabilityViolation;
use crate::state::{RawState, StateDelta, attr};
use crate::types::{
    AcMode, Active, Characteristic, CharacteristicValue, CurrentHeaterCoolerState, SwingMode,
    TargetHeaterCoolerState, TemperatureDisplayUnits,
};

/// Host-facing state of an air conditioner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirConditionerState {
    /// Power.
    pub active: Active,
    /// What the unit is doing.
    pub current_state: CurrentHeaterCoolerState,
    /// What the unit was asked to do.
    pub target_state: TargetHeaterCoolerState,
    /// Indoor temperature.
    pub current_temperature: Option<f64>,
    /// Outdoor unit temperature.
    pub outdoor_temperature: Option<f64>,
    /// Set point, shared by the cooling and heating thresholds.
    pub threshold_temperature: Option<f64>,
    /// Fan speed percentage.
    pub rotation_speed: u8,
    /// Louvre swing.
    pub swing: SwingMode,
    /// Display unit.
    pub display_units: TemperatureDisplayUnits,
    /// Fan-only operation.
    pub fan_active: Active,
}

impl AirConditionerState {
    /// Projects raw attributes.
    #[must_use]
    pub fn from_raw(raw: &RawState) -> Self {
        Self {
            active: common::active(raw),
            current_state: current_state(raw),
            target_state: target_state(raw),
            current_temperature: raw.indoor_temperature(),
            outdoor_temperature: raw.outdoor_temperature(),
            threshold_temperature: raw.target_temperature(),
            rotation_speed: rotation_speed(raw),
            swing: common::swing(raw),
            display_units: display_units(raw),
            fan_active: fan_active(raw),
        }
    }

    /// Returns the value of one characteristic, `None` if unknown or not
    /// exposed by air conditioners.
    #[must_use]
    pub fn value(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        let value: CharacteristicValue = match characteristic {
            Characteristic::Active => self.active.into(),
            Characteristic::CurrentHeaterCoolerState => self.current_state.into(),
            Characteristic::TargetHeaterCoolerState => self.target_state.into(),
            Characteristic::CurrentTemperature => self.current_temperature?.into(),
            Characteristic::OutdoorTemperature => self.outdoor_temperature?.into(),
            Characteristic::CoolingThresholdTemperature
            | Characteristic::HeatingThresholdTemperature => self.threshold_temperature?.into(),
            Characteristic::RotationSpeed => self.rotation_speed.into(),
            Characteristic::SwingMode => self.swing.into(),
            Characteristic::TemperatureDisplayUnits => self.display_units.into(),
            Characteristic::FanActive => self.fan_active.into(),
            _ => return None,
        };
        Some(value)
    }
}

/// Not running is inactive; cooling and heating modes report themselves;
/// other modes compare indoor against target temperature.
#[must_use]
pub fn current_state(raw: &RawState) -> CurrentHeaterCoolerState {
    if !raw.running() {
        return CurrentHeaterCoolerState::Inactive;
    }
    match raw.mode().and_then(AcMode::from_raw) {
        Some(AcMode::Cooling) => CurrentHeaterCoolerState::Cooling,
        Some(AcMode::Heating) => CurrentHeaterCoolerState::Heating,
        _ => match (raw.indoor_temperature(), raw.target_temperature()) {
            (Some(indoor), Some(target)) if indoor > target => CurrentHeaterCoolerState::Cooling,
            _ => CurrentHeaterCoolerState::Heating,
        },
    }
}

/// Cooling and heating modes report themselves, everything else is Auto.
#[must_use]
pub fn target_state(raw: &RawState) -> TargetHeaterCoolerState {
    match raw.mode().and_then(AcMode::from_raw) {
        Some(AcMode::Cooling) => TargetHeaterCoolerState::Cool,
        Some(AcMode::Heating) => TargetHeaterCoolerState::Heat,
        _ => TargetHeaterCoolerState::Auto,
    }
}

/// Raw 40/60/80 map to 25/50/75 percent; Silent, Full and Auto all read
/// as 100.
#[must_use]
pub fn rotation_speed(raw: &RawState) -> u8 {
    match raw.fan_speed() {
        Some(40) => 25,
        Some(60) => 50,
        Some(80) => 75,
        _ => 100,
    }
}

fn display_units(raw: &RawState) -> TemperatureDisplayUnits {
    if raw.fahrenheit() {
        TemperatureDisplayUnits::Fahrenheit
    } else {
        TemperatureDisplayUnits::Celsius
    }
}

fn fan_active(raw: &RawState) -> Active {
    if raw.running() && raw.mode() == Some(AcMode::FanOnly.raw()) {
        Active::Active
    } else {
        Active::Inactive
    }
}

/// Maps a host write to raw attribute changes.
///
/// # Errors
///
/// Returns [`CapabilityViolation::InvalidValue`] if the value is not numeric
/// where a number or code is required, or
/// [`CapabilityViolation::Unsupported`] for characteristics air conditioners
/// do not expose.
pub fn set(
    raw: &RawState,
    characteristic: Characteristic,
    value: CharacteristicValue,
) -> Result<SetOutcome, CapabilityViolation> {
    let delta = match characteristic {
        Characteristic::Active => common::set_active(value),
        Characteristic::SwingMode => common::set_swing(value),
        Characteristic::TargetHeaterCoolerState => set_target_state(characteristic, value)?,
        Characteristic::CoolingThresholdTemperature
        | Characteristic::HeatingThresholdTemperature => {
            let target = require_number(characteristic, value)?;
            match raw.target_temperature() {
                Some(current) if same_number(current, target) => StateDelta::new(),
                _ => StateDelta::new().with(attr::TARGET_TEMPERATURE, json_number(target)),
            }
        }
        Characteristic::RotationSpeed => {
            let percent = require_number(characteristic, value)?;
            StateDelta::new().with(attr::FAN_SPEED, fan_speed_for(percent))
        }
        Characteristic::TemperatureDisplayUnits => {
            StateDelta::new().with(attr::FAHRENHEIT, value.is_on())
        }
        Characteristic::FanActive => set_fan_active(raw, value),
        other => {
            return Err(CapabilityViolation::Unsupported {
                kind: crate::types::DeviceKind::AirConditioner,
                characteristic: other,
            });
        }
    };
    Ok(SetOutcome::new(delta))
}

/// Auto, Cool and Heat select the matching raw mode; other codes are ignored.
fn set_target_state(
    characteristic: Characteristic,
    value: CharacteristicValue,
) -> Result<StateDelta, CapabilityViolation> {
    let code = require_code(characteristic, value)?;
    let mode = match TargetHeaterCoolerState::from_code(code) {
        Some(TargetHeaterCoolerState::Auto) => AcMode::Auto,
        Some(TargetHeaterCoolerState::Cool) => AcMode::Cooling,
        Some(TargetHeaterCoolerState::Heat) => AcMode::Heating,
        None => {
            tracing::warn!(code, "Ignoring unknown target heater-cooler state");
            return Ok(StateDelta::new());
        }
    };
    Ok(StateDelta::new().with(attr::MODE, mode.raw()))
}

/// Percent to raw fan speed. Anything above 75 selects Auto.
#[must_use]
pub fn fan_speed_for(percent: f64) -> i64 {
    if percent <= 25.0 {
        40
    } else if percent <= 50.0 {
        60
    } else if percent <= 75.0 {
        80
    } else {
        102
    }
}

fn set_fan_active(raw: &RawState, value: CharacteristicValue) -> StateDelta {
    if value.is_on() {
        StateDelta::new()
            .with(attr::RUNNING, true)
            .with(attr::MODE, AcMode::FanOnly.raw())
    } else if raw.running() {
        StateDelta::new().with(attr::RUNNING, false)
    } else {
        StateDelta::new()
    }
}
