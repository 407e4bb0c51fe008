// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dehumidifier projection.

use serde::Serialize;

use super::SetOutcome;
use super::common::{self, invalid, json_number, require_code, require_number};
use crate::config::HumidityLimits;
use crate::error::CapabilityViolation;
use crate::state::{RawState, StateDelta, attr};
use crate::types::{
    Active, Characteristic, CharacteristicValue, CurrentDehumidifierState, DehumidifierMode,
    DeviceKind, SwingMode, TargetDehumidifierState,
};

/// Host-facing state of a dehumidifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DehumidifierState {
    /// Power.
    pub active: Active,
    /// What the unit is doing.
    pub current_state: CurrentDehumidifierState,
    /// Always [`TargetDehumidifierState::Dehumidifier`].
    pub target_state: TargetDehumidifierState,
    /// Measured humidity.
    pub current_humidity: Option<f64>,
    /// Humidity set point.
    pub target_humidity: Option<f64>,
    /// Fan speed percentage.
    pub rotation_speed: u8,
    /// Louvre swing.
    pub swing: SwingMode,
    /// Tank fill level.
    pub water_level: Option<f64>,
    /// Tank full alarm.
    pub tank_full: bool,
}

impl DehumidifierState {
    /// Projects raw attributes.
    #[must_use]
    pub fn from_raw(raw: &RawState) -> Self {
        Self {
            active: common::active(raw),
            current_state: current_state(raw),
            target_state: TargetDehumidifierState::Dehumidifier,
            current_humidity: raw.current_humidity(),
            target_humidity: raw.target_humidity(),
            rotation_speed: rotation_speed(raw),
            swing: common::swing(raw),
            water_level: raw.tank_level(),
            tank_full: raw.tank_full(),
        }
    }

    /// Returns the value of one characteristic, `None` if unknown or not
    /// exposed by dehumidifiers.
    #[must_use]
    pub fn value(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        let value: CharacteristicValue = match characteristic {
            Characteristic::Active => self.active.into(),
            Characteristic::CurrentHumidifierDehumidifierState => self.current_state.into(),
            Characteristic::TargetHumidifierDehumidifierState => self.target_state.into(),
            Characteristic::CurrentRelativeHumidity => self.current_humidity?.into(),
            Characteristic::RelativeHumidityDehumidifierThreshold => self.target_humidity?.into(),
            Characteristic::RotationSpeed => self.rotation_speed.into(),
            Characteristic::SwingMode => self.swing.into(),
            Characteristic::WaterLevel => self.water_level?.into(),
            Characteristic::TankFull => self.tank_full.into(),
            _ => return None,
        };
        Some(value)
    }
}

/// Continuous, Dryer and Maximum always dehumidify; Auto idles once the
/// target is reached.
#[must_use]
pub fn current_state(raw: &RawState) -> CurrentDehumidifierState {
    if !raw.running() {
        return CurrentDehumidifierState::Inactive;
    }
    match raw.mode().and_then(DehumidifierMode::from_raw) {
        Some(mode) if mode.always_dehumidifies() => CurrentDehumidifierState::Dehumidifying,
        Some(DehumidifierMode::Auto) => match (raw.current_humidity(), raw.target_humidity()) {
            (Some(current), Some(target)) if current < target => CurrentDehumidifierState::Idle,
            _ => CurrentDehumidifierState::Dehumidifying,
        },
        _ => CurrentDehumidifierState::Idle,
    }
}

/// Raw 40/60/80 map to 30/60/100 percent, anything else reads as 0.
#[must_use]
pub fn rotation_speed(raw: &RawState) -> u8 {
    match raw.fan_speed() {
        Some(40) => 30,
        Some(60) => 60,
        Some(80) => 100,
        _ => 0,
    }
}

/// Percent to raw fan speed. `None` above 100.
#[must_use]
pub fn fan_speed_for(percent: f64) -> Option<i64> {
    if percent <= 30.0 {
        Some(40)
    } else if percent <= 60.0 {
        Some(60)
    } else if percent <= 100.0 {
        Some(80)
    } else {
        None
    }
}

/// Maps a host write to raw attribute changes.
///
/// # Errors
///
/// Returns [`CapabilityViolation::InvalidValue`] for any target state other
/// than dehumidify or a non-numeric value where one is required, and
/// [`CapabilityViolation::Unsupported`] for characteristics dehumidifiers do
/// not expose.
pub fn set(
    characteristic: Characteristic,
    value: CharacteristicValue,
    humidity: &HumidityLimits,
) -> Result<SetOutcome, CapabilityViolation> {
    match characteristic {
        Characteristic::Active => Ok(SetOutcome::new(common::set_active(value))),
        Characteristic::SwingMode => Ok(SetOutcome::new(common::set_swing(value))),
        Characteristic::TargetHumidifierDehumidifierState => {
            let code = require_code(characteristic, value)?;
            if code == i64::from(TargetDehumidifierState::Dehumidifier.code()) {
                Ok(SetOutcome::new(StateDelta::new()))
            } else {
                Err(invalid(characteristic, value))
            }
        }
        Characteristic::RelativeHumidityDehumidifierThreshold => {
            let requested = require_number(characteristic, value)?;
            let clamped = humidity.clamp(requested);
            let delta = StateDelta::new().with(attr::TARGET_HUMIDITY, json_number(clamped));
            if clamped < requested || clamped > requested {
                tracing::warn!(
                    requested,
                    clamped,
                    min = humidity.min,
                    max = humidity.max,
                    "Target humidity clamped"
                );
                Ok(SetOutcome::new(delta).with_correction(CharacteristicValue::Float(clamped)))
            } else {
                Ok(SetOutcome::new(delta))
            }
        }
        Characteristic::RotationSpeed => {
            let percent = require_number(characteristic, value)?;
            match fan_speed_for(percent) {
                Some(speed) => Ok(SetOutcome::new(StateDelta::new().with(attr::FAN_SPEED, speed))),
                None => {
                    tracing::debug!(percent, "Ignoring fan speed above 100");
                    Ok(SetOutcome::new(StateDelta::new()))
                }
            }
        }
        other => Err(CapabilityViolation::Unsupported {
            kind: DeviceKind::Dehumidifier,
            characteristic: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn raw(value: Value) -> RawState {
        RawState::from_attributes(value.as_object().cloned().unwrap())
    }

    fn limits() -> HumidityLimits {
        HumidityLimits::default()
    }

    #[test]
    fn current_state_inactive_when_off() {
        assert_eq!(
            current_state(&raw(json!({ "running": false, "mode": 2 }))),
            CurrentDehumidifierState::Inactive
        );
    }

    #[test]
    fn continuous_modes_always_dehumidify() {
        for mode in [2, 3, 4] {
            let state = raw(json!({
                "running": true, "mode": mode,
                "current_humidity": 30, "target_humidity": 50
            }));
            assert_eq!(current_state(&state), CurrentDehumidifierState::Dehumidifying);
        }
    }

    #[test]
    fn auto_mode_idles_below_target() {
        let dry = raw(json!({
            "running": true, "mode": 1, "current_humidity": 40, "target_humidity": 50
        }));
        assert_eq!(current_state(&dry), CurrentDehumidifierState::Idle);

        let humid = raw(json!({
            "running": true, "mode": 1, "current_humidity": 60, "target_humidity": 50
        }));
        assert_eq!(current_state(&humid), CurrentDehumidifierState::Dehumidifying);
    }

    #[test]
    fn unknown_mode_is_idle() {
        let state = raw(json!({ "running": true, "mode": 9 }));
        assert_eq!(current_state(&state), CurrentDehumidifierState::Idle);
    }

    #[test]
    fn rotation_speed_buckets() {
        assert_eq!(rotation_speed(&raw(json!({ "fan_speed": 40 }))), 30);
        assert_eq!(rotation_speed(&raw(json!({ "fan_speed": 60 }))), 60);
        assert_eq!(rotation_speed(&raw(json!({ "fan_speed": 80 }))), 100);
        assert_eq!(rotation_speed(&raw(json!({ "fan_speed": 102 }))), 0);
        assert_eq!(rotation_speed(&RawState::new()), 0);
    }

    #[test]
    fn fan_speed_above_100_is_dropped() {
        assert_eq!(fan_speed_for(30.0), Some(40));
        assert_eq!(fan_speed_for(31.0), Some(60));
        assert_eq!(fan_speed_for(100.0), Some(80));
        assert_eq!(fan_speed_for(101.0), None);

        let outcome = set(Characteristic::RotationSpeed, 150i64.into(), &limits()).unwrap();
        assert!(outcome.delta.is_empty());
    }

    #[test]
    fn humidity_is_clamped_with_correction() {
        let outcome = set(
            Characteristic::RelativeHumidityDehumidifierThreshold,
            20i64.into(),
            &limits(),
        )
        .unwrap();
        assert_eq!(outcome.delta.get(attr::TARGET_HUMIDITY), Some(&json!(35)));
        assert_eq!(outcome.correction, Some(CharacteristicValue::Float(35.0)));

        let outcome = set(
            Characteristic::RelativeHumidityDehumidifierThreshold,
            95i64.into(),
            &limits(),
        )
        .unwrap();
        assert_eq!(outcome.delta.get(attr::TARGET_HUMIDITY), Some(&json!(85)));
    }

    #[test]
    fn humidity_in_range_has_no_correction() {
        let outcome = set(
            Characteristic::RelativeHumidityDehumidifierThreshold,
            50i64.into(),
            &limits(),
        )
        .unwrap();
        assert_eq!(outcome.delta.get(attr::TARGET_HUMIDITY), Some(&json!(50)));
        assert!(outcome.correction.is_none());
    }

    #[test]
    fn target_state_other_than_dehumidify_is_rejected() {
        let ok = set(
            Characteristic::TargetHumidifierDehumidifierState,
            2i64.into(),
            &limits(),
        )
        .unwrap();
        assert!(ok.delta.is_empty());

        for code in [0i64, 1] {
            let result = set(
                Characteristic::TargetHumidifierDehumidifierState,
                code.into(),
                &limits(),
            );
            assert!(matches!(
                result,
                Err(CapabilityViolation::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn value_reports_fixed_target_state() {
        let state = DehumidifierState::from_raw(&RawState::new());
        assert_eq!(
            state.value(Characteristic::TargetHumidifierDehumidifierState),
            Some(CharacteristicValue::Int(2))
        );
        assert_eq!(
            state.value(Characteristic::TankFull),
            Some(CharacteristicValue::Bool(false))
        );
        assert_eq!(state.value(Characteristic::WaterLevel), None);
    }
}
