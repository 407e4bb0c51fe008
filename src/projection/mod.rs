// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping between raw attributes and host characteristics.
//!
//! Every function here is pure: [`SemanticState::project`] derives the host
//! view from a [`RawState`], and [`unproject`] turns a host write into the
//! [`StateDelta`] to send. Neither touches the gateway or any lock.
//!
//! # Examples
//!
//! ```
//! use midea_lan::config::SyncSettings;
//! use midea_lan::projection::{SemanticState, unproject};
//! use midea_lan::state::RawState;
//! use midea_lan::types::{Characteristic, CharacteristicValue, DeviceKind};
//!
//! let raw = RawState::new();
//! let outcome = unproject(
//!     DeviceKind::AirConditioner,
//!     &raw,
//!     Characteristic::RotationSpeed,
//!     CharacteristicValue::Int(50),
//!     &SyncSettings::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(outcome.delta.get("fan_speed"), Some(&serde_json::json!(60)));
//!
//! let state = SemanticState::project(DeviceKind::AirConditioner, &raw);
//! assert_eq!(state.value(Characteristic::Active), Some(CharacteristicValue::Int(0)));
//! ```

mod air_conditioner;
mod common;
mod dehumidifier;

pub use air_conditioner::AirConditionerState;
pub use dehumidifier::DehumidifierState;

use serde::Serialize;

use crate::Capabilities;
use crate::config::SyncSettings;
use crate::error::CapabilityViolation;
use crate::state::{RawState, StateDelta};
use crate::types::{Characteristic, CharacteristicValue, DeviceKind};

/// Host-facing values derived from one raw state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum SemanticState {
    /// An air conditioner.
    AirConditioner(AirConditionerState),
    /// A dehumidifier.
    Dehumidifier(DehumidifierState),
}

impl SemanticState {
    /// Projects `raw` for a device of `kind`.
    #[must_use]
    pub fn project(kind: DeviceKind, raw: &RawState) -> Self {
        match kind {
            DeviceKind::AirConditioner => {
                Self::AirConditioner(AirConditionerState::from_raw(raw))
            }
            DeviceKind::Dehumidifier => Self::Dehumidifier(DehumidifierState::from_raw(raw)),
        }
    }

    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::AirConditioner(_) => DeviceKind::AirConditioner,
            Self::Dehumidifier(_) => DeviceKind::Dehumidifier,
        }
    }

    /// Returns one value, `None` if unknown or not exposed.
    #[must_use]
    pub fn value(&self, characteristic: Characteristic) -> Option<CharacteristicValue> {
        match self {
            Self::AirConditioner(state) => state.value(characteristic),
            Self::Dehumidifier(state) => state.value(characteristic),
        }
    }

    /// Returns every known value in `capabilities` order.
    #[must_use]
    pub fn values(&self, capabilities: &Capabilities) -> Vec<(Characteristic, CharacteristicValue)> {
        capabilities
            .characteristics()
            .filter_map(|c| self.value(c).map(|v| (c, v)))
            .collect()
    }
}

/// The result of mapping one host write.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOutcome {
    /// Raw fields to write. Empty means nothing to send.
    pub delta: StateDelta,
    /// Value to push back to the host when the request was adjusted.
    pub correction: Option<CharacteristicValue>,
}

impl SetOutcome {
    pub(crate) fn new(delta: StateDelta) -> Self {
        Self {
            delta,
            correction: None,
        }
    }

    pub(crate) fn with_correction(mut self, value: CharacteristicValue) -> Self {
        self.correction = Some(value);
        self
    }
}

/// Maps a host write for a device of `kind` to the raw fields to send.
///
/// # Errors
///
/// Returns a [`CapabilityViolation`] if the characteristic is not writable
/// for `kind` or the value is outside the kind's model.
pub fn unproject(
    kind: DeviceKind,
    raw: &RawState,
    characteristic: Characteristic,
    value: CharacteristicValue,
    settings: &SyncSettings,
) -> Result<SetOutcome, CapabilityViolation> {
    Capabilities::for_kind(kind, settings).check_writable(characteristic)?;
    match kind {
        DeviceKind::AirConditioner => air_conditioner::set(raw, characteristic, value),
        DeviceKind::Dehumidifier => {
            dehumidifier::set(characteristic, value, &settings.humidity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_only_characteristic_cannot_be_set() {
        let result = unproject(
            DeviceKind::Dehumidifier,
            &RawState::new(),
            Characteristic::WaterLevel,
            CharacteristicValue::Int(10),
            &SyncSettings::default(),
        );
        assert_eq!(
            result,
            Err(CapabilityViolation::ReadOnly(Characteristic::WaterLevel))
        );
    }

    #[test]
    fn foreign_characteristic_is_unsupported() {
        let result = unproject(
            DeviceKind::AirConditioner,
            &RawState::new(),
            Characteristic::RelativeHumidityDehumidifierThreshold,
            CharacteristicValue::Int(50),
            &SyncSettings::default(),
        );
        assert!(matches!(
            result,
            Err(CapabilityViolation::Unsupported { .. })
        ));
    }

    #[test]
    fn values_follow_capability_order_and_skip_unknown() {
        let raw = RawState::from_attributes(
            json!({ "running": true, "mode": 2, "fan_speed": 60 })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let settings = SyncSettings::default();
        let caps = Capabilities::for_kind(DeviceKind::AirConditioner, &settings);
        let values = SemanticState::project(DeviceKind::AirConditioner, &raw).values(&caps);

        assert_eq!(values[0], (Characteristic::Active, CharacteristicValue::Int(1)));
        assert!(values.contains(&(Characteristic::RotationSpeed, CharacteristicValue::Int(50))));
        assert!(
            !values
                .iter()
                .any(|(c, _)| *c == Characteristic::CurrentTemperature)
        );
    }

    #[test]
    fn swing_is_shared_by_both_kinds() {
        for kind in [DeviceKind::AirConditioner, DeviceKind::Dehumidifier] {
            let outcome = unproject(
                kind,
                &RawState::new(),
                Characteristic::SwingMode,
                CharacteristicValue::Bool(true),
                &SyncSettings::default(),
            )
            .unwrap();
            assert_eq!(outcome.delta.get("vertical_swing"), Some(&json!(true)));
            assert_eq!(outcome.delta.get("horizontal_swing"), Some(&json!(true)));
        }
    }
}
