// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projections shared by both device kinds.

use serde_json::Value;

use crate::error::CapabilityViolation;
use crate::state::{RawState, StateDelta, attr};
use crate::types::{Active, Characteristic, CharacteristicValue, SwingMode};

pub(crate) fn active(raw: &RawState) -> Active {
    if raw.running() {
        Active::Active
    } else {
        Active::Inactive
    }
}

pub(crate) fn set_active(value: CharacteristicValue) -> StateDelta {
    StateDelta::new().with(attr::RUNNING, value.is_on())
}

/// Enabled if either louvre swings.
pub(crate) fn swing(raw: &RawState) -> SwingMode {
    if raw.vertical_swing() || raw.horizontal_swing() {
        SwingMode::Enabled
    } else {
        SwingMode::Disabled
    }
}

/// Both louvres are always driven together.
pub(crate) fn set_swing(value: CharacteristicValue) -> StateDelta {
    let on = value.is_on();
    StateDelta::new()
        .with(attr::VERTICAL_SWING, on)
        .with(attr::HORIZONTAL_SWING, on)
}

pub(crate) fn require_number(
    characteristic: Characteristic,
    value: CharacteristicValue,
) -> Result<f64, CapabilityViolation> {
    value.as_f64().ok_or_else(|| invalid(characteristic, value))
}

pub(crate) fn require_code(
    characteristic: Characteristic,
    value: CharacteristicValue,
) -> Result<i64, CapabilityViolation> {
    value.as_code().ok_or_else(|| invalid(characteristic, value))
}

pub(crate) fn invalid(
    characteristic: Characteristic,
    value: CharacteristicValue,
) -> CapabilityViolation {
    CapabilityViolation::InvalidValue {
        characteristic,
        value: value.to_string(),
    }
}

/// Integral numbers are stored as JSON integers, like the device reports them.
pub(crate) fn json_number(value: f64) -> Value {
    #[allow(clippy::cast_possible_truncation)]
    let int = value as i64;
    #[allow(clippy::cast_precision_loss)]
    let exact = value.fract() == 0.0 && int as f64 == value;
    if exact {
        Value::from(int)
    } else {
        Value::from(value)
    }
}

pub(crate) fn same_number(a: f64, b: f64) -> bool {
    (a - b).abs() < f64::EPSILON
}
