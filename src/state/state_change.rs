// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute transitions between two polls.
//!
//! Only a fixed watch-list of attributes is compared. Each tick captures a
//! [`WatchSnapshot`] before fetching, another one after the new state has been
//! stored, and logs one [`AttributeTransition`] per field that differs.
//!
//! # Examples
//!
//! ```
//! use midea_lan::state::{RawState, StateDelta, WatchSnapshot, WatchedField};
//!
//! let mut state = RawState::new();
//! let before = WatchSnapshot::capture(&state);
//!
//! state.apply(&StateDelta::new().with("running", true));
//! let transitions = before.transitions_to(&WatchSnapshot::capture(&state));
//!
//! assert_eq!(transitions.len(), 1);
//! assert_eq!(transitions[0].field, WatchedField::Power);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw_state::{RawState, attr};

/// An attribute whose changes are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchedField {
    /// `running`.
    Power,
    /// `mode`.
    Mode,
    /// `tank_level`.
    TankLevel,
    /// `tank_full`.
    TankFull,
    /// `fan_speed`.
    FanSpeed,
    /// `target_humidity`.
    TargetHumidity,
    /// `target_temperature`.
    TargetTemperature,
}

impl WatchedField {
    /// Every watched field, in log order.
    pub const ALL: [Self; 7] = [
        Self::Power,
        Self::Mode,
        Self::TankFull,
        Self::TankLevel,
        Self::FanSpeed,
        Self::TargetHumidity,
        Self::TargetTemperature,
    ];

    /// Returns the raw attribute name.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::Power => attr::RUNNING,
            Self::Mode => attr::MODE,
            Self::TankLevel => attr::TANK_LEVEL,
            Self::TankFull => attr::TANK_FULL,
            Self::FanSpeed => attr::FAN_SPEED,
            Self::TargetHumidity => attr::TARGET_HUMIDITY,
            Self::TargetTemperature => attr::TARGET_TEMPERATURE,
        }
    }

    /// Returns the label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Mode => "mode",
            Self::TankLevel => "tank level",
            Self::TankFull => "full tank",
            Self::FanSpeed => "fan speed",
            Self::TargetHumidity => "target humidity",
            Self::TargetTemperature => "target temperature",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Power => 0,
            Self::Mode => 1,
            Self::TankFull => 2,
            Self::TankLevel => 3,
            Self::FanSpeed => 4,
            Self::TargetHumidity => 5,
            Self::TargetTemperature => 6,
        }
    }
}

impl fmt::Display for WatchedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values of the watched attributes at one instant.
///
/// A missing attribute is recorded as `None`, so the very first capture of a
/// fresh session reports every present field as a transition from unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchSnapshot {
    values: [Option<Value>; 7],
}

impl WatchSnapshot {
    /// Records the watched attributes of `state`.
    #[must_use]
    pub fn capture(state: &RawState) -> Self {
        let mut snapshot = Self::default();
        for field in WatchedField::ALL {
            snapshot.values[field.index()] = state.get(field.attribute()).cloned();
        }
        snapshot
    }

    /// Returns the recorded value of `field`.
    #[must_use]
    pub fn get(&self, field: WatchedField) -> Option<&Value> {
        self.values[field.index()].as_ref()
    }

    /// Lists the fields whose value differs in `current`.
    #[must_use]
    pub fn transitions_to(&self, current: &Self) -> Vec<AttributeTransition> {
        WatchedField::ALL
            .into_iter()
            .filter(|field| self.get(*field) != current.get(*field))
            .map(|field| AttributeTransition {
                field,
                previous: self.get(field).cloned(),
                current: current.get(field).cloned(),
            })
            .collect()
    }
}

/// A watched attribute that changed between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTransition {
    /// The attribute.
    pub field: WatchedField,
    /// Value before, `None` if it was unknown.
    pub previous: Option<Value>,
    /// Value after, `None` if the appliance stopped reporting it.
    pub current: Option<Value>,
}

impl AttributeTransition {
    /// Renders the new value the way it is logged.
    ///
    /// The power flag is shown as `On`/`Off`, other values verbatim.
    #[must_use]
    pub fn describe_current(&self) -> String {
        match (&self.field, &self.current) {
            (WatchedField::Power, Some(Value::Bool(on))) => {
                if *on { "On" } else { "Off" }.to_string()
            }
            (_, Some(value)) => value.to_string(),
            (_, None) => "unknown".to_string(),
        }
    }
}
