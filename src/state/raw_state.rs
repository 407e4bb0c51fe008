// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw appliance attributes and attribute deltas.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute names the projection layer depends on.
pub mod attr {
    /// Power flag.
    pub const RUNNING: &str = "running";
    /// Operational mode code.
    pub const MODE: &str = "mode";
    /// Raw fan speed (20/40/60/80/100/102).
    pub const FAN_SPEED: &str = "fan_speed";
    /// Vertical louvre swing flag.
    pub const VERTICAL_SWING: &str = "vertical_swing";
    /// Horizontal louvre swing flag.
    pub const HORIZONTAL_SWING: &str = "horizontal_swing";
    /// Indoor temperature (air conditioners).
    pub const INDOOR_TEMPERATURE: &str = "indoor_temperature";
    /// Outdoor unit temperature (air conditioners).
    pub const OUTDOOR_TEMPERATURE: &str = "outdoor_temperature";
    /// Temperature set point (air conditioners).
    pub const TARGET_TEMPERATURE: &str = "target_temperature";
    /// Display unit flag (air conditioners).
    pub const FAHRENHEIT: &str = "fahrenheit";
    /// Measured humidity (dehumidifiers).
    pub const CURRENT_HUMIDITY: &str = "current_humidity";
    /// Humidity set point (dehumidifiers).
    pub const TARGET_HUMIDITY: &str = "target_humidity";
    /// Tank fill level (dehumidifiers).
    pub const TANK_LEVEL: &str = "tank_level";
    /// Tank full alarm (dehumidifiers).
    pub const TANK_FULL: &str = "tank_full";
}

/// The decoded attribute bag reported by the gateway for one device.
///
/// Unknown attributes are kept verbatim so nothing the appliance reports is
/// lost, while the fields the projection layer relies on are read through
/// typed accessors that tolerate missing or oddly typed values.
///
/// # Examples
///
/// ```
/// use midea_lan::state::{RawState, StateDelta};
///
/// let mut state = RawState::new();
/// state.apply(&StateDelta::new().with("running", true).with("fan_speed", 60));
///
/// assert!(state.running());
/// assert_eq!(state.fan_speed(), Some(60));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawState {
    attributes: Map<String, Value>,
}

impl RawState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a decoded attribute mapping.
    #[must_use]
    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// Returns all attributes.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns a single attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns `true` if no attributes are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Writes every field of `delta`, returning whether anything changed.
    pub fn apply(&mut self, delta: &StateDelta) -> bool {
        let mut changed = false;
        for (key, value) in delta.iter() {
            if self.attributes.get(key) != Some(value) {
                self.attributes.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    // ========== Typed accessors ==========

    /// Reads a flag. Numeric flags are accepted (`0` is false).
    #[must_use]
    pub fn bool_attr(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            _ => None,
        }
    }

    /// Reads a numeric attribute.
    #[must_use]
    pub fn number_attr(&self, key: &str) -> Option<f64> {
        self.attributes.get(key)?.as_f64()
    }

    /// Reads an integral attribute. `40.0` reads as `40`, `40.5` as `None`.
    #[must_use]
    pub fn int_attr(&self, key: &str) -> Option<i64> {
        let value = self.attributes.get(key)?;
        if let Some(i) = value.as_i64() {
            return Some(i);
        }
        let f = value.as_f64()?;
        if f.fract() != 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let i = f as i64;
        Some(i)
    }

    /// Whether the appliance is switched on. Unknown reads as off.
    #[must_use]
    pub fn running(&self) -> bool {
        self.bool_attr(attr::RUNNING).unwrap_or(false)
    }

    /// Raw operational mode code.
    #[must_use]
    pub fn mode(&self) -> Option<i64> {
        self.int_attr(attr::MODE)
    }

    /// Raw fan speed.
    #[must_use]
    pub fn fan_speed(&self) -> Option<i64> {
        self.int_attr(attr::FAN_SPEED)
    }

    /// Vertical swing flag.
    #[must_use]
    pub fn vertical_swing(&self) -> bool {
        self.bool_attr(attr::VERTICAL_SWING).unwrap_or(false)
    }

    /// Horizontal swing flag.
    #[must_use]
    pub fn horizontal_swing(&self) -> bool {
        self.bool_attr(attr::HORIZONTAL_SWING).unwrap_or(false)
    }

    /// Indoor temperature.
    #[must_use]
    pub fn indoor_temperature(&self) -> Option<f64> {
        self.number_attr(attr::INDOOR_TEMPERATURE)
    }

    /// Outdoor unit temperature.
    #[must_use]
    pub fn outdoor_temperature(&self) -> Option<f64> {
        self.number_attr(attr::OUTDOOR_TEMPERATURE)
    }

    /// Temperature set point.
    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.number_attr(attr::TARGET_TEMPERATURE)
    }

    /// Whether the display shows Fahrenheit.
    #[must_use]
    pub fn fahrenheit(&self) -> bool {
        self.bool_attr(attr::FAHRENHEIT).unwrap_or(false)
    }

    /// Measured humidity.
    #[must_use]
    pub fn current_humidity(&self) -> Option<f64> {
        self.number_attr(attr::CURRENT_HUMIDITY)
    }

    /// Humidity set point.
    #[must_use]
    pub fn target_humidity(&self) -> Option<f64> {
        self.number_attr(attr::TARGET_HUMIDITY)
    }

    /// Tank fill level.
    #[must_use]
    pub fn tank_level(&self) -> Option<f64> {
        self.number_attr(attr::TANK_LEVEL)
    }

    /// Tank full alarm.
    #[must_use]
    pub fn tank_full(&self) -> bool {
        self.bool_attr(attr::TANK_FULL).unwrap_or(false)
    }
}

impl From<Map<String, Value>> for RawState {
    fn from(attributes: Map<String, Value>) -> Self {
        Self::from_attributes(attributes)
    }
}

/// Raw attribute changes produced by a host "set" request.
///
/// Only the fields that the request changes are carried; this is exactly what
/// is sent to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDelta(Map<String, Value>);

impl StateDelta {
    /// Creates an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a field.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Returns a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterates over the fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns `true` if the delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the fields as a JSON mapping.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl std::fmt::Display for StateDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}
