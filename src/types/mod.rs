// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the projection layer and the host interface.
//!
//! # Types
//!
//! - [`DeviceKind`] - Air conditioner or dehumidifier
//! - [`AcMode`] / [`DehumidifierMode`] - Raw operational modes
//! - [`Characteristic`] / [`CharacteristicValue`] - Host-facing names and values
//! - [`Active`], [`SwingMode`], [`CurrentHeaterCoolerState`], ... - Enumerated
//!   characteristic states with their host codes

mod characteristic;
mod device_kind;
mod mode;
mod states;

pub use characteristic::{Characteristic, CharacteristicValue};
pub use device_kind::DeviceKind;
pub(crate) use device_kind::deserialize_type_code;
pub use mode::{AcMode, DehumidifierMode};
pub use states::{
    Active, CurrentDehumidifierState, CurrentHeaterCoolerState, SwingMode,
    TargetDehumidifierState, TargetHeaterCoolerState, TemperatureDisplayUnits,
};
