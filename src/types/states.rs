// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enumerated characteristic states and their host codes.

use serde::{Deserialize, Serialize};

use super::CharacteristicValue;

/// Declares an enumerated characteristic state with fixed host codes.
macro_rules! host_state {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Returns the code the host uses for this state.
            #[must_use]
            pub const fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            /// Maps a host code back to a state.
            #[must_use]
            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<$name> for CharacteristicValue {
            fn from(state: $name) -> Self {
                Self::Int(i64::from(state.code()))
            }
        }
    };
}

host_state! {
    /// Power state.
    Active {
        /// Off.
        Inactive = 0,
        /// On.
        Active = 1,
    }
}

host_state! {
    /// Louvre swing.
    SwingMode {
        /// Louvres fixed.
        Disabled = 0,
        /// Louvres swinging.
        Enabled = 1,
    }
}

host_state! {
    /// Units shown on the appliance display.
    TemperatureDisplayUnits {
        /// Celsius.
        Celsius = 0,
        /// Fahrenheit.
        Fahrenheit = 1,
    }
}

host_state! {
    /// What an air conditioner is currently doing.
    CurrentHeaterCoolerState {
        /// Switched off.
        Inactive = 0,
        /// On, neither heating nor cooling.
        Idle = 1,
        /// Heating.
        Heating = 2,
        /// Cooling.
        Cooling = 3,
    }
}

host_state! {
    /// What an air conditioner has been asked to do.
    TargetHeaterCoolerState {
        /// Device decides.
        Auto = 0,
        /// Heat.
        Heat = 1,
        /// Cool.
        Cool = 2,
    }
}

host_state! {
    /// What a dehumidifier is currently doing.
    CurrentDehumidifierState {
        /// Switched off.
        Inactive = 0,
        /// On, target reached.
        Idle = 1,
        /// Humidifying (never reported by these devices).
        Humidifying = 2,
        /// Extracting moisture.
        Dehumidifying = 3,
    }
}

host_state! {
    /// What a humidifier/dehumidifier has been asked to do.
    TargetDehumidifierState {
        /// Either direction.
        HumidifierOrDehumidifier = 0,
        /// Humidify.
        Humidifier = 1,
        /// Dehumidify.
        Dehumidifier = 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_host_numbering() {
        assert_eq!(CurrentHeaterCoolerState::Cooling.code(), 3);
        assert_eq!(TargetHeaterCoolerState::Cool.code(), 2);
        assert_eq!(CurrentDehumidifierState::Dehumidifying.code(), 3);
        assert_eq!(TargetDehumidifierState::Dehumidifier.code(), 2);
    }

    #[test]
    fn from_code_rejects_unknown() {
        assert_eq!(TargetHeaterCoolerState::from_code(1), Some(TargetHeaterCoolerState::Heat));
        assert_eq!(TargetHeaterCoolerState::from_code(3), None);
        assert_eq!(Active::from_code(-1), None);
    }

    #[test]
    fn converts_to_characteristic_value() {
        assert_eq!(
            CharacteristicValue::from(SwingMode::Enabled),
            CharacteristicValue::Int(1)
        );
    }
}
