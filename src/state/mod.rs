// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw device state management types.
//!
//! [`RawState`] holds the attribute mapping last reported by the gateway for
//! one appliance, [`StateDelta`] the fields a host request changes, and
//! [`WatchSnapshot`] the handful of attributes whose changes are logged.
//!
//! # Examples
//!
//! ```
//! use midea_lan::state::{RawState, StateDelta, attr};
//!
//! let mut state = RawState::new();
//! state.apply(&StateDelta::new().with(attr::MODE, 2));
//!
//! assert_eq!(state.mode(), Some(2));
//! ```

mod raw_state;
mod state_change;

pub use raw_state::{RawState, StateDelta, attr};
pub use state_change::{AttributeTransition, WatchSnapshot, WatchedField};
