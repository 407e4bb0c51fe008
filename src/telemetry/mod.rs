// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing of the state text returned by the gateway.
//!
//! The gateway reports a device's state as an object literal in its own repr
//! syntax. [`decode`] turns it into an attribute mapping that becomes the
//! device's [`RawState`](crate::state::RawState).
//!
//! # Examples
//!
//! ```
//! use midea_lan::telemetry::decode;
//!
//! let (attrs, err) = decode("{'_running': False, '_target_humidity': 50}");
//!
//! assert!(err.is_none());
//! assert_eq!(attrs["running"], false);
//! assert_eq!(attrs["target_humidity"], 50);
//! ```

mod repr;

pub use repr::{Attributes, decode, normalize, try_decode};
