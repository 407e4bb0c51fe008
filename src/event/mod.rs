// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifiers and the event stream.
//!
//! The device manager publishes a [`DeviceEvent`] for every registration,
//! removal, failed poll, sent command and watched attribute transition on an
//! [`EventBus`] backed by a tokio broadcast channel.
//!
//! # Examples
//!
//! ```
//! use midea_lan::event::{DeviceEvent, DeviceId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::poll_failed(DeviceId::new("42"), "timeout"));
//! assert!(rx.try_recv().unwrap().is_failure());
//! ```

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::{DeviceEvent, EventKind};
pub use device_id::DeviceId;
pub use event_bus::EventBus;
