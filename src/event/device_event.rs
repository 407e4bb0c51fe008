// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{AttributeTransition, StateDelta};
use crate::types::DeviceKind;

use super::DeviceId;

/// An event emitted by the device manager.
///
/// # Examples
///
/// ```
/// use midea_lan::event::{DeviceEvent, DeviceId, EventKind};
/// use midea_lan::types::DeviceKind;
///
/// let event = DeviceEvent::device_added(DeviceId::new("42"), DeviceKind::Dehumidifier, "Cellar");
///
/// assert!(event.is_lifecycle());
/// assert!(matches!(event.kind, EventKind::DeviceAdded { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEvent {
    /// The device concerned.
    pub device_id: DeviceId,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// What happened to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// The device was registered and its poll loop started.
    DeviceAdded {
        /// Appliance kind.
        kind: DeviceKind,
        /// Display name.
        name: String,
    },

    /// The device was removed and its poll loop stopped.
    DeviceRemoved,

    /// The first state fetch failed; the device was not registered.
    InitializationFailed {
        /// Why.
        error: String,
    },

    /// A watched attribute changed between two polls.
    AttributeChanged {
        /// The change.
        transition: AttributeTransition,
    },

    /// A poll failed; the previous state was kept.
    PollFailed {
        /// Why.
        error: String,
    },

    /// A command reached the gateway.
    CommandSent {
        /// Fields written.
        delta: StateDelta,
    },

    /// A command failed at the gateway. The optimistic write is kept.
    CommandFailed {
        /// Fields that were to be written.
        delta: StateDelta,
        /// Why.
        error: String,
    },
}

impl DeviceEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(device_id: DeviceId, kind: EventKind) -> Self {
        Self {
            device_id,
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: DeviceId, kind: DeviceKind, name: impl Into<String>) -> Self {
        Self::new(
            device_id,
            EventKind::DeviceAdded {
                kind,
                name: name.into(),
            },
        )
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(device_id: DeviceId) -> Self {
        Self::new(device_id, EventKind::DeviceRemoved)
    }

    /// Creates an initialization failure event.
    #[must_use]
    pub fn initialization_failed(device_id: DeviceId, error: impl ToString) -> Self {
        Self::new(
            device_id,
            EventKind::InitializationFailed {
                error: error.to_string(),
            },
        )
    }

    /// Creates an attribute change event.
    #[must_use]
    pub fn attribute_changed(device_id: DeviceId, transition: AttributeTransition) -> Self {
        Self::new(device_id, EventKind::AttributeChanged { transition })
    }

    /// Creates a poll failure event.
    #[must_use]
    pub fn poll_failed(device_id: DeviceId, error: impl ToString) -> Self {
        Self::new(
            device_id,
            EventKind::PollFailed {
                error: error.to_string(),
            },
        )
    }

    /// Creates a command sent event.
    #[must_use]
    pub fn command_sent(device_id: DeviceId, delta: StateDelta) -> Self {
        Self::new(device_id, EventKind::CommandSent { delta })
    }

    /// Creates a command failure event.
    #[must_use]
    pub fn command_failed(device_id: DeviceId, delta: StateDelta, error: impl ToString) -> Self {
        Self::new(
            device_id,
            EventKind::CommandFailed {
                delta,
                error: error.to_string(),
            },
        )
    }

    /// Returns `true` for registration and removal.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self.kind,
            EventKind::DeviceAdded { .. }
                | EventKind::DeviceRemoved
                | EventKind::InitializationFailed { .. }
        )
    }

    /// Returns `true` for failed polls and commands.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::InitializationFailed { .. }
                | EventKind::PollFailed { .. }
                | EventKind::CommandFailed { .. }
        )
    }
}
