// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager for coordinating multiple Midea appliances.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast, oneshot, watch};

use crate::Capabilities;
use crate::capabilities::AccessoryInfo;
use crate::config::SyncSettings;
use crate::error::{ConfigError, Error};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::projection::SemanticState;
use crate::protocol::{Gateway, Host};
use crate::state::{RawState, WatchSnapshot};
use crate::types::{Characteristic, CharacteristicValue};

use super::device_config::DeviceContext;
use super::session::DeviceSession;
use super::{dispatcher, sync_loop};

/// Manager for a set of appliances reached through one [`Gateway`].
///
/// Each registered device gets a session holding its raw state and a
/// background loop polling the gateway every [`SyncSettings::interval`].
/// Host reads are answered from the local state; host writes are applied
/// locally at once and sent to the gateway in the background, in the order
/// they were made. Gateway calls for the same device never overlap.
///
/// # Examples
///
/// ```no_run
/// use midea_lan::manager::{DeviceContext, DeviceManager};
/// use midea_lan::protocol::{DeviceIdentity, Gateway, Host};
/// use midea_lan::state::StateDelta;
/// use midea_lan::types::{Characteristic, CharacteristicValue, DeviceKind};
/// use midea_lan::{DeviceId, GatewayError, SyncSettings};
///
/// struct Lan;
///
/// impl Gateway for Lan {
///     async fn fetch_state(&self, _: &DeviceIdentity) -> Result<String, GatewayError> {
///         Ok("{'running': True, 'mode': 3}".into())
///     }
///
///     async fn send_state(&self, _: &DeviceIdentity, _: &StateDelta) -> Result<(), GatewayError> {
///         Ok(())
///     }
/// }
///
/// struct Bridge;
///
/// impl Host for Bridge {
///     fn update_characteristic(&self, _: &DeviceId, _: Characteristic, _: CharacteristicValue) {}
/// }
///
/// #[tokio::main]
/// async fn main() -> midea_lan::Result<()> {
///     let manager = DeviceManager::new(Lan, Bridge, SyncSettings::default())?;
///
///     let context = DeviceContext::new("150633093847123", DeviceKind::Dehumidifier, "192.168.1.40");
///     let device_id = manager.add_device(context).await?;
///
///     manager
///         .on_set(&device_id, Characteristic::RelativeHumidityDehumidifierThreshold, 50.0f64.into())
///         .await?;
///
///     manager.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct DeviceManager<G: Gateway, H: Host> {
    gateway: Arc<G>,
    host: Arc<H>,
    settings: SyncSettings,
    /// Registered devices, keyed by device ID.
    devices: Arc<RwLock<HashMap<DeviceId, Arc<DeviceSession>>>>,
    /// Ids whose registration is in progress.
    registering: Arc<parking_lot::Mutex<HashSet<DeviceId>>>,
    /// Event bus for broadcasting device events.
    event_bus: EventBus,
}

/// Holds a device id in the registering set until dropped.
struct Reservation<'a> {
    registering: &'a parking_lot::Mutex<HashSet<DeviceId>>,
    device_id: DeviceId,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.registering.lock().remove(&self.device_id);
    }
}

impl<G: Gateway, H: Host> DeviceManager<G, H> {
    /// Creates a manager with no devices.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] if the settings fail
    /// [`SyncSettings::validate`].
    pub fn new(gateway: G, host: H, settings: SyncSettings) -> Result<Self, ConfigError> {
        Self::with_shared(Arc::new(gateway), Arc::new(host), settings)
    }

    /// Creates a manager over an already shared gateway and host.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_shared(
        gateway: Arc<G>,
        host: Arc<H>,
        settings: SyncSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            gateway,
            host,
            settings,
            devices: Arc::new(RwLock::new(HashMap::new())),
            registering: Arc::new(parking_lot::Mutex::new(HashSet::new())),
            event_bus: EventBus::new(),
        })
    }

    /// Returns the runtime settings.
    #[must_use]
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to device events of every managed device.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Registers a device.
    ///
    /// The state is fetched once before the device is added; every watched
    /// attribute is logged as a change from unknown and the full value set
    /// is pushed to the host. The poll loop starts afterwards, its first
    /// tick one interval later.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedDeviceType`] if the type code is neither an air
    ///   conditioner nor a dehumidifier
    /// - [`Error::DuplicateDevice`] if the id is already registered or its
    ///   registration is in progress
    /// - [`Error::Initialization`] if the first fetch or decode fails; the
    ///   device is then not registered
    pub async fn add_device(&self, context: DeviceContext) -> Result<DeviceId, Error> {
        let kind = context.device_kind().inspect_err(|e| {
            tracing::warn!(device_id = %context.device_id, error = %e, "Unsupported device type");
        })?;
        let device_id = context.device_id.clone();

        let _reservation = self.reserve(&device_id)?;
        if self.devices.read().await.contains_key(&device_id) {
            return Err(Error::DuplicateDevice(device_id));
        }

        let session = Arc::new(DeviceSession::new(context, kind, &self.settings));

        if let Err(e) = sync_loop::synchronize(
            &session,
            self.gateway.as_ref(),
            self.host.as_ref(),
            &self.event_bus,
            &WatchSnapshot::default(),
        )
        .await
        {
            tracing::error!(
                %device_id,
                name = %session.name(),
                error = %e,
                "Failed to initialize device"
            );
            self.event_bus
                .publish(DeviceEvent::initialization_failed(device_id.clone(), &e));
            return Err(e.into_initialization(device_id));
        }

        self.devices
            .write()
            .await
            .insert(device_id.clone(), Arc::clone(&session));

        tracing::info!(
            %device_id,
            name = %session.name(),
            %kind,
            config = %session.context.config_snippet(),
            "Device registered"
        );

        if let Some(queue) = session.take_queue() {
            session.add_task(dispatcher::spawn_writer(
                Arc::clone(&session),
                queue,
                Arc::clone(&self.gateway),
                self.event_bus.clone(),
            ));
        }
        session.add_task(sync_loop::spawn(
            Arc::clone(&session),
            Arc::clone(&self.gateway),
            Arc::clone(&self.host),
            self.event_bus.clone(),
            self.settings.interval,
        ));

        self.event_bus.publish(DeviceEvent::device_added(
            device_id.clone(),
            kind,
            session.name(),
        ));

        Ok(device_id)
    }

    fn reserve(&self, device_id: &DeviceId) -> Result<Reservation<'_>, Error> {
        if !self.registering.lock().insert(device_id.clone()) {
            return Err(Error::DuplicateDevice(device_id.clone()));
        }
        Ok(Reservation {
            registering: &self.registering,
            device_id: device_id.clone(),
        })
    }

    /// Registers several devices one after another.
    ///
    /// A failing device does not stop the others; each result is reported
    /// next to its id.
    pub async fn add_devices(
        &self,
        contexts: impl IntoIterator<Item = DeviceContext>,
    ) -> Vec<(DeviceId, Result<(), Error>)> {
        let mut results = Vec::new();
        for context in contexts {
            let device_id = context.device_id.clone();
            let result = self.add_device(context).await.map(|_| ());
            results.push((device_id, result));
        }
        results
    }

    /// Removes a device and stops its poll loop and send queue.
    ///
    /// Writes still waiting in the queue are discarded.
    ///
    /// # Returns
    ///
    /// Returns `true` if the device was found and removed, `false` otherwise.
    pub async fn remove_device(&self, device_id: &DeviceId) -> bool {
        let Some(session) = self.devices.write().await.remove(device_id) else {
            return false;
        };

        session.stop().await;
        tracing::info!(%device_id, name = %session.name(), "Device removed");
        self.event_bus
            .publish(DeviceEvent::device_removed(device_id.clone()));
        true
    }

    /// Returns a list of all device IDs.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().cloned().collect()
    }

    /// Returns the number of managed devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Stops every poll loop and send queue and forgets all devices.
    pub async fn shutdown(&self) {
        let sessions: Vec<_> = self.devices.write().await.drain().map(|(_, s)| s).collect();
        for session in sessions {
            session.stop().await;
        }
    }

    // =========================================================================
    // Host Interface
    // =========================================================================

    /// Answers a host read from the local state.
    ///
    /// Never waits for the gateway. `None` means the characteristic is
    /// supported but has no value yet.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotFound`] if the device is not registered
    /// - [`Error::Capability`] if the device kind has no such characteristic
    pub async fn on_get(
        &self,
        device_id: &DeviceId,
        characteristic: Characteristic,
    ) -> Result<Option<CharacteristicValue>, Error> {
        let session = self.session(device_id).await?;
        session.capabilities.check_readable(characteristic)?;
        Ok(session.semantic_state().value(characteristic))
    }

    /// Handles a host write.
    ///
    /// The change is applied to the local state before this returns. The
    /// gateway call runs in the background, after every write queued
    /// earlier for the same device; its failure is only logged and
    /// published.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotFound`] if the device is not registered
    /// - [`Error::Capability`] if the characteristic is not writable or the
    ///   value is outside the device model; nothing is sent
    pub async fn on_set(
        &self,
        device_id: &DeviceId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), Error> {
        let session = self.session(device_id).await?;
        dispatcher::prepare(
            &session,
            &self.host,
            &self.settings,
            characteristic,
            value,
            None,
        )?;
        Ok(())
    }

    /// Like [`on_set`](Self::on_set), but waits for the gateway.
    ///
    /// The local state keeps the new value even if the gateway fails.
    ///
    /// # Errors
    ///
    /// Same as [`on_set`](Self::on_set), plus [`Error::Gateway`] if the
    /// send fails and [`Error::DeviceNotFound`] if the device is removed
    /// before the write is sent.
    pub async fn on_set_confirmed(
        &self,
        device_id: &DeviceId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Result<(), Error> {
        let session = self.session(device_id).await?;
        let (reply, response) = oneshot::channel();
        let queued = dispatcher::prepare(
            &session,
            &self.host,
            &self.settings,
            characteristic,
            value,
            Some(reply),
        )?;
        if queued {
            response
                .await
                .map_err(|_| Error::DeviceNotFound(device_id.clone()))??;
        }
        Ok(())
    }

    /// Runs one poll of a device now, outside its schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`], or the fetch or decode failure.
    pub async fn refresh(&self, device_id: &DeviceId) -> Result<(), Error> {
        let session = self.session(device_id).await?;
        sync_loop::poll_once(
            &session,
            self.gateway.as_ref(),
            self.host.as_ref(),
            &self.event_bus,
        )
        .await
    }

    // =========================================================================
    // State Queries
    // =========================================================================

    /// Returns a copy of the raw attribute map.
    pub async fn raw_state(&self, device_id: &DeviceId) -> Option<RawState> {
        self.find(device_id).await.map(|s| s.raw_state())
    }

    /// Returns the host-facing view of the current state.
    pub async fn semantic_state(&self, device_id: &DeviceId) -> Option<SemanticState> {
        self.find(device_id).await.map(|s| s.semantic_state())
    }

    /// Returns a receiver that sees every raw state change of a device.
    pub async fn watch_device(&self, device_id: &DeviceId) -> Option<watch::Receiver<RawState>> {
        self.find(device_id).await.map(|s| s.watch_state())
    }

    /// Returns the accessory information of a device.
    pub async fn accessory_info(&self, device_id: &DeviceId) -> Option<AccessoryInfo> {
        self.find(device_id).await.map(|s| s.accessory_info())
    }

    /// Returns the characteristic model of a device.
    pub async fn capabilities(&self, device_id: &DeviceId) -> Option<Capabilities> {
        self.find(device_id).await.map(|s| s.capabilities.clone())
    }

    /// Returns when the state was last replaced by a successful poll.
    pub async fn last_poll(&self, device_id: &DeviceId) -> Option<DateTime<Utc>> {
        self.find(device_id).await.and_then(|s| s.last_poll())
    }

    async fn find(&self, device_id: &DeviceId) -> Option<Arc<DeviceSession>> {
        self.devices.read().await.get(device_id).cloned()
    }

    async fn session(&self, device_id: &DeviceId) -> Result<Arc<DeviceSession>, Error> {
        self.find(device_id)
            .await
            .ok_or_else(|| Error::DeviceNotFound(device_id.clone()))
    }
}

impl<G: Gateway, H: Host> Clone for DeviceManager<G, H> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            host: Arc::clone(&self.host),
            settings: self.settings,
            devices: Arc::clone(&self.devices),
            registering: Arc::clone(&self.registering),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<G: Gateway, H: Host> std::fmt::Debug for DeviceManager<G, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("settings", &self.settings)
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}
