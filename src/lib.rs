// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `midea_lan` - State synchronization for Midea LAN appliances.
//!
//! This library keeps a local copy of each appliance's state, polls a
//! gateway for updates and translates between the appliance's raw
//! attributes and the characteristics a home-automation host exposes.
//!
//! # Supported Appliances
//!
//! - Air conditioners (type `0xAC`): heater-cooler, fan-only switch,
//!   outdoor temperature
//! - Dehumidifiers (type `0xA1`): humidity threshold, fan, water tank
//!
//! # Architecture
//!
//! - [`Gateway`]: reaches the appliance. Returns its state as text and
//!   accepts attribute deltas.
//! - [`telemetry`]: decodes the gateway's text into an attribute map.
//! - [`projection`]: derives characteristic values from that map and turns
//!   host writes back into deltas.
//! - [`DeviceManager`]: one session per appliance with a periodic poll, a
//!   per-device lock so calls never overlap, and optimistic writes.
//! - [`Host`]: receives pushed characteristic values.
//!
//! # Quick Start
//!
//! ```no_run
//! use midea_lan::protocol::{DeviceIdentity, Gateway, Host};
//! use midea_lan::state::StateDelta;
//! use midea_lan::types::{Characteristic, CharacteristicValue};
//! use midea_lan::{DeviceId, DeviceManager, GatewayError, PlatformConfig};
//!
//! struct Lan;
//!
//! impl Gateway for Lan {
//!     async fn fetch_state(&self, _: &DeviceIdentity) -> Result<String, GatewayError> {
//!         Ok("{'running': True, 'mode': 2, 'target_temperature': 24.0}".into())
//!     }
//!
//!     async fn send_state(&self, _: &DeviceIdentity, _: &StateDelta) -> Result<(), GatewayError> {
//!         Ok(())
//!     }
//! }
//!
//! struct Bridge;
//!
//! impl Host for Bridge {
//!     fn update_characteristic(&self, id: &DeviceId, c: Characteristic, v: CharacteristicValue) {
//!         println!("{id}: {c} = {v}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> midea_lan::Result<()> {
//!     let config = PlatformConfig::from_file("config.json")?;
//!     let manager = DeviceManager::new(Lan, Bridge, config.sync_settings()?)?;
//!
//!     for (device_id, result) in manager.add_devices(config.device_contexts()).await {
//!         if let Err(e) = result {
//!             eprintln!("{device_id}: {e}");
//!         }
//!     }
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
//!     manager.shutdown().await;
//!     Ok(())
//! }
//! ```

mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod projection;
pub mod protocol;
pub mod state;
pub mod telemetry;
pub mod types;

pub use capabilities::{AccessoryInfo, Capabilities, CharacteristicProps};
pub use config::{AppProfile, PlatformConfig, SyncSettings};
pub use error::{CapabilityViolation, ConfigError, DecodeError, Error, GatewayError, Result};
pub use event::{DeviceEvent, DeviceId, EventKind};
pub use manager::{DeviceContext, DeviceManager};
pub use projection::{SemanticState, SetOutcome};
pub use protocol::{DeviceIdentity, Gateway, Host};
pub use state::{RawState, StateDelta};
pub use types::{Characteristic, CharacteristicValue, DeviceKind};
