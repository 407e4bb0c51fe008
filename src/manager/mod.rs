// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager for coordinating multiple Midea appliances.
//!
//! # Overview
//!
//! The [`DeviceManager`] owns one session per registered appliance. A
//! session provides:
//!
//! - **Local state**: the last decoded attribute map, answered to host reads
//!   without touching the gateway
//! - **Periodic sync**: a background loop that refetches the state and
//!   pushes every characteristic to the host
//! - **Serialized access**: polls and writes for the same device are never
//!   in flight together
//! - **Optimistic writes**: host writes show up locally at once and are sent
//!   in the background, in the order they were made
//!
//! # Watching Device State
//!
//! ```no_run
//! use midea_lan::manager::DeviceManager;
//! use midea_lan::protocol::{Gateway, Host};
//! use midea_lan::DeviceId;
//!
//! # async fn example<G: Gateway, H: Host>(manager: DeviceManager<G, H>, id: DeviceId) {
//! if let Some(mut state_rx) = manager.watch_device(&id).await {
//!     tokio::spawn(async move {
//!         while state_rx.changed().await.is_ok() {
//!             let state = state_rx.borrow();
//!             println!("Target humidity: {:?}", state.target_humidity());
//!         }
//!     });
//! }
//! # }
//! ```

mod access;
mod device_config;
mod device_manager;
mod dispatcher;
mod session;
mod sync_loop;

pub use access::AccessSerializer;
pub use device_config::DeviceContext;
pub use device_manager::DeviceManager;
