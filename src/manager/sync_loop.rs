// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic state synchronization.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::error::Error;
use crate::event::{DeviceEvent, EventBus};
use crate::protocol::{Gateway, Host};
use crate::state::{AttributeTransition, WatchSnapshot};

use super::session::DeviceSession;

/// Fetches the state once, pushes every value to the host and reports the
/// watched attributes that changed since `before`.
///
/// On failure nothing is stored or pushed.
pub(crate) async fn synchronize<G: Gateway, H: Host>(
    session: &DeviceSession,
    gateway: &G,
    host: &H,
    events: &EventBus,
    before: &WatchSnapshot,
) -> Result<Vec<AttributeTransition>, Error> {
    session.poll(gateway).await?;

    let (after, values) = {
        let raw = session.raw_state();
        let semantic = crate::projection::SemanticState::project(session.kind, &raw);
        (
            WatchSnapshot::capture(&raw),
            semantic.values(&session.capabilities),
        )
    };

    for (characteristic, value) in values {
        host.update_characteristic(session.id(), characteristic, value);
    }

    let transitions = before.transitions_to(&after);
    for transition in &transitions {
        tracing::info!(
            device_id = %session.id(),
            name = %session.name(),
            field = %transition.field,
            value = %transition.describe_current(),
            "Device attribute changed"
        );
        events.publish(DeviceEvent::attribute_changed(
            session.id().clone(),
            transition.clone(),
        ));
    }
    Ok(transitions)
}

/// One loop tick. Failures are logged and absorbed.
pub(crate) async fn poll_once<G: Gateway, H: Host>(
    session: &DeviceSession,
    gateway: &G,
    host: &H,
    events: &EventBus,
) -> Result<(), Error> {
    let before = WatchSnapshot::capture(&session.raw_state());
    match synchronize(session, gateway, host, events, &before).await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(
                device_id = %session.id(),
                name = %session.name(),
                error = %e,
                "Error retrieving device state"
            );
            events.publish(DeviceEvent::poll_failed(session.id().clone(), &e));
            Err(e)
        }
    }
}

/// Spawns the poll loop of `session`.
///
/// The first tick fires one `period` after spawning, since registration has
/// just fetched the state. A slow gateway delays the following ticks rather
/// than bunching them up. The loop ends when the session's shutdown signal
/// fires or its sender is dropped.
pub(crate) fn spawn<G: Gateway, H: Host>(
    session: Arc<DeviceSession>,
    gateway: Arc<G>,
    host: Arc<H>,
    events: EventBus,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown = session.shutdown_signal();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(device_id = %session.id(), ?period, "Sync loop started");

        while !*shutdown.borrow_and_update() {
            tokio::select! {
                _ = ticker.tick() => {
                    // Errors are logged and published by poll_once.
                    let _ = poll_once(&session, gateway.as_ref(), host.as_ref(), &events).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(device_id = %session.id(), "Sync loop stopped");
    })
}
