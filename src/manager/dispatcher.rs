// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host write handling.
//!
//! A write is split in two: [`prepare`] runs synchronously in the caller,
//! validates the request, applies it to the local state and queues it. The
//! session's writer task ([`spawn_writer`]) drains that queue in order and
//! pushes each delta to the gateway under the device's serializer. Failures
//! at the gateway are logged; the local state is not rolled back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::SyncSettings;
use crate::error::{CapabilityViolation, GatewayError};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::projection;
use crate::protocol::{Gateway, Host};
use crate::types::{Characteristic, CharacteristicValue};

use super::session::{DeviceSession, PendingWrite, QueuedWrite, WriteReply};

/// Validates, applies and queues a host write.
///
/// Returns `false` when the write changes nothing on the device; `reply` is
/// then dropped unused.
pub(crate) fn prepare<H: Host>(
    session: &DeviceSession,
    host: &Arc<H>,
    settings: &SyncSettings,
    characteristic: Characteristic,
    value: CharacteristicValue,
    reply: Option<WriteReply>,
) -> Result<bool, CapabilityViolation> {
    tracing::debug!(
        device_id = %session.id(),
        %characteristic,
        %value,
        "Triggered set"
    );

    let outcome = projection::unproject(
        session.kind,
        &session.raw_state(),
        characteristic,
        value,
        settings,
    )
    .inspect_err(|e| {
        tracing::warn!(device_id = %session.id(), error = %e, "Rejected set request");
    })?;

    if let Some(corrected) = outcome.correction {
        republish(
            Arc::clone(host),
            session.id().clone(),
            characteristic,
            corrected,
            settings.republish_delay,
        );
    }

    if outcome.delta.is_empty() {
        tracing::debug!(device_id = %session.id(), %characteristic, "Nothing to send");
        return Ok(false);
    }

    session.enqueue(outcome.delta, reply);
    Ok(true)
}

/// Spawns the task that sends the session's queued writes one by one.
///
/// Stops on the session's shutdown signal. Writes still queued at that
/// point are dropped along with their reply channels.
pub(crate) fn spawn_writer<G: Gateway>(
    session: Arc<DeviceSession>,
    mut queue: mpsc::UnboundedReceiver<QueuedWrite>,
    gateway: Arc<G>,
    events: EventBus,
) -> JoinHandle<()> {
    let mut shutdown = session.shutdown_signal();

    tokio::spawn(async move {
        while !*shutdown.borrow_and_update() {
            let queued = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                queued = queue.recv() => match queued {
                    Some(queued) => queued,
                    None => break,
                },
            };

            let result = send(&session, gateway.as_ref(), &events, queued.write).await;
            if let Some(reply) = queued.reply {
                // The caller may have stopped waiting.
                let _ = reply.send(result);
            }
        }

        queue.close();
        let dropped = std::iter::from_fn(|| queue.try_recv().ok()).count();
        if dropped > 0 {
            tracing::debug!(device_id = %session.id(), dropped, "Discarded queued writes");
        }
    })
}

/// Sends a prepared write.
pub(crate) async fn send<G: Gateway>(
    session: &DeviceSession,
    gateway: &G,
    events: &EventBus,
    write: PendingWrite,
) -> Result<(), GatewayError> {
    match session.send(gateway, &write).await {
        Ok(()) => {
            tracing::info!(
                device_id = %session.id(),
                name = %session.name(),
                delta = %write.delta,
                "Sent update to device"
            );
            events.publish(DeviceEvent::command_sent(session.id().clone(), write.delta));
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                device_id = %session.id(),
                name = %session.name(),
                delta = %write.delta,
                error = %e,
                "Failed to send update to device"
            );
            events.publish(DeviceEvent::command_failed(
                session.id().clone(),
                write.delta,
                &e,
            ));
            Err(e)
        }
    }
}

/// Pushes an adjusted value back to the host after `delay`.
fn republish<H: Host>(
    host: Arc<H>,
    device_id: DeviceId,
    characteristic: Characteristic,
    value: CharacteristicValue,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        tracing::debug!(%device_id, %characteristic, %value, "Republishing adjusted value");
        host.update_characteristic(&device_id, characteristic, value);
    });
}
