// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device runtime state.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::Capabilities;
use crate::capabilities::AccessoryInfo;
use crate::config::SyncSettings;
use crate::error::{Error, GatewayError};
use crate::event::DeviceId;
use crate::projection::SemanticState;
use crate::protocol::{DeviceIdentity, Gateway};
use crate::state::{RawState, StateDelta};
use crate::telemetry;
use crate::types::DeviceKind;

use super::access::AccessSerializer;
use super::device_config::DeviceContext;

/// An optimistic write that has not reached the gateway yet.
#[derive(Debug, Clone)]
pub(crate) struct PendingWrite {
    pub id: u64,
    pub delta: StateDelta,
}

/// Receives the gateway's answer to a queued write.
pub(crate) type WriteReply = oneshot::Sender<Result<(), GatewayError>>;

/// A write waiting in the session's send queue.
#[derive(Debug)]
pub(crate) struct QueuedWrite {
    pub write: PendingWrite,
    pub reply: Option<WriteReply>,
}

/// One registered appliance: its raw state, its serializer and its loop.
pub(crate) struct DeviceSession {
    pub context: DeviceContext,
    pub identity: DeviceIdentity,
    pub kind: DeviceKind,
    pub capabilities: Capabilities,
    pub access: AccessSerializer,
    state_tx: watch::Sender<RawState>,
    pending: parking_lot::Mutex<Vec<PendingWrite>>,
    next_write: AtomicU64,
    queue_tx: mpsc::UnboundedSender<QueuedWrite>,
    queue_rx: parking_lot::Mutex<Option<mpsc::UnboundedReceiver<QueuedWrite>>>,
    last_poll: parking_lot::Mutex<Option<DateTime<Utc>>>,
    shutdown_tx: watch::Sender<bool>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("device_id", &self.context.device_id)
            .field("kind", &self.kind)
            .field("busy", &self.access.is_busy())
            .finish_non_exhaustive()
    }
}

impl DeviceSession {
    pub fn new(context: DeviceContext, kind: DeviceKind, settings: &SyncSettings) -> Self {
        let (state_tx, _) = watch::channel(RawState::new());
        let (shutdown_tx, _) = watch::channel(false);
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            identity: context.identity(),
            capabilities: Capabilities::for_kind(kind, settings),
            context,
            kind,
            access: AccessSerializer::new(),
            state_tx,
            pending: parking_lot::Mutex::new(Vec::new()),
            next_write: AtomicU64::new(0),
            queue_tx,
            queue_rx: parking_lot::Mutex::new(Some(queue_rx)),
            last_poll: parking_lot::Mutex::new(None),
            shutdown_tx,
            tasks: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.context.device_id
    }

    pub fn name(&self) -> &str {
        self.context.display_name()
    }

    pub fn accessory_info(&self) -> AccessoryInfo {
        AccessoryInfo::new(self.id(), self.kind, self.name())
    }

    // ========== State ==========

    pub fn raw_state(&self) -> RawState {
        self.state_tx.borrow().clone()
    }

    pub fn semantic_state(&self) -> SemanticState {
        SemanticState::project(self.kind, &self.state_tx.borrow())
    }

    pub fn watch_state(&self) -> watch::Receiver<RawState> {
        self.state_tx.subscribe()
    }

    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        *self.last_poll.lock()
    }

    /// Applies `delta` locally and queues it for the gateway.
    ///
    /// Writes leave the queue in the order they were applied. If the queue
    /// is closed because the session is stopping, the write stays local and
    /// `reply` is dropped.
    pub fn enqueue(&self, delta: StateDelta, reply: Option<WriteReply>) -> PendingWrite {
        let mut pending = self.pending.lock();
        let write = PendingWrite {
            id: self.next_write.fetch_add(1, Ordering::Relaxed),
            delta,
        };
        self.state_tx.send_modify(|state| {
            state.apply(&write.delta);
        });

        let queued = QueuedWrite {
            write: write.clone(),
            reply,
        };
        if self.queue_tx.send(queued).is_ok() {
            pending.push(write.clone());
        } else {
            tracing::debug!(device_id = %self.id(), "Send queue closed, write kept locally");
        }
        write
    }

    /// Hands out the receiving end of the send queue, once.
    pub fn take_queue(&self) -> Option<mpsc::UnboundedReceiver<QueuedWrite>> {
        self.queue_rx.lock().take()
    }

    /// Replaces the whole state with a fresh poll result.
    ///
    /// Writes still waiting for the gateway are re-applied so a poll that
    /// was in flight when they were made cannot undo them.
    fn replace_state(&self, mut fresh: RawState) {
        let pending = self.pending.lock();
        for write in pending.iter() {
            fresh.apply(&write.delta);
        }
        self.state_tx.send_replace(fresh);
        *self.last_poll.lock() = Some(Utc::now());
    }

    fn finish_write(&self, id: u64) {
        self.pending.lock().retain(|w| w.id != id);
    }

    // ========== Gateway access ==========

    /// Fetches, decodes and stores the device state under the serializer.
    pub async fn poll<G: Gateway>(&self, gateway: &G) -> Result<(), Error> {
        self.access
            .run(async {
                let text = gateway.fetch_state(&self.identity).await?;
                tracing::debug!(device_id = %self.id(), payload = %text, "Fetched device state");
                let attributes = telemetry::try_decode(&text)?;
                self.replace_state(RawState::from_attributes(attributes));
                Ok::<(), Error>(())
            })
            .await
    }

    /// Sends an optimistic write under the serializer.
    ///
    /// The local state is kept whether or not the gateway accepts it.
    pub async fn send<G: Gateway>(
        &self,
        gateway: &G,
        write: &PendingWrite,
    ) -> Result<(), GatewayError> {
        self.access
            .run(async {
                let result = gateway.send_state(&self.identity, &write.delta).await;
                self.finish_write(write.id);
                result
            })
            .await
    }

    // ========== Loop lifecycle ==========

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn add_task(&self, handle: JoinHandle<()>) {
        self.tasks.lock().push(handle);
    }

    /// Signals the poll loop and the send queue to stop and waits for both.
    pub async fn stop(&self) {
        self.shutdown_tx.send_replace(true);
        let handles = std::mem::take(&mut *self.tasks.lock());
        for handle in handles {
            if let Err(e) = handle.await
                && e.is_panic()
            {
                tracing::error!(device_id = %self.id(), "Session task panicked");
            }
        }
    }
}
