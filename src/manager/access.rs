// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device gateway access serialization.

use std::future::Future;

use tokio::sync::Mutex;

/// Ensures at most one gateway call is in flight for a device.
///
/// Waiters suspend until the current holder finishes; tokio's mutex queues
/// them in arrival order. The lock is released when the wrapped future
/// completes, fails or is dropped. Not reentrant: calling [`run`](Self::run)
/// from inside a future passed to `run` on the same serializer deadlocks.
///
/// # Examples
///
/// ```
/// use midea_lan::manager::AccessSerializer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let access = AccessSerializer::new();
/// let value = access.run(async { 42 }).await;
///
/// assert_eq!(value, 42);
/// assert!(!access.is_busy());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct AccessSerializer {
    lock: Mutex<()>,
}

impl AccessSerializer {
    /// Creates an idle serializer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `operation` while holding the lock.
    pub async fn run<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.lock.lock().await;
        operation.await
    }

    /// Returns `true` while an operation holds the lock.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}
