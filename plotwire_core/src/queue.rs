// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending draw commands, handed from the engine thread to the paint pass.

use core::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::command::DrawCommand;

/// Ordered queue of [`DrawCommand`]s with an exactly-once drain.
///
/// Insertion order is paint order. [`drain`](Self::drain) swaps the whole
/// batch out under the same lock [`push`](Self::push) takes, so every command
/// lands in exactly one drained batch: a push racing a drain goes either
/// wholly into that batch or wholly into the next.
///
/// The queue assumes one paint pass at a time; concurrent drains are not
/// coordinated beyond each being atomic.
#[derive(Debug, Default)]
pub struct DrawQueue {
    items: Mutex<Vec<DrawCommand>>,
    pushed_count: AtomicU64,
    drained_batches: AtomicU64,
}

impl DrawQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn push(&self, command: DrawCommand) {
        self.items.lock().push(command);
        self.pushed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Removes and returns everything queued, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<DrawCommand> {
        let batch = core::mem::take(&mut *self.items.lock());
        self.drained_batches.fetch_add(1, Ordering::Relaxed);
        batch
    }

    /// Discards everything queued, returning how many commands were dropped.
    pub fn clear(&self) -> usize {
        let mut items = self.items.lock();
        let n = items.len();
        items.clear();
        n
    }

    /// Number of commands currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Total commands pushed over the queue's lifetime.
    #[must_use]
    pub fn pushed_count(&self) -> u64 {
        self.pushed_count.load(Ordering::Relaxed)
    }

    /// Total drains over the queue's lifetime, including empty ones.
    #[must_use]
    pub fn drained_batches(&self) -> u64 {
        self.drained_batches.load(Ordering::Relaxed)
    }
}
