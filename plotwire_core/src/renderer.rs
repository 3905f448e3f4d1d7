// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The periodic background loop that paces engine passes.
//!
//! [`RendererLoop`] owns one thread that repeats until stopped:
//!
//! 1. Wait for a wake. Wakes are counted, not coalesced: each
//!    [`trigger`](RendererLoop::trigger) drives exactly one iteration.
//!    Cancellation is polled every [`poll_slice`](RendererConfig::poll_slice)
//!    while waiting.
//! 2. Schedule one iteration. The loop only posts it; the paint context
//!    claims it with [`take_scheduled`](RendererLoop::take_scheduled) and
//!    runs it there, so nothing the host does can hold up the loop.
//! 3. Sleep in slices until the period has elapsed since the iteration was
//!    scheduled, re-reading the period each slice, or until cancelled.
//!
//! One wake is posted at start, so the first iteration is scheduled
//! immediately.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Timing configuration for a [`RendererLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    /// Minimum time from one scheduled iteration to the next.
    pub period: Duration,
    /// Granularity of cancellation and period checks.
    pub poll_slice: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(1000),
            poll_slice: Duration::from_millis(10),
        }
    }
}

impl RendererConfig {
    /// Returns this configuration with a different period.
    #[must_use]
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

/// State guarded by the loop's single control lock.
#[derive(Debug)]
struct Control {
    terminate: bool,
    period: Duration,
}

#[derive(Debug)]
struct Shared {
    control: Mutex<Control>,
    scheduled: AtomicU64,
}

impl Shared {
    fn terminated(&self) -> bool {
        self.control.lock().terminate
    }

    fn snapshot(&self) -> (bool, Duration) {
        let c = self.control.lock();
        (c.terminate, c.period)
    }
}

/// A cancellable periodic loop on its own thread.
///
/// The loop never runs host code. Dropping it stops it.
pub struct RendererLoop {
    shared: Arc<Shared>,
    wake: Sender<()>,
    due: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl fmt::Debug for RendererLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererLoop")
            .field("running", &self.is_running())
            .field("scheduled", &self.scheduled())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl RendererLoop {
    /// Spawns the loop thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RendererStartFailed`] if the thread cannot be spawned.
    pub fn start(config: RendererConfig) -> Result<Self> {
        let shared = Arc::new(Shared {
            control: Mutex::new(Control {
                terminate: false,
                period: config.period,
            }),
            scheduled: AtomicU64::new(0),
        });
        let (wake, wake_rx) = crossbeam_channel::unbounded();
        let (due_tx, due) = crossbeam_channel::unbounded();
        // Both receivers outlive this call, so these sends cannot fail.
        let _ = wake.send(());

        let thread = thread::Builder::new()
            .name("plotwire-renderer".into())
            .spawn({
                let shared = Arc::clone(&shared);
                let slice = config.poll_slice.max(Duration::from_millis(1));
                move || run(&shared, &wake_rx, &due_tx, slice)
            })
            .map_err(Error::RendererStartFailed)?;

        tracing::debug!(period = ?config.period, slice = ?config.poll_slice, "renderer loop started");
        Ok(Self {
            shared,
            wake,
            due,
            thread: Some(thread),
        })
    }

    /// Posts one wake. Wakes accumulate.
    pub fn trigger(&self) {
        if self.is_running() {
            let _ = self.wake.send(());
        }
    }

    /// Claims one scheduled iteration. The caller runs it.
    ///
    /// Returns `false` if none is pending or the loop has been stopped.
    pub fn take_scheduled(&self) -> bool {
        self.thread.is_some() && self.due.try_recv().is_ok()
    }

    /// Scheduled iterations not yet claimed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.due.len()
    }

    /// Changes the period. Takes effect within one poll slice, including
    /// mid-sleep.
    ///
    /// Returns `false`, changing nothing, if the loop is not running.
    pub fn set_period(&self, period: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        self.shared.control.lock().period = period;
        tracing::debug!(?period, "renderer period changed");
        true
    }

    /// The current period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.shared.control.lock().period
    }

    /// Number of iterations the loop has scheduled.
    #[must_use]
    pub fn scheduled(&self) -> u64 {
        self.shared.scheduled.load(Ordering::Acquire)
    }

    /// Whether the loop thread is still alive and not told to stop.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished()) && !self.shared.terminated()
    }

    /// Cancels the loop and waits for its thread to exit, at most about one
    /// poll slice.
    ///
    /// Unclaimed iterations are discarded: once this returns,
    /// [`take_scheduled`](Self::take_scheduled) always returns `false`.
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.shared.control.lock().terminate = true;
        if thread.join().is_err() {
            tracing::warn!("renderer loop panicked");
        }
        while self.due.try_recv().is_ok() {}
        tracing::debug!(scheduled = self.scheduled(), "renderer loop stopped");
    }
}

impl Drop for RendererLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(shared: &Shared, wake: &Receiver<()>, due: &Sender<()>, slice: Duration) {
    loop {
        // 1. Wait for a wake, watching for cancellation.
        loop {
            if shared.terminated() {
                return;
            }
            match wake.recv_timeout(slice) {
                Ok(()) => break,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        if shared.terminated() {
            return;
        }

        // 2. One scheduled iteration per wake.
        let started = Instant::now();
        if due.send(()).is_err() {
            return;
        }
        shared.scheduled.fetch_add(1, Ordering::AcqRel);

        // 3. Sleep out the rest of the period, re-reading it every slice.
        loop {
            let (terminate, period) = shared.snapshot();
            if terminate {
                return;
            }
            let elapsed = started.elapsed();
            if elapsed >= period {
                break;
            }
            thread::sleep(slice.min(period - elapsed));
        }
    }
}
