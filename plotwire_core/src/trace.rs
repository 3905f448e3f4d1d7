// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the draw pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! plot owner calls as commands are queued, paint passes run, stages flip,
//! renderer iterations fire and backend operations complete. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] owns an optional boxed sink. Events cross threads (engine
//! callbacks and paint passes run on different ones), so the sink sits behind
//! a short-held lock. When the `trace` feature is **off**, every `Tracer`
//! method compiles to nothing and no sink is stored.
//!
//! Timestamps are microseconds since the tracer was created.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use core::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::command::CommandKind;
use crate::stage::Stage;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which backend operation completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendOp {
    /// Library load.
    Load,
    /// Library unload.
    Unload,
    /// Callback-table wiring.
    Init,
    /// One command line.
    RunCommand,
    /// Dataframe stored.
    SetDataframe,
    /// Dataframe handed to the engine.
    LoadDataframe,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an engine callback queues a command.
#[derive(Clone, Copy, Debug)]
pub struct CommandQueuedEvent {
    /// Kind of command queued.
    pub kind: CommandKind,
    /// Encoded size in bytes.
    pub encoded_len: u32,
    /// When it was queued.
    pub timestamp_us: u64,
}

/// Emitted after a paint pass has replayed its batch.
#[derive(Clone, Copy, Debug)]
pub struct PaintPassEvent {
    /// Paint pass counter.
    pub pass_index: u64,
    /// Commands drained from the queue.
    pub drained: u32,
    /// Commands that issued a canvas call.
    pub replayed: u32,
    /// Start of the pass.
    pub begin_us: u64,
    /// End of the pass.
    pub end_us: u64,
}

/// Emitted when the draw stage changes.
#[derive(Clone, Copy, Debug)]
pub struct StageChangeEvent {
    /// Stage before the change.
    pub from: Stage,
    /// Stage after the change.
    pub to: Stage,
    /// When the change happened.
    pub timestamp_us: u64,
}

/// Emitted after one renderer-loop iteration.
#[derive(Clone, Copy, Debug)]
pub struct IterationEvent {
    /// Iteration counter.
    pub iteration: u64,
    /// Start of the iteration.
    pub begin_us: u64,
    /// End of the iteration.
    pub end_us: u64,
}

/// Emitted after a backend operation.
#[derive(Clone, Copy, Debug)]
pub struct BackendOpEvent {
    /// Which operation.
    pub op: BackendOp,
    /// Resulting status code; `0` on success.
    pub status: i32,
    /// When it completed.
    pub timestamp_us: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the draw pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a command is queued.
    fn on_command_queued(&mut self, e: &CommandQueuedEvent) {
        _ = e;
    }

    /// Called after a paint pass.
    fn on_paint_pass(&mut self, e: &PaintPassEvent) {
        _ = e;
    }

    /// Called when the draw stage changes.
    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        _ = e;
    }

    /// Called after a renderer-loop iteration.
    fn on_iteration(&mut self, e: &IterationEvent) {
        _ = e;
    }

    /// Called after a backend operation.
    fn on_backend_op(&mut self, e: &BackendOpEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Forwards every event to both sinks, first `A` then `B`.
impl<A: TraceSink, B: TraceSink> TraceSink for (A, B) {
    fn on_command_queued(&mut self, e: &CommandQueuedEvent) {
        self.0.on_command_queued(e);
        self.1.on_command_queued(e);
    }

    fn on_paint_pass(&mut self, e: &PaintPassEvent) {
        self.0.on_paint_pass(e);
        self.1.on_paint_pass(e);
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        self.0.on_stage_change(e);
        self.1.on_stage_change(e);
    }

    fn on_iteration(&mut self, e: &IterationEvent) {
        self.0.on_iteration(e);
        self.1.on_iteration(e);
    }

    fn on_backend_op(&mut self, e: &BackendOpEvent) {
        self.0.on_backend_op(e);
        self.1.on_backend_op(e);
    }
}

/// A cloneable handle to a sink, so it can be read back after tracing.
///
/// Hand one clone to a [`Tracer`] and keep another.
pub struct SharedSink<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for SharedSink<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SharedSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSink").finish_non_exhaustive()
    }
}

impl<T> SharedSink<T> {
    /// Wraps `sink`.
    pub fn new(sink: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Runs `f` with the wrapped sink locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<T: TraceSink> TraceSink for SharedSink<T> {
    fn on_command_queued(&mut self, e: &CommandQueuedEvent) {
        self.inner.lock().on_command_queued(e);
    }

    fn on_paint_pass(&mut self, e: &PaintPassEvent) {
        self.inner.lock().on_paint_pass(e);
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        self.inner.lock().on_stage_change(e);
    }

    fn on_iteration(&mut self, e: &IterationEvent) {
        self.inner.lock().on_iteration(e);
    }

    fn on_backend_op(&mut self, e: &BackendOpEvent) {
        self.inner.lock().on_backend_op(e);
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Boxed sink type stored by a [`Tracer`].
pub type BoxedSink = Box<dyn TraceSink + Send>;

/// Thread-safe owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every emit method compiles to
/// nothing. When **on**, each method takes the sink lock and checks the
/// inner `Option` (one branch) before dispatching.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Mutex<Option<BoxedSink>>,
    epoch: Instant,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[must_use]
    pub fn new(sink: BoxedSink) -> Self {
        let tracer = Self::none();
        tracer.set_sink(Some(sink));
        tracer
    }

    /// Creates a tracer that discards all events.
    #[must_use]
    pub fn none() -> Self {
        Self {
            #[cfg(feature = "trace")]
            sink: Mutex::new(None),
            epoch: Instant::now(),
        }
    }

    /// Replaces the sink, returning the previous one.
    ///
    /// Without the `trace` feature the sink is dropped and `None` returned.
    pub fn set_sink(&self, sink: Option<BoxedSink>) -> Option<BoxedSink> {
        #[cfg(feature = "trace")]
        {
            core::mem::replace(&mut *self.sink.lock(), sink)
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            None
        }
    }

    /// Microseconds since this tracer was created.
    #[must_use]
    pub fn now_us(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    #[cfg(feature = "trace")]
    #[inline]
    fn emit(&self, f: impl FnOnce(&mut dyn TraceSink)) {
        if let Some(s) = self.sink.lock().as_deref_mut() {
            f(s);
        }
    }

    /// Emits a [`CommandQueuedEvent`].
    #[inline]
    pub fn command_queued(&self, e: &CommandQueuedEvent) {
        #[cfg(feature = "trace")]
        self.emit(|s| s.on_command_queued(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PaintPassEvent`].
    #[inline]
    pub fn paint_pass(&self, e: &PaintPassEvent) {
        #[cfg(feature = "trace")]
        self.emit(|s| s.on_paint_pass(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StageChangeEvent`].
    #[inline]
    pub fn stage_change(&self, e: &StageChangeEvent) {
        #[cfg(feature = "trace")]
        self.emit(|s| s.on_stage_change(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`IterationEvent`].
    #[inline]
    pub fn iteration(&self, e: &IterationEvent) {
        #[cfg(feature = "trace")]
        self.emit(|s| s.on_iteration(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BackendOpEvent`].
    #[inline]
    pub fn backend_op(&self, e: &BackendOpEvent) {
        #[cfg(feature = "trace")]
        self.emit(|s| s.on_backend_op(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_queued() -> CommandQueuedEvent {
        CommandQueuedEvent {
            kind: CommandKind::Line,
            encoded_len: 25,
            timestamp_us: 100,
        }
    }

    #[derive(Default)]
    struct Counting {
        queued: u32,
        stages: Vec<(Stage, Stage)>,
    }

    impl TraceSink for Counting {
        fn on_command_queued(&mut self, _e: &CommandQueuedEvent) {
            self.queued += 1;
        }

        fn on_stage_change(&mut self, e: &StageChangeEvent) {
            self.stages.push((e.from, e.to));
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_command_queued(&sample_queued());
        sink.on_backend_op(&BackendOpEvent {
            op: BackendOp::Load,
            status: 0,
            timestamp_us: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let tracer = Tracer::none();
        tracer.command_queued(&sample_queued());
        tracer.iteration(&IterationEvent {
            iteration: 0,
            begin_us: 0,
            end_us: 1,
        });
    }

    #[test]
    fn tuple_fans_out() {
        let mut pair = (Counting::default(), Counting::default());
        pair.on_command_queued(&sample_queued());
        assert_eq!(pair.0.queued, 1);
        assert_eq!(pair.1.queued, 1);
    }

    #[test]
    fn shared_sink_reads_back() {
        let shared = SharedSink::new(Counting::default());
        let mut handle = shared.clone();
        handle.on_stage_change(&StageChangeEvent {
            from: Stage::Undefined,
            to: Stage::Surface,
            timestamp_us: 5,
        });
        let stages = shared.with(|c| c.stages.clone());
        assert_eq!(stages, [(Stage::Undefined, Stage::Surface)]);
    }

    #[test]
    fn now_is_monotonic() {
        let tracer = Tracer::none();
        let a = tracer.now_us();
        let b = tracer.now_us();
        assert!(b >= a);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        let shared = SharedSink::new(Counting::default());
        let tracer = Tracer::new(Box::new(shared.clone()));
        tracer.command_queued(&sample_queued());
        tracer.command_queued(&sample_queued());
        assert_eq!(shared.with(|c| c.queued), 2);

        assert!(tracer.set_sink(None).is_some());
        tracer.command_queued(&sample_queued());
        assert_eq!(shared.with(|c| c.queued), 2);
    }
}
