// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The plot owner: one backend, one draw queue, at most one renderer loop.
//!
//! [`Plot`] is the host-facing coordinator. It loads a [`Backend`], wires the
//! engine's callbacks to its [`PlotState`], and exposes the paint pass that
//! replays queued commands onto a [`Canvas`].
//!
//! # Execution contexts
//!
//! - The **renderer loop** thread only paces iterations. It schedules one
//!   per wake and never touches the backend, so stopping it is bounded by
//!   its poll slice.
//! - The **paint context** is whoever calls [`Plot::paint`]. A paint pass
//!   flips the stage to [`Stage::Surface`], drains the queue, replays every
//!   command in order, and flips back to [`Stage::Engine`]. It then runs any
//!   scheduled iteration: the callback receives an [`Engine`] handle and
//!   drives the backend, which calls back into [`PlotState`] synchronously
//!   to encode and queue each draw call for the next pass.
//!
//! Engine passes therefore never overlap a replay, and every command the
//! engine emits reaches the canvas. After a paint pass that consumed the
//! output of a finished iteration, the loop is woken for the next one, so at
//! most one iteration is ever pending. Hosts that need a wake regardless can
//! call [`Plot::trigger_render`]; hosts that want engine passes between
//! paints can call [`Plot::run_scheduled`].

use core::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::backend::Backend;
use crate::callbacks::EngineCallbacks;
use crate::canvas::{Canvas, Justify};
use crate::color::Color;
use crate::command::{DrawCommand, Vertex};
use crate::dataframe::Dataframe;
use crate::error::{Error, Result};
use crate::queue::DrawQueue;
use crate::renderer::{RendererConfig, RendererLoop};
use crate::stage::{Stage, StageController};
use crate::style::{ColorMode, StyleState};
use crate::trace::{
    BackendOp, BackendOpEvent, BoxedSink, CommandQueuedEvent, IterationEvent, PaintPassEvent,
    StageChangeEvent, Tracer,
};

// ---------------------------------------------------------------------------
// PlotState
// ---------------------------------------------------------------------------

/// State shared between the paint context and the engine-trigger context.
///
/// This is the [`EngineCallbacks`] receiver handed to the backend. Lock order
/// is `style` before `path`; no lock is held across a canvas call.
pub struct PlotState {
    stage: StageController,
    queue: DrawQueue,
    style: Mutex<StyleState>,
    /// Vertices of the open path, in surface coordinates.
    path: Mutex<Vec<Vertex>>,
    tracer: Tracer,
    passes: AtomicU64,
    /// An iteration finished and its output has not been painted yet.
    awaiting_paint: AtomicBool,
}

impl fmt::Debug for PlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotState")
            .field("stage", &self.stage.get())
            .field("queued", &self.queue.len())
            .field("passes", &self.passes.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for PlotState {
    fn default() -> Self {
        Self::new(Tracer::none())
    }
}

impl PlotState {
    /// Creates empty state reporting to `tracer`.
    #[must_use]
    pub fn new(tracer: Tracer) -> Self {
        Self {
            stage: StageController::new(),
            queue: DrawQueue::new(),
            style: Mutex::new(StyleState::default()),
            path: Mutex::new(Vec::new()),
            tracer,
            passes: AtomicU64::new(0),
            awaiting_paint: AtomicBool::new(false),
        }
    }

    /// The current draw stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage.get()
    }

    /// The pending command queue.
    #[must_use]
    pub fn queue(&self) -> &DrawQueue {
        &self.queue
    }

    /// The tracer events are reported to.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// A copy of the current style state.
    #[must_use]
    pub fn style(&self) -> StyleState {
        self.style.lock().clone()
    }

    /// Number of paint passes run so far.
    #[must_use]
    pub fn paint_passes(&self) -> u64 {
        self.passes.load(Ordering::Acquire)
    }

    fn set_stage(&self, to: Stage) {
        let from = self.stage.set(to);
        if from != to {
            self.tracer.stage_change(&StageChangeEvent {
                from,
                to,
                timestamp_us: self.tracer.now_us(),
            });
        }
    }

    fn drawing(&self) -> bool {
        self.stage.get().accepts_commands()
    }

    fn enqueue(&self, command: DrawCommand) {
        if let Some(kind) = command.kind() {
            tracing::trace!(?kind, len = command.encoded_len(), "queued");
            self.tracer.command_queued(&CommandQueuedEvent {
                kind,
                encoded_len: u32::try_from(command.encoded_len()).unwrap_or(u32::MAX),
                timestamp_us: self.tracer.now_us(),
            });
        }
        self.queue.push(command);
    }

    /// Queues the open path as one stroke if it has a segment, and empties it.
    ///
    /// Runs in every stage: a path boundary seen during a paint pass lands in
    /// the next batch.
    fn flush_path(&self, style: &StyleState) {
        let points = core::mem::take(&mut *self.path.lock());
        if points.len() >= 2 {
            self.enqueue(DrawCommand::path_stroke(
                &points,
                style.stroke_width(),
                style.stroke_color(),
            ));
        }
    }

    /// Runs one paint pass onto `canvas`. Returns the number of commands that
    /// issued a canvas call.
    fn paint(&self, canvas: &mut dyn Canvas) -> u32 {
        let begin_us = self.tracer.now_us();
        self.set_stage(Stage::Surface);

        let batch = self.queue.drain();
        let mut replayed = 0_u32;
        for command in &batch {
            if command.replay(canvas) {
                replayed += 1;
            } else {
                tracing::warn!(?command, "skipped malformed command");
            }
        }

        self.set_stage(Stage::Engine);
        let pass_index = self.passes.fetch_add(1, Ordering::AcqRel);
        self.tracer.paint_pass(&PaintPassEvent {
            pass_index,
            drained: u32::try_from(batch.len()).unwrap_or(u32::MAX),
            replayed,
            begin_us,
            end_us: self.tracer.now_us(),
        });
        replayed
    }

    fn record(&self, op: BackendOp, result: &Result<()>) {
        let status = match result {
            Ok(()) => 0,
            Err(e) => {
                tracing::warn!(?op, error = %e, "backend operation failed");
                e.code()
            }
        };
        self.tracer.backend_op(&BackendOpEvent {
            op,
            status,
            timestamp_us: self.tracer.now_us(),
        });
    }
}

impl EngineCallbacks for PlotState {
    fn init(&self) {
        if !self.drawing() {
            return;
        }
        let style = self.style.lock();
        self.enqueue(DrawCommand::init(
            0.0,
            0.0,
            style.xsize,
            style.ysize,
            style.background,
        ));
    }

    fn text(&self) {
        let style = self.style.lock();
        self.flush_path(&style);
    }

    fn scale(&self, x: f64, y: f64) -> bool {
        tracing::trace!(x, y, "scale request declined");
        false
    }

    fn move_to(&self, x: u32, y: u32) {
        let mut style = self.style.lock();
        self.flush_path(&style);
        if style.path_is_open && self.drawing() {
            self.path.lock().push(style.point(x, y));
        }
        style.last = (x, y);
    }

    fn vector(&self, x: u32, y: u32) {
        let mut style = self.style.lock();
        if self.drawing() {
            let to = style.point(x, y);
            if style.path_is_open {
                let mut path = self.path.lock();
                if path.is_empty() {
                    let (lx, ly) = style.last;
                    path.push(style.point(lx, ly));
                }
                path.push(to);
            } else if (x, y) != style.last {
                let (lx, ly) = style.last;
                self.enqueue(DrawCommand::line(
                    style.point(lx, ly),
                    to,
                    style.stroke_width(),
                    style.stroke_color(),
                ));
            }
        }
        style.last = (x, y);
    }

    fn linetype(&self, linetype: i32) {
        self.style.lock().linetype = linetype;
    }

    fn put_text(&self, x: u32, y: u32, text: &str) {
        if !self.drawing() {
            return;
        }
        let style = self.style.lock();
        self.enqueue(DrawCommand::text(
            style.point(x, y),
            style.text_angle,
            style.font_size(),
            Justify::from_code(style.justify),
            style.font_color(),
            text,
        ));
    }

    fn text_angle(&self, degrees: f32) -> bool {
        self.style.lock().set_text_angle(degrees);
        true
    }

    fn justify_text(&self, mode: i32) -> bool {
        self.style.lock().justify = mode;
        true
    }

    fn point(&self, x: u32, y: u32, kind: i32) {
        _ = kind;
        if !self.drawing() {
            return;
        }
        let style = self.style.lock();
        self.enqueue(DrawCommand::point(
            style.point(x, y),
            style.marker_size(),
            style.fg_color(),
        ));
    }

    fn set_font(&self, name: Option<&str>, size: f64) -> bool {
        self.style.lock().set_font(name, size);
        true
    }

    fn fillbox(&self, style_code: i32, x: u32, y: u32, width: u32, height: u32) {
        if !self.drawing() {
            return;
        }
        let style = self.style.lock();
        self.enqueue(DrawCommand::rectangle(
            style.x(x),
            style.y(y.saturating_add(height)),
            style.x(width),
            style.x(height),
            style.fill_color(style_code),
        ));
    }

    fn linewidth(&self, width: f64) {
        self.style.lock().linewidth = width;
    }

    fn set_color(&self, color: u32) {
        self.style.lock().color = Color(color);
    }

    fn filled_polygon(&self, corners: &[[i32; 2]], style_code: i32) {
        // Fewer than three corners enclose nothing.
        if corners.len() < 3 || !self.drawing() {
            return;
        }
        let style = self.style.lock();
        let points: Vec<Vertex> = corners.iter().map(|&c| style.corner(c)).collect();
        self.enqueue(DrawCommand::polygon(&points, style.fill_color(style_code)));
    }

    fn hypertext(&self, kind: i32, text: &str) {
        _ = kind;
        text.clone_into(&mut self.style.lock().hypertext);
    }

    // -- style state -------------------------------------------------------

    fn set_xmax(&self, value: u32) {
        self.style.lock().xmax = value;
    }

    fn set_ymax(&self, value: u32) {
        self.style.lock().ymax = value;
    }

    fn set_h_tic(&self, value: u32) {
        self.style.lock().h_tic = value;
    }

    fn set_v_tic(&self, value: u32) {
        self.style.lock().v_tic = value;
    }

    fn set_color_mode(&self, mode: u8) {
        self.style.lock().color_mode = ColorMode::from_code(mode);
    }

    fn set_linetype(&self, value: i32) {
        self.style.lock().linetype = value;
    }

    fn set_dashpattern(&self, pattern: &str) {
        pattern.clone_into(&mut self.style.lock().dashpattern);
    }

    fn set_h_char(&self, value: u32) {
        self.style.lock().h_char = value;
    }

    fn set_v_char(&self, value: u32) {
        self.style.lock().v_char = value;
    }

    fn set_gridline(&self, value: u32) {
        self.style.lock().gridline = value;
    }

    fn set_hasgrid(&self, value: u32) {
        self.style.lock().hasgrid = value;
    }

    fn set_plotno(&self, value: u32) {
        self.style.lock().plotno = value;
    }

    fn set_fill_pattern(&self, value: i32) {
        self.style.lock().fill_pattern = value;
    }

    fn set_fill_pattern_index(&self, value: u32) {
        self.style.lock().fill_pattern_index = value;
    }

    fn set_rgb(&self, rgb: u32) {
        self.style.lock().set_rgb(rgb);
    }

    fn set_patterncolor(&self, colors: [u32; 8]) {
        self.style.lock().pattern_colors = colors;
    }

    fn set_group_filled_is_open(&self, open: bool) {
        self.style.lock().group_filled_is_open = open;
    }

    fn set_in_textbox(&self, inside: bool) {
        self.style.lock().in_textbox = inside;
    }

    fn set_xsize(&self, value: u32) {
        self.style.lock().set_xsize(value);
    }

    fn set_ysize(&self, value: u32) {
        self.style.lock().set_ysize(value);
    }

    fn set_xlast(&self, value: u32) {
        self.style.lock().last.0 = value;
    }

    fn set_ylast(&self, value: u32) {
        self.style.lock().last.1 = value;
    }

    fn set_linecap(&self, value: i32) {
        self.style.lock().linecap = value;
    }

    fn set_group_is_open(&self, open: bool) {
        self.style.lock().group_is_open = open;
    }

    fn set_path_is_open(&self, open: bool) {
        let mut style = self.style.lock();
        if !open {
            self.flush_path(&style);
        }
        style.path_is_open = open;
    }

    fn set_fontscale(&self, value: f64) {
        self.style.lock().fontscale = value;
    }

    fn set_dashlength(&self, value: f64) {
        self.style.lock().dashlength = value;
    }

    fn set_name(&self, name: &str) {
        name.clone_into(&mut self.style.lock().name);
    }

    fn set_linewidth_factor(&self, value: f64) {
        self.style.lock().set_linewidth_factor(value);
    }

    fn set_background(&self, rgb: i32) {
        self.style.lock().set_background(rgb);
    }

    fn set_linecolor(&self, spec: &str) {
        if !self.style.lock().set_linecolor(spec) {
            tracing::warn!(spec, "unrecognized line color");
        }
    }

    fn set_alpha(&self, value: f64) {
        self.style.lock().alpha = value;
    }

    fn set_term_pointsize(&self, value: f64) {
        self.style.lock().term_pointsize = value;
    }

    fn set_stroke_width(&self, value: f64) {
        self.style.lock().linewidth = value;
    }

    fn set_pen(&self, index: u32, color: u32, width: f64) {
        self.style.lock().set_pen(index, color, width);
    }
}

// ---------------------------------------------------------------------------
// Engine handle
// ---------------------------------------------------------------------------

/// The backend as seen from a renderer iteration.
///
/// Clones share the backend, so a handle may also drive it from another
/// thread. Each call holds the backend lock for its duration.
pub struct Engine<B> {
    backend: Arc<Mutex<B>>,
}

impl<B> Clone for Engine<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B> fmt::Debug for Engine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl<B: Backend> Engine<B> {
    /// Runs one line of the engine's command language.
    ///
    /// # Errors
    ///
    /// See [`Backend::run_command`].
    pub fn run_command(&self, command: &str) -> Result<()> {
        self.backend.lock().run_command(command)
    }

    /// Hands the stored dataframe to the engine.
    ///
    /// # Errors
    ///
    /// See [`Backend::load_dataframe`].
    pub fn load_dataframe(&self) -> Result<()> {
        self.backend.lock().load_dataframe()
    }
}

// ---------------------------------------------------------------------------
// Plot
// ---------------------------------------------------------------------------

type Iteration<B> = Box<dyn FnMut(&Engine<B>) + Send>;

/// Host-facing owner of a backend, its draw queue and its renderer loop.
pub struct Plot<B: Backend> {
    backend: Arc<Mutex<B>>,
    state: Arc<PlotState>,
    renderer: Option<RendererLoop>,
    iteration: Mutex<Option<Iteration<B>>>,
    iterations: AtomicU64,
    config: RendererConfig,
}

impl<B: Backend> fmt::Debug for Plot<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plot")
            .field("state", &self.state)
            .field("renderer", &self.renderer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<B: Backend + 'static> Plot<B> {
    /// Creates a plot around an unloaded backend with the default renderer
    /// configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, RendererConfig::default())
    }

    /// Creates a plot with an explicit renderer configuration.
    #[must_use]
    pub fn with_config(backend: B, config: RendererConfig) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            state: Arc::new(PlotState::default()),
            renderer: None,
            iteration: Mutex::new(None),
            iterations: AtomicU64::new(0),
            config,
        }
    }

    /// Replaces the trace sink, returning the previous one.
    pub fn set_trace_sink(&self, sink: Option<BoxedSink>) -> Option<BoxedSink> {
        self.state.tracer.set_sink(sink)
    }

    /// The shared callback state.
    #[must_use]
    pub fn state(&self) -> &Arc<PlotState> {
        &self.state
    }

    /// A handle for driving the backend from another thread.
    #[must_use]
    pub fn engine(&self) -> Engine<B> {
        Engine {
            backend: Arc::clone(&self.backend),
        }
    }

    /// Loads the engine library at `path` and wires its callbacks to this
    /// plot.
    ///
    /// # Errors
    ///
    /// Any load or init failure from the backend. A previously loaded
    /// library is released before the new one is tried, so after a failure
    /// the plot is unloaded.
    pub fn load_backend(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut backend = self.backend.lock();

        let loaded = backend.load(path);
        self.state.record(BackendOp::Load, &loaded);
        loaded?;

        let callbacks: Arc<dyn EngineCallbacks> = self.state.clone();
        let initialized = backend.init(callbacks);
        self.state.record(BackendOp::Init, &initialized);
        if let Err(e) = initialized {
            let _ = backend.unload();
            return Err(e);
        }
        tracing::debug!(path = %path.display(), "backend loaded");
        Ok(())
    }

    /// Releases the backend library. The renderer loop keeps running.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] if nothing is loaded.
    pub fn unload_backend(&mut self) -> Result<()> {
        let result = self.backend.lock().unload();
        self.state.record(BackendOp::Unload, &result);
        result
    }

    /// Whether a backend library is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.backend.lock().is_loaded()
    }

    /// Runs one line of the engine's command language.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before a successful load, or
    /// [`Error::Engine`] for a non-zero engine status, including one left by
    /// an earlier call.
    pub fn run_command(&self, command: &str) -> Result<()> {
        let result = self.backend.lock().run_command(command);
        self.state.record(BackendOp::RunCommand, &result);
        result
    }

    /// The status left by the last engine call; `0` means ok.
    #[must_use]
    pub fn status(&self) -> i32 {
        self.backend.lock().status()
    }

    /// Reopens the status gate after an engine failure.
    pub fn clear_status(&self) {
        self.backend.lock().clear_status();
    }

    /// Stores `values` as a dataframe of `column_count` columns.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before a successful load, or
    /// [`Error::MismatchedDimension`] if the values do not split evenly.
    pub fn set_dataframe(&self, values: Vec<f64>, column_count: usize) -> Result<()> {
        let mut backend = self.backend.lock();
        let result = if backend.is_initialized() {
            Dataframe::new(values, column_count).and_then(|frame| backend.set_dataframe(frame))
        } else {
            Err(Error::NotInitialized)
        };
        self.state.record(BackendOp::SetDataframe, &result);
        result
    }

    /// Hands the stored dataframe to the engine.
    ///
    /// # Errors
    ///
    /// See [`Backend::load_dataframe`].
    pub fn load_dataframe(&self) -> Result<()> {
        let result = self.backend.lock().load_dataframe();
        self.state.record(BackendOp::LoadDataframe, &result);
        result
    }

    /// This library's packed version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        crate::VERSION
    }

    /// The engine's own version string.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before a successful load.
    pub fn engine_version(&self) -> Result<String> {
        self.backend.lock().engine_version()
    }

    // -- renderer ----------------------------------------------------------

    /// Starts the renderer loop, stopping any existing one first.
    ///
    /// The loop schedules `iteration` once immediately and then once per
    /// wake, at most once per period. Scheduled iterations run in the paint
    /// context, after the replay of [`paint`](Self::paint) or from
    /// [`run_scheduled`](Self::run_scheduled).
    ///
    /// # Errors
    ///
    /// [`Error::RendererStartFailed`] if the thread cannot be spawned.
    pub fn start_renderer<F>(&mut self, iteration: F) -> Result<()>
    where
        F: FnMut(&Engine<B>) + Send + 'static,
    {
        self.stop_renderer();
        let renderer = RendererLoop::start(self.config)?;
        *self.iteration.lock() = Some(Box::new(iteration));
        self.iterations.store(0, Ordering::Release);
        self.renderer = Some(renderer);
        Ok(())
    }

    /// Changes the renderer period. Returns `false`, changing nothing, if no
    /// loop is running.
    pub fn set_rendering_period(&self, period_ms: u64) -> bool {
        self.renderer
            .as_ref()
            .is_some_and(|r| r.set_period(Duration::from_millis(period_ms)))
    }

    /// Stops the renderer loop. Returns after its thread has exited, within
    /// about one poll slice. Scheduled iterations that have not run are
    /// dropped.
    pub fn stop_renderer(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.stop();
        }
        self.iteration.lock().take();
    }

    /// Posts one wake to the renderer loop, if running.
    pub fn trigger_render(&self) {
        if let Some(r) = &self.renderer {
            r.trigger();
        }
    }

    /// Whether a renderer loop is running.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.renderer.as_ref().is_some_and(RendererLoop::is_running)
    }

    /// Iterations run since the renderer was last started.
    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Acquire)
    }

    /// Runs every iteration the loop has scheduled, in the calling context.
    ///
    /// Returns how many ran. [`paint`](Self::paint) calls this after its
    /// replay; hosts may also call it between paints.
    pub fn run_scheduled(&self) -> u32 {
        let Some(renderer) = &self.renderer else {
            return 0;
        };
        let mut slot = self.iteration.lock();
        let Some(iteration) = slot.as_mut() else {
            return 0;
        };
        let engine = self.engine();
        let mut ran = 0_u32;
        while renderer.take_scheduled() {
            let begin_us = self.state.tracer.now_us();
            iteration(&engine);
            self.state.awaiting_paint.store(true, Ordering::Release);
            let index = self.iterations.fetch_add(1, Ordering::AcqRel);
            self.state.tracer.iteration(&IterationEvent {
                iteration: index,
                begin_us,
                end_us: self.state.tracer.now_us(),
            });
            ran += 1;
        }
        ran
    }

    // -- paint -------------------------------------------------------------

    /// Replays every queued command onto `canvas`, in order, then runs any
    /// scheduled iteration.
    ///
    /// Returns the number of commands that issued a canvas call. If the
    /// batch held the output of a finished iteration, the renderer loop is
    /// woken for the next one. Commands the iteration emits are painted by
    /// the next pass.
    pub fn paint(&self, canvas: &mut dyn Canvas) -> u32 {
        let replayed = self.state.paint(canvas);
        if self.state.awaiting_paint.swap(false, Ordering::AcqRel) {
            self.trigger_render();
        }
        self.run_scheduled();
        replayed
    }
}

impl<B: Backend> Drop for Plot<B> {
    fn drop(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.stop();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::thread;
    use std::time::Instant;

    use super::*;
    use crate::canvas::{CanvasOp, RecordingCanvas};
    use crate::command::CommandKind;

    /// Drives callbacks the way an engine would for a few fixed commands.
    #[derive(Default)]
    struct MockBackend {
        loaded: bool,
        callbacks: Option<Arc<dyn EngineCallbacks>>,
        status: i32,
        frame: Option<Dataframe>,
        commands: Vec<String>,
    }

    impl Backend for MockBackend {
        fn load(&mut self, path: &Path) -> Result<()> {
            if self.loaded {
                self.unload()?;
            }
            if path.as_os_str() == "missing" {
                return Err(Error::NotFound {
                    path: path.to_path_buf(),
                });
            }
            self.loaded = true;
            Ok(())
        }

        fn unload(&mut self) -> Result<()> {
            if !self.loaded {
                return Err(Error::NotInitialized);
            }
            self.loaded = false;
            self.callbacks = None;
            Ok(())
        }

        fn init(&mut self, callbacks: Arc<dyn EngineCallbacks>) -> Result<()> {
            if !self.loaded {
                return Err(Error::NotInitialized);
            }
            self.callbacks = Some(callbacks);
            Ok(())
        }

        fn is_loaded(&self) -> bool {
            self.loaded
        }

        fn is_initialized(&self) -> bool {
            self.callbacks.is_some()
        }

        fn status(&self) -> i32 {
            self.status
        }

        fn clear_status(&mut self) {
            self.status = 0;
        }

        fn run_command(&mut self, command: &str) -> Result<()> {
            let Some(cb) = &self.callbacks else {
                return Err(Error::NotInitialized);
            };
            if self.status != 0 {
                return Err(Error::Engine(self.status));
            }
            self.commands.push(command.to_owned());
            match command {
                "plot" => {
                    cb.set_xsize(64_000);
                    cb.set_ysize(48_000);
                    cb.init();
                    cb.move_to(0, 0);
                    cb.vector(1000, 1000);
                    cb.put_text(500, 500, "hi");
                    cb.point(100, 100, 1);
                }
                "burst" => {
                    for i in 0..BURST {
                        cb.point(i, i, 0);
                    }
                }
                "fail" => {
                    self.status = -7;
                    return Err(Error::Engine(-7));
                }
                _ => {}
            }
            Ok(())
        }

        fn set_dataframe(&mut self, frame: Dataframe) -> Result<()> {
            self.frame = Some(frame);
            Ok(())
        }

        fn load_dataframe(&mut self) -> Result<()> {
            match &self.frame {
                Some(f) if !f.is_empty() => Ok(()),
                _ => Err(Error::MismatchedDimension {
                    len: 0,
                    columns: 0,
                }),
            }
        }

        fn engine_version(&self) -> Result<String> {
            if self.callbacks.is_none() {
                return Err(Error::NotInitialized);
            }
            Ok("6.0 patchlevel 0".into())
        }
    }

    const BURST: u32 = 2000;

    fn loaded_plot() -> Plot<MockBackend> {
        let mut plot = Plot::new(MockBackend::default());
        plot.load_backend("libengine.so").unwrap();
        plot
    }

    fn kinds(plot: &Plot<MockBackend>) -> Vec<Option<CommandKind>> {
        plot.state().queue().drain().iter().map(DrawCommand::kind).collect()
    }

    #[test]
    fn operations_before_load_report_not_initialized() {
        let plot = Plot::new(MockBackend::default());
        assert!(matches!(plot.run_command("plot"), Err(Error::NotInitialized)));
        assert!(matches!(
            plot.set_dataframe(vec![1.0, 2.0], 2),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(plot.engine_version(), Err(Error::NotInitialized)));
        assert_eq!(plot.version(), 2 << 10);
    }

    #[test]
    fn failed_load_leaves_plot_unloaded() {
        let mut plot = Plot::new(MockBackend::default());
        let err = plot.load_backend("missing").unwrap_err();
        assert!(matches!(err, Error::NotFound { ref path } if path == &PathBuf::from("missing")));
        assert!(!plot.is_loaded());
    }

    #[test]
    fn failed_reload_unloads_the_previous_backend() {
        let mut plot = loaded_plot();
        assert!(plot.load_backend("missing").is_err());
        assert!(!plot.is_loaded());
        assert!(matches!(plot.run_command("plot"), Err(Error::NotInitialized)));
    }

    #[test]
    fn run_command_queues_draw_calls_in_order() {
        let plot = loaded_plot();
        plot.run_command("plot").unwrap();
        assert_eq!(
            kinds(&plot),
            [
                Some(CommandKind::Init),
                Some(CommandKind::Line),
                Some(CommandKind::Text),
                Some(CommandKind::Point),
            ]
        );
    }

    #[test]
    fn paint_replays_and_cycles_stage() {
        let plot = loaded_plot();
        assert_eq!(plot.state().stage(), Stage::Undefined);

        for pass in 0..3 {
            plot.run_command("plot").unwrap();
            let mut canvas = RecordingCanvas::new();
            assert_eq!(plot.paint(&mut canvas), 4);
            assert_eq!(plot.state().stage(), Stage::Engine, "pass {pass}");
            assert!(plot.state().queue().is_empty());

            let ops = canvas.take();
            assert!(matches!(ops[0], CanvasOp::Clear { .. }));
            assert!(
                matches!(&ops[1], CanvasOp::Line { from, to, .. }
                    if *from == kurbo::Point::new(0.0, 480.0) && *to == kurbo::Point::new(10.0, 470.0))
            );
            assert!(matches!(&ops[2], CanvasOp::Text { text, .. } if text == "hi"));
        }
        assert_eq!(plot.state().paint_passes(), 3);
    }

    #[test]
    fn surface_stage_suppresses_draw_calls() {
        let state = PlotState::default();
        state.set_stage(Stage::Surface);
        state.init();
        state.vector(10, 10);
        state.point(1, 1, 0);
        state.fillbox(1, 0, 0, 10, 10);
        state.filled_polygon(&[[0, 0], [10, 0], [10, 10]], 1);
        state.put_text(0, 0, "x");
        assert!(state.queue().is_empty());
        // Style setters still apply.
        state.set_rgb(0x00_FF00);
        assert_eq!(state.style().rgb, Color(0x00FF_00FF));
    }

    #[test]
    fn open_path_flushes_into_one_stroke() {
        let state = PlotState::default();
        state.set_ysize(10_000);
        state.set_path_is_open(true);
        state.move_to(0, 0);
        state.vector(100, 0);
        state.vector(100, 100);
        state.vector(0, 100);
        assert!(state.queue().is_empty(), "segments wait for the boundary");

        // A move ends the path and starts a new one.
        state.move_to(500, 500);
        state.vector(600, 600);
        state.set_path_is_open(false);

        let mut canvas = RecordingCanvas::new();
        for cmd in state.queue().drain() {
            cmd.replay(&mut canvas);
        }
        let ops = canvas.take();
        assert_eq!(ops.len(), 2);
        match &ops[0] {
            CanvasOp::Polyline { points, .. } => assert_eq!(points.len(), 4),
            other => panic!("expected Polyline, got {other:?}"),
        }
        match &ops[1] {
            CanvasOp::Polyline { points, .. } => assert_eq!(points.len(), 2),
            other => panic!("expected Polyline, got {other:?}"),
        }
    }

    #[test]
    fn path_boundary_during_surface_lands_in_next_batch() {
        let state = PlotState::default();
        state.set_path_is_open(true);
        state.move_to(0, 0);
        state.vector(100, 100);

        state.set_stage(Stage::Surface);
        state.set_path_is_open(false);
        state.set_stage(Stage::Engine);

        let batch = state.queue().drain();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind(), Some(CommandKind::PathStroke));
    }

    #[test]
    fn degenerate_draw_calls_queue_nothing() {
        let state = PlotState::default();
        state.move_to(5, 5);
        state.vector(5, 5);
        state.filled_polygon(&[], 1);
        state.filled_polygon(&[[0, 0], [1, 1]], 1);
        assert!(state.queue().is_empty());
    }

    #[test]
    fn fillbox_uses_fill_color_and_flipped_origin() {
        let state = PlotState::default();
        state.set_ysize(10_000);
        state.set_color_mode(3);
        state.set_color(0xFF00_00FF);
        state.fillbox((100 << 4) | 1, 1000, 1000, 2000, 500);

        let mut canvas = RecordingCanvas::new();
        state.queue().drain()[0].replay(&mut canvas);
        match &canvas.ops()[0] {
            CanvasOp::FillRect { rect, color } => {
                assert_eq!(*rect, kurbo::Rect::new(10.0, 85.0, 30.0, 90.0));
                assert_eq!(*color, Color(0xFF00_00FF));
            }
            other => panic!("expected FillRect, got {other:?}"),
        }
    }

    #[test]
    fn engine_status_gates_until_cleared() {
        let plot = loaded_plot();
        assert!(matches!(plot.run_command("fail"), Err(Error::Engine(-7))));
        assert!(matches!(plot.run_command("plot"), Err(Error::Engine(-7))));
        assert_eq!(plot.status(), -7);
        plot.clear_status();
        plot.run_command("plot").unwrap();
    }

    #[test]
    fn dataframe_validation() {
        let plot = loaded_plot();
        assert!(matches!(
            plot.set_dataframe(vec![1.0, 2.0, 3.0], 2),
            Err(Error::MismatchedDimension { len: 3, columns: 2 })
        ));
        assert!(plot.load_dataframe().is_err());
        plot.set_dataframe(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap();
        plot.load_dataframe().unwrap();
    }

    #[test]
    fn unload_twice_reports_not_initialized() {
        let mut plot = loaded_plot();
        plot.unload_backend().unwrap();
        assert!(matches!(plot.unload_backend(), Err(Error::NotInitialized)));
        assert!(matches!(plot.run_command("plot"), Err(Error::NotInitialized)));
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        cond()
    }

    fn fast_plot() -> Plot<MockBackend> {
        let mut plot = Plot::with_config(
            MockBackend::default(),
            RendererConfig {
                period: Duration::from_millis(1),
                poll_slice: Duration::from_millis(1),
            },
        );
        plot.load_backend("libengine.so").unwrap();
        plot
    }

    #[test]
    fn renderer_iteration_drives_engine_and_paint_rewakes() {
        let mut plot = fast_plot();
        plot.start_renderer(|engine| {
            let _ = engine.run_command("plot");
        })
        .unwrap();

        let mut canvas = RecordingCanvas::new();
        assert!(wait_for(|| plot.run_scheduled() == 1));
        assert_eq!(plot.iterations(), 1);
        // Nothing painted yet, so no further iteration is scheduled.
        thread::sleep(Duration::from_millis(30));
        assert_eq!(plot.run_scheduled(), 0);

        assert_eq!(plot.paint(&mut canvas), 4);
        assert!(wait_for(|| {
            plot.run_scheduled();
            plot.iterations() == 2
        }));

        plot.stop_renderer();
        assert!(!plot.is_rendering());
    }

    #[test]
    fn iteration_runs_in_the_paint_context() {
        let mut plot = fast_plot();
        let seen = Arc::new(Mutex::new(Vec::new()));
        plot.start_renderer({
            let seen = Arc::clone(&seen);
            move |engine| {
                seen.lock().push(thread::current().id());
                let _ = engine.run_command("plot");
            }
        })
        .unwrap();

        let mut canvas = RecordingCanvas::new();
        assert!(wait_for(|| {
            plot.paint(&mut canvas);
            plot.iterations() >= 3
        }));
        plot.stop_renderer();

        let here = thread::current().id();
        assert!(seen.lock().iter().all(|id| *id == here));
    }

    #[test]
    fn continuous_painting_loses_no_commands() {
        let mut plot = fast_plot();
        plot.start_renderer(|engine| {
            let _ = engine.run_command("burst");
        })
        .unwrap();

        let mut canvas = RecordingCanvas::new();
        let mut painted = 0_u64;
        let mut count = |canvas: &mut RecordingCanvas| {
            let ops = canvas.take();
            painted += ops
                .iter()
                .filter(|op| matches!(op, CanvasOp::Circle { .. }))
                .count() as u64;
        };
        assert!(wait_for(|| {
            plot.paint(&mut canvas);
            count(&mut canvas);
            plot.iterations() >= 5
        }));
        plot.stop_renderer();
        plot.paint(&mut canvas);
        count(&mut canvas);

        let emitted = plot.iterations() * u64::from(BURST);
        assert_eq!(painted, emitted, "every emitted point reaches the canvas");
    }

    #[test]
    fn no_iteration_runs_after_stop() {
        let mut plot = fast_plot();
        plot.start_renderer(|engine| {
            let _ = engine.run_command("plot");
        })
        .unwrap();
        assert!(wait_for(|| plot.run_scheduled() == 1));
        let mut canvas = RecordingCanvas::new();
        plot.paint(&mut canvas);
        thread::sleep(Duration::from_millis(20));

        plot.stop_renderer();
        let at_stop = plot.iterations();
        assert_eq!(plot.run_scheduled(), 0);
        plot.paint(&mut canvas);
        assert_eq!(plot.iterations(), at_stop);
        assert!(plot.state().queue().is_empty());
    }

    #[test]
    fn start_renderer_replaces_running_loop() {
        let mut plot = Plot::new(MockBackend::default());
        plot.start_renderer(|_| {}).unwrap();
        assert!(plot.set_rendering_period(5));
        plot.start_renderer(|_| {}).unwrap();
        assert!(plot.is_rendering());
        assert!(wait_for(|| {
            plot.run_scheduled();
            plot.iterations() == 1
        }));
        plot.stop_renderer();
        assert!(!plot.set_rendering_period(5), "stopped plot ignores period");
    }
}
