// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-command marshalling between a plotting engine and a 2D surface.
//!
//! `plotwire_core` bridges a plotting engine that reports drawing intents
//! through a fixed callback table, from whatever thread it runs on, to a
//! surface that may only be painted during its own paint pass. Callbacks are
//! encoded into compact [`DrawCommand`](command::DrawCommand)s, queued, and
//! replayed onto a [`Canvas`](canvas::Canvas) later.
//!
//! # Architecture
//!
//! ```text
//!   RendererLoop (pacing thread)
//!       │ schedule, one per wake
//!       ▼
//!   Plot::paint() ──► drain DrawQueue ──► DrawCommand::replay() ──► Canvas
//!       │
//!       ├──► Stage::Engine, RendererLoop::trigger()
//!       │
//!       └──► Plot::run_scheduled() ──► iteration callback
//!                                          │
//!                                          ▼
//!   Backend::run_command() ──► engine ──► EngineCallbacks (PlotState)
//!                                              │ encode (Engine stage)
//!                                              ▼
//!                                          DrawQueue (next pass)
//! ```
//!
//! **[`command`]**: Binary encoding of one drawing intent, and its replay onto
//! a canvas.
//!
//! **[`queue`]**: Ordered pending commands with an exactly-once drain.
//!
//! **[`stage`]**: Which side currently owns the right to produce commands.
//!
//! **[`canvas`]**: The [`Canvas`](canvas::Canvas) trait surfaces implement,
//! plus a recording canvas.
//!
//! **[`callbacks`]**: The [`EngineCallbacks`](callbacks::EngineCallbacks)
//! trait, one method per entry of the engine's callback table.
//!
//! **[`style`]**: Pen, color and coordinate state assigned by the engine.
//!
//! **[`backend`]**: The [`Backend`](backend::Backend) trait a loadable
//! engine library implements.
//!
//! **[`renderer`]**: The cancellable periodic loop that schedules engine passes.
//!
//! **[`plot`]**: [`Plot`](plot::Plot), which owns and coordinates all of the
//! above.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pipeline instrumentation.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod callbacks;
pub mod canvas;
pub mod color;
pub mod command;
pub mod dataframe;
pub mod error;
pub mod plot;
pub mod queue;
pub mod renderer;
pub mod stage;
pub mod style;
pub mod trace;

pub use error::Error;

/// Packs a `major.minor.patch` triple into one integer, ten bits per field.
#[must_use]
pub const fn pack_version(major: u32, minor: u32, patch: u32) -> u32 {
    (major << 20) | (minor << 10) | patch
}

/// Version of this library, as reported by [`Plot::version`](plot::Plot::version).
pub const VERSION: u32 = pack_version(0, 2, 0);
