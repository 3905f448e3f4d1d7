// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-library backend for plotwire.
//!
//! [`DylibBackend`] loads a plotting engine built as a shared library
//! (`libgnuplot.so` / `libgnuplot.dll`, see [`default_library_name`]),
//! resolves its entry points with [`libloading`], and hands it a C callback
//! table whose entries forward into a
//! [`EngineCallbacks`](plotwire_core::callbacks::EngineCallbacks)
//! implementation, normally a
//! [`PlotState`](plotwire_core::plot::PlotState).
//!
//! ```no_run
//! use plotwire_backend_dylib::{DylibBackend, default_library_name};
//! use plotwire_core::plot::Plot;
//!
//! let mut plot = Plot::new(DylibBackend::new());
//! plot.load_backend(default_library_name())?;
//! plot.run_command("plot sin(x)")?;
//! # Ok::<(), plotwire_core::Error>(())
//! ```

#![expect(
    unsafe_code,
    reason = "the engine is a C shared library driven through a callback table"
)]

mod abi;
mod forward;
mod library;

pub use library::{DylibBackend, default_library_name};
pub use plotwire_core::backend::Backend;
