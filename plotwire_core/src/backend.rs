// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for loadable plotting engines.
//!
//! A *backend* wraps one plotting-engine implementation, typically a shared
//! library resolved at runtime. It provides the following pieces:
//!
//! - **Lifecycle**: `load` binds a library file and resolves its entry
//!   points; `unload` releases it; `init` wires the engine's callback table
//!   to an [`EngineCallbacks`] receiver.
//!
//! - **Commands**: `run_command` hands one line of the engine's command
//!   language over and runs it. The engine may invoke any number of
//!   callbacks synchronously before the call returns.
//!
//! - **Data**: `set_dataframe` stores a validated [`Dataframe`];
//!   `load_dataframe` hands it to the engine's ingestion entry point.
//!
//! - **Status gate**: the last non-zero engine status is kept, and
//!   `run_command` refuses to call into an engine known to be in a bad
//!   state until `clear_status` is called.
//!
//! # Crate boundaries
//!
//! `plotwire_core` owns this contract and the plot owner that drives it.
//! Backend crates (such as `plotwire_backend_dylib`) depend on
//! `plotwire_core` and provide the platform glue.

use std::path::Path;
use std::sync::Arc;

use crate::callbacks::EngineCallbacks;
use crate::dataframe::Dataframe;
use crate::error::Result;

/// Maximum length, in bytes, of the engine's version string.
pub const ENGINE_VERSION_MAX_LEN: usize = 32;

/// A loadable plotting engine.
///
/// # Contract
///
/// - `load` fails with [`Error::NotFound`] if the file is absent,
///   [`Error::ReadLib`] if the platform loader rejects it, and
///   [`Error::SymbolNotFound`] if an entry point is missing. Any previously
///   loaded library is unloaded first, so at most one is ever loaded. The
///   backend counts as loaded only after full success.
/// - `unload` when nothing is loaded reports [`Error::NotInitialized`].
///   Dropping a backend always unloads it.
/// - Every other operation fails fast with [`Error::NotInitialized`] when
///   not loaded. Engine entry points also require a prior `init`.
/// - `run_command` fails with [`Error::Engine`] without calling the engine
///   if a previous call left a non-zero status; a fresh non-zero status from
///   the engine is both stored and returned.
/// - No operation retries. A failed load must be retried by the caller.
///
/// [`Error::NotFound`]: crate::Error::NotFound
/// [`Error::ReadLib`]: crate::Error::ReadLib
/// [`Error::SymbolNotFound`]: crate::Error::SymbolNotFound
/// [`Error::NotInitialized`]: crate::Error::NotInitialized
/// [`Error::Engine`]: crate::Error::Engine
pub trait Backend: Send {
    /// Loads the engine library at `path`.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Releases the loaded library.
    fn unload(&mut self) -> Result<()>;

    /// Wires the engine's callback table to `callbacks`.
    fn init(&mut self, callbacks: Arc<dyn EngineCallbacks>) -> Result<()>;

    /// Whether a library is loaded.
    fn is_loaded(&self) -> bool;

    /// Whether `init` has succeeded since the last load.
    fn is_initialized(&self) -> bool;

    /// The status left by the last engine call; `0` means ok.
    fn status(&self) -> i32;

    /// Resets the status gate so `run_command` may call the engine again.
    fn clear_status(&mut self);

    /// Runs one line of the engine's command language.
    fn run_command(&mut self, command: &str) -> Result<()>;

    /// Stores a dataframe for the next `load_dataframe`.
    fn set_dataframe(&mut self, frame: Dataframe) -> Result<()>;

    /// Hands the stored dataframe to the engine.
    ///
    /// Fails with [`Error::MismatchedDimension`](crate::Error::MismatchedDimension)
    /// if no rows are stored.
    fn load_dataframe(&mut self) -> Result<()>;

    /// The engine's own version string.
    fn engine_version(&self) -> Result<String>;
}
