// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`DylibBackend`]: a [`Backend`] over a runtime-loaded engine library.

use core::ffi::{c_char, c_uint};
use core::fmt;
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use plotwire_core::backend::{Backend, ENGINE_VERSION_MAX_LEN};
use plotwire_core::callbacks::EngineCallbacks;
use plotwire_core::dataframe::Dataframe;
use plotwire_core::error::{Error, Result};

use crate::abi::{
    DoLineFn, InitFn, SYM_DO_LINE, SYM_INIT, SYM_SET_DATAFRAME, SYM_SET_INPUT_LINE, SYM_SET_OBJECT,
    SYM_VERSION, SetDataframeFn, SetInputLineFn, SetObjectFn, VersionFn,
};
use crate::forward::Binding;

/// File name the engine library has on this platform.
#[must_use]
pub const fn default_library_name() -> &'static str {
    if cfg!(windows) {
        "libgnuplot.dll"
    } else {
        "libgnuplot.so"
    }
}

/// Resolved entry points. Only valid while the owning [`Library`] is loaded.
#[derive(Clone, Copy)]
struct EntryPoints {
    init: InitFn,
    set_input_line: SetInputLineFn,
    do_line: DoLineFn,
    set_object: SetObjectFn,
    set_dataframe: SetDataframeFn,
    version: VersionFn,
}

impl EntryPoints {
    fn resolve(lib: &Library) -> Result<Self> {
        Ok(Self {
            init: symbol(lib, SYM_INIT)?,
            set_input_line: symbol(lib, SYM_SET_INPUT_LINE)?,
            do_line: symbol(lib, SYM_DO_LINE)?,
            set_object: symbol(lib, SYM_SET_OBJECT)?,
            set_dataframe: symbol(lib, SYM_SET_DATAFRAME)?,
            version: symbol(lib, SYM_VERSION)?,
        })
    }
}

fn symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T> {
    // SAFETY: every `T` used here is the entry point's declared signature.
    match unsafe { lib.get::<T>(name.as_bytes()) } {
        Ok(sym) => Ok(*sym),
        Err(e) => {
            tracing::warn!(symbol = name, error = %e, "engine entry point missing");
            Err(Error::SymbolNotFound { symbol: name })
        }
    }
}

struct Loaded {
    path: PathBuf,
    entry: EntryPoints,
    // Dropped last; the entry points are only valid while it is loaded.
    library: Library,
}

/// A plotting engine loaded from a shared library with [`libloading`].
///
/// At most one library is loaded at a time. Dropping the backend unloads it.
pub struct DylibBackend {
    loaded: Option<Loaded>,
    binding: Option<Binding>,
    initialized: bool,
    status: i32,
    frame: Option<Dataframe>,
}

impl fmt::Debug for DylibBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DylibBackend")
            .field("path", &self.loaded.as_ref().map(|l| &l.path))
            .field("initialized", &self.initialized)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Default for DylibBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DylibBackend {
    /// Creates a backend with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaded: None,
            binding: None,
            initialized: false,
            status: 0,
            frame: None,
        }
    }

    /// Path of the loaded library, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    fn entry(&self) -> Result<EntryPoints> {
        self.loaded.as_ref().map(|l| l.entry).ok_or(Error::NotInitialized)
    }

    fn initialized_entry(&self) -> Result<EntryPoints> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        self.entry()
    }

    fn settle(&mut self, status: i32) -> Result<()> {
        self.status = status;
        if status == 0 {
            Ok(())
        } else {
            tracing::warn!(status, "engine reported an error");
            Err(Error::Engine(status))
        }
    }
}

impl Backend for DylibBackend {
    fn load(&mut self, path: &Path) -> Result<()> {
        // Whatever happens next, the previous library is gone.
        if self.is_loaded() {
            let _ = self.unload();
        }
        if !path.is_file() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: loading runs the library's initializers; the engine library
        // is trusted by whoever chose the path.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "engine library rejected");
            Error::ReadLib {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        let entry = EntryPoints::resolve(&library)?;

        self.loaded = Some(Loaded {
            path: path.to_path_buf(),
            entry,
            library,
        });
        self.status = 0;
        tracing::debug!(path = %path.display(), "engine library loaded");
        Ok(())
    }

    fn unload(&mut self) -> Result<()> {
        let Some(loaded) = self.loaded.take() else {
            return Err(Error::NotInitialized);
        };
        self.initialized = false;
        // The library goes first: the engine may still hold the interface.
        drop(loaded.library);
        self.binding = None;
        self.status = 0;
        tracing::debug!(path = %loaded.path.display(), "engine library unloaded");
        Ok(())
    }

    fn init(&mut self, callbacks: Arc<dyn EngineCallbacks>) -> Result<()> {
        let entry = self.entry()?;
        self.initialized = false;
        let binding = Binding::new(callbacks);

        // SAFETY: the binding is stored below and outlives the library
        // (see `unload`).
        let status = unsafe { (entry.set_object)(binding.as_ptr()) };
        self.binding = Some(binding);
        self.settle(status)?;

        // SAFETY: the engine has its interface; init may call back into it.
        let status = unsafe { (entry.init)() };
        self.settle(status)?;

        self.initialized = true;
        tracing::debug!("engine initialized");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn status(&self) -> i32 {
        self.status
    }

    fn clear_status(&mut self) {
        self.status = 0;
    }

    fn run_command(&mut self, command: &str) -> Result<()> {
        let entry = self.initialized_entry()?;
        if self.status != 0 {
            tracing::warn!(status = self.status, "engine call refused after error");
            return Err(Error::Engine(self.status));
        }

        let mut line = Vec::with_capacity(command.len() + 1);
        line.extend_from_slice(command.as_bytes());
        line.push(0);

        // SAFETY: `line` is NUL-terminated and outlives both calls; callbacks
        // fired by `do_line` reach the live binding.
        let status = unsafe {
            (entry.set_input_line)(line.as_ptr().cast::<c_char>(), command.len());
            (entry.do_line)()
        };
        tracing::trace!(command, status, "engine command");
        self.settle(status)
    }

    fn set_dataframe(&mut self, frame: Dataframe) -> Result<()> {
        if !self.is_loaded() {
            return Err(Error::NotInitialized);
        }
        self.frame = Some(frame);
        Ok(())
    }

    fn load_dataframe(&mut self) -> Result<()> {
        let entry = self.initialized_entry()?;
        let Some(frame) = self.frame.as_ref().filter(|f| !f.is_empty()) else {
            return Err(Error::MismatchedDimension {
                len: 0,
                columns: self.frame.as_ref().map_or(0, Dataframe::column_count),
            });
        };
        let too_large = || Error::MismatchedDimension {
            len: frame.values().len(),
            columns: frame.column_count(),
        };
        let rows = c_uint::try_from(frame.row_count()).map_err(|_| too_large())?;
        let cols = c_uint::try_from(frame.column_count()).map_err(|_| too_large())?;

        // SAFETY: the values stay alive and unmodified for the call; the
        // engine copies what it keeps.
        unsafe { (entry.set_dataframe)(frame.values().as_ptr(), rows, cols) };
        tracing::debug!(rows, cols, "dataframe loaded");
        Ok(())
    }

    fn engine_version(&self) -> Result<String> {
        let entry = self.initialized_entry()?;
        let mut buf = [0_u8; ENGINE_VERSION_MAX_LEN];
        let len = c_uint::try_from(buf.len()).unwrap_or(c_uint::MAX);

        // SAFETY: the buffer is writable for `len` bytes.
        unsafe { (entry.version)(buf.as_mut_ptr().cast::<c_char>(), len) };

        let text = match CStr::from_bytes_until_nul(&buf) {
            Ok(s) => s.to_string_lossy().into_owned(),
            Err(_) => String::from_utf8_lossy(&buf).into_owned(),
        };
        Ok(text)
    }
}

impl Drop for DylibBackend {
    fn drop(&mut self) {
        if self.is_loaded() {
            let _ = self.unload();
        }
    }
}
