// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by backends, the plot owner and the renderer loop.

use std::io;
use std::path::PathBuf;

/// Base of the negative status-code range, clear of any engine status.
const CODE_BASE: i32 = i16::MIN as i32;

/// Everything that can go wrong while driving a plot.
///
/// Nothing here is fatal. A caller that ignores an error keeps running in a
/// degraded state: later calls fail with [`Error::NotInitialized`] rather
/// than crashing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend library file does not exist.
    #[error("backend library not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The platform loader rejected the backend library.
    #[error("failed to load backend library {}: {reason}", path.display())]
    ReadLib {
        /// Path that was loaded.
        path: PathBuf,
        /// Loader diagnostic.
        reason: String,
    },
    /// A required entry point is missing from the backend library.
    #[error("backend library is missing entry point `{symbol}`")]
    SymbolNotFound {
        /// Name of the missing symbol.
        symbol: &'static str,
    },
    /// An operation ran before a successful load and init.
    #[error("backend is not initialized")]
    NotInitialized,
    /// A dataframe's length is not a multiple of its column count.
    #[error("{len} values cannot be split into {columns} columns")]
    MismatchedDimension {
        /// Number of values supplied.
        len: usize,
        /// Requested column count.
        columns: usize,
    },
    /// The engine left, or just returned, a non-zero status.
    #[error("engine reported status {0}")]
    Engine(i32),
    /// The renderer loop thread could not be spawned.
    #[error("renderer loop failed to start")]
    RendererStartFailed(#[source] io::Error),
}

impl Error {
    /// A stable status code for hosts that surface plain integers.
    ///
    /// Library errors map to fixed negative values starting at
    /// `i16::MIN`; [`Error::Engine`] passes the engine's own status through.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::NotInitialized => CODE_BASE + 1,
            Self::ReadLib { .. } => CODE_BASE + 2,
            Self::NotFound { .. } => CODE_BASE + 3,
            Self::SymbolNotFound { .. } => CODE_BASE + 4,
            Self::MismatchedDimension { .. } => CODE_BASE + 5,
            Self::RendererStartFailed(_) => CODE_BASE + 6,
            Self::Engine(status) => *status,
        }
    }
}

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_negative() {
        let errors = [
            Error::NotFound {
                path: PathBuf::from("x"),
            },
            Error::ReadLib {
                path: PathBuf::from("x"),
                reason: String::new(),
            },
            Error::SymbolNotFound { symbol: "do_line" },
            Error::NotInitialized,
            Error::MismatchedDimension { len: 5, columns: 2 },
            Error::RendererStartFailed(io::Error::other("spawn")),
        ];
        let mut codes: Vec<i32> = errors.iter().map(Error::code).collect();
        assert!(codes.iter().all(|&c| c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn engine_status_passes_through() {
        assert_eq!(Error::Engine(3).code(), 3);
    }

    #[test]
    fn messages_name_the_problem() {
        let e = Error::MismatchedDimension { len: 7, columns: 3 };
        assert_eq!(e.to_string(), "7 values cannot be split into 3 columns");
        let e = Error::SymbolNotFound { symbol: "gdmp_init" };
        assert!(e.to_string().contains("gdmp_init"));
    }
}
