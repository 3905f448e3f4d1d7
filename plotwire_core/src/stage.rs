// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Which side currently owns the right to produce drawing intents.
//!
//! The cycle is `Undefined → Surface → Engine → Surface → …`:
//!
//! - [`Stage::Surface`] while the host replays queued commands. Engine
//!   callbacks arriving now must not queue anything, or replay would feed
//!   back into encoding.
//! - [`Stage::Engine`] once replay is done and the engine may run. Callbacks
//!   encode and queue commands.

use parking_lot::Mutex;

/// The current draw stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// No paint pass has started yet.
    #[default]
    Undefined,
    /// The engine may produce commands.
    Engine,
    /// The host surface is replaying commands.
    Surface,
}

impl Stage {
    /// Whether engine callbacks should encode and queue commands.
    ///
    /// `Undefined` counts: the engine may run once before the first paint
    /// pass, and that output must not be lost.
    #[must_use]
    pub const fn accepts_commands(self) -> bool {
        matches!(self, Self::Undefined | Self::Engine)
    }
}

/// Guards the [`Stage`] shared by the engine thread and the paint pass.
///
/// Every access takes one short-held lock; it is never held across a
/// callback or a paint call.
#[derive(Debug, Default)]
pub struct StageController {
    stage: Mutex<Stage>,
}

impl StageController {
    /// Creates a controller in [`Stage::Undefined`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current stage.
    #[must_use]
    pub fn get(&self) -> Stage {
        *self.stage.lock()
    }

    /// Sets the stage, returning the previous one.
    pub fn set(&self, stage: Stage) -> Stage {
        core::mem::replace(&mut *self.stage.lock(), stage)
    }

    /// Enters [`Stage::Surface`] at the start of a paint pass.
    pub fn begin_surface_pass(&self) -> Stage {
        self.set(Stage::Surface)
    }

    /// Enters [`Stage::Engine`] once replay has finished.
    pub fn end_surface_pass(&self) -> Stage {
        self.set(Stage::Engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_undefined() {
        let ctl = StageController::new();
        assert_eq!(ctl.get(), Stage::Undefined);
        assert!(ctl.get().accepts_commands());
    }

    #[test]
    fn set_returns_previous() {
        let ctl = StageController::new();
        assert_eq!(ctl.set(Stage::Engine), Stage::Undefined);
        assert_eq!(ctl.set(Stage::Surface), Stage::Engine);
        assert_eq!(ctl.get(), Stage::Surface);
    }

    #[test]
    fn paint_passes_cycle() {
        let ctl = StageController::new();
        for pass in 0..5 {
            let before = ctl.begin_surface_pass();
            if pass == 0 {
                assert_eq!(before, Stage::Undefined);
            } else {
                assert_eq!(before, Stage::Engine);
            }
            assert!(!ctl.get().accepts_commands());
            assert_eq!(ctl.end_surface_pass(), Stage::Surface);
            assert_eq!(ctl.get(), Stage::Engine);
        }
    }
}
