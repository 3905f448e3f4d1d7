// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`DylibBackend`] against a real shared library built from
//! `plotwire_engine_stub`.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard, const_mutex};
use plotwire_backend_dylib::{Backend, DylibBackend};
use plotwire_core::callbacks::EngineCallbacks;
use plotwire_core::canvas::{CanvasOp, RecordingCanvas};
use plotwire_core::dataframe::Dataframe;
use plotwire_core::error::Error;
use plotwire_core::plot::Plot;
use plotwire_core::renderer::RendererConfig;

// The stub keeps its bound interface in a static, so tests take turns.
static SERIAL: Mutex<()> = const_mutex(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock()
}

fn build_stub(flavor: &str, features: &[&str]) -> PathBuf {
    let target_dir =
        Path::new(env!("CARGO_TARGET_TMPDIR")).join(format!("engine-stub-{flavor}"));
    let cargo_bin = std::env::var_os("CARGO")
        .map_or_else(|| PathBuf::from("cargo"), PathBuf::from);
    let mut cargo = Command::new(cargo_bin);
    cargo
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["build", "--quiet", "-p", "plotwire_engine_stub", "--target-dir"])
        .arg(&target_dir);
    if !features.is_empty() {
        cargo.arg("--features").arg(features.join(","));
    }
    let status = cargo.status().expect("cargo should run");
    assert!(status.success(), "building the {flavor} engine stub failed");
    target_dir
        .join("debug")
        .join(format!("{DLL_PREFIX}plotwire_engine_stub{DLL_SUFFIX}"))
}

fn stub() -> &'static Path {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| build_stub("full", &[]))
}

fn legacy_stub() -> &'static Path {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| build_stub("legacy", &["legacy-abi"]))
}

/// A second file holding the same library, so the loader opens it afresh.
fn stub_copy() -> &'static Path {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let copy = Path::new(env!("CARGO_TARGET_TMPDIR"))
            .join(format!("{DLL_PREFIX}engine_stub_copy{DLL_SUFFIX}"));
        fs::copy(stub(), &copy).expect("stub library should copy");
        copy
    })
}

#[derive(Default)]
struct Calls(Mutex<Vec<String>>);

impl Calls {
    fn push(&self, call: String) {
        self.0.lock().push(call);
    }

    fn take(&self) -> Vec<String> {
        core::mem::take(&mut *self.0.lock())
    }
}

impl EngineCallbacks for Calls {
    fn init(&self) {
        self.push("init".into());
    }

    fn text(&self) {
        self.push("text".into());
    }

    fn move_to(&self, x: u32, y: u32) {
        self.push(format!("move_to {x} {y}"));
    }

    fn vector(&self, x: u32, y: u32) {
        self.push(format!("vector {x} {y}"));
    }

    fn put_text(&self, x: u32, y: u32, text: &str) {
        self.push(format!("put_text {x} {y} {text}"));
    }

    fn point(&self, x: u32, y: u32, kind: i32) {
        self.push(format!("point {x} {y} {kind}"));
    }
}

fn initialized(path: &Path) -> (DylibBackend, Arc<Calls>) {
    let mut backend = DylibBackend::new();
    backend.load(path).unwrap();
    let calls = Arc::new(Calls::default());
    backend.init(calls.clone()).unwrap();
    (backend, calls)
}

#[test]
fn load_init_and_draw() {
    let _serial = serial();
    let mut backend = DylibBackend::new();
    backend.load(stub()).unwrap();
    assert!(backend.is_loaded());
    assert!(!backend.is_initialized());
    assert!(matches!(backend.run_command("plot"), Err(Error::NotInitialized)));

    let calls = Arc::new(Calls::default());
    backend.init(calls.clone()).unwrap();
    assert!(backend.is_initialized());

    backend.run_command("plot").unwrap();
    assert_eq!(
        calls.take(),
        [
            "init",
            "move_to 0 0",
            "vector 1000 1000",
            "put_text 500 500 hi",
            "text"
        ]
    );
    assert_eq!(backend.engine_version().unwrap(), "stub 1.0");
}

#[test]
fn engine_status_gates_until_cleared() {
    let _serial = serial();
    let (mut backend, calls) = initialized(stub());

    assert!(matches!(backend.run_command("explode"), Err(Error::Engine(3))));
    assert_eq!(backend.status(), 3);
    assert!(matches!(backend.run_command("plot"), Err(Error::Engine(3))));
    assert!(calls.take().is_empty(), "a gated command never reaches the engine");

    backend.clear_status();
    backend.run_command("plot").unwrap();
    assert_eq!(calls.take().len(), 5);
}

#[test]
fn dataframe_rows_reach_the_engine() {
    let _serial = serial();
    let (mut backend, calls) = initialized(stub());

    assert!(matches!(
        backend.load_dataframe(),
        Err(Error::MismatchedDimension { .. })
    ));
    let frame = Dataframe::new(vec![1.0, 2.0, 30.0, 40.0, 500.0, 600.0], 2).unwrap();
    backend.set_dataframe(frame).unwrap();
    backend.load_dataframe().unwrap();
    backend.run_command("points").unwrap();
    assert_eq!(
        calls.take(),
        ["point 1 2 0", "point 30 40 0", "point 500 600 0"]
    );
}

#[test]
fn second_load_replaces_the_first() {
    let _serial = serial();
    let (mut backend, first) = initialized(stub());

    backend.load(stub_copy()).unwrap();
    assert!(backend.is_loaded());
    assert_eq!(backend.path(), Some(stub_copy()));
    assert!(!backend.is_initialized(), "the new library needs its own init");
    assert!(matches!(backend.run_command("plot"), Err(Error::NotInitialized)));

    let second = Arc::new(Calls::default());
    backend.init(second.clone()).unwrap();
    backend.run_command("plot").unwrap();
    assert!(first.take().is_empty(), "the replaced binding is never called");
    assert_eq!(second.take().len(), 5);
}

#[test]
fn failed_load_releases_the_previous_library() {
    let _serial = serial();
    let (mut backend, _calls) = initialized(stub());

    let missing = Path::new(env!("CARGO_TARGET_TMPDIR")).join("no-such-engine");
    assert!(matches!(
        backend.load(&missing),
        Err(Error::NotFound { ref path }) if *path == missing
    ));
    assert!(!backend.is_loaded());
    assert_eq!(backend.path(), None);
    assert!(matches!(backend.run_command("plot"), Err(Error::NotInitialized)));
    assert!(matches!(backend.unload(), Err(Error::NotInitialized)));
}

#[test]
fn missing_entry_point_is_symbol_not_found() {
    let _serial = serial();
    let (mut backend, _calls) = initialized(stub());

    match backend.load(legacy_stub()) {
        Err(Error::SymbolNotFound { symbol }) => {
            assert_eq!(symbol, "gdmp_get_gnuplot_version");
        }
        other => panic!("expected SymbolNotFound, got {other:?}"),
    }
    assert!(!backend.is_loaded());
    assert!(matches!(backend.engine_version(), Err(Error::NotInitialized)));
}

#[test]
fn plot_paints_engine_output() {
    let _serial = serial();
    let mut plot = Plot::new(DylibBackend::new());
    plot.load_backend(stub()).unwrap();
    assert_eq!(plot.engine_version().unwrap(), "stub 1.0");

    plot.run_command("plot").unwrap();
    let mut canvas = RecordingCanvas::new();
    assert_eq!(plot.paint(&mut canvas), 3);
    let ops = canvas.take();
    assert!(matches!(ops[0], CanvasOp::Clear { .. }));
    assert!(matches!(ops[1], CanvasOp::Line { .. }));
    assert!(matches!(&ops[2], CanvasOp::Text { text, .. } if text == "hi"));
}

#[test]
fn renderer_drives_the_library_from_paint() {
    let _serial = serial();
    let mut plot = Plot::with_config(
        DylibBackend::new(),
        RendererConfig {
            period: Duration::from_millis(1),
            poll_slice: Duration::from_millis(1),
        },
    );
    plot.load_backend(stub()).unwrap();
    plot.start_renderer(|engine| {
        engine.run_command("plot").unwrap();
    })
    .unwrap();

    let mut canvas = RecordingCanvas::new();
    let mut texts = 0;
    let deadline = Instant::now() + Duration::from_secs(5);
    while plot.iterations() < 3 && Instant::now() < deadline {
        plot.paint(&mut canvas);
        texts += canvas
            .take()
            .iter()
            .filter(|op| matches!(op, CanvasOp::Text { .. }))
            .count();
        std::thread::sleep(Duration::from_millis(1));
    }
    plot.stop_renderer();
    plot.paint(&mut canvas);
    texts += canvas
        .take()
        .iter()
        .filter(|op| matches!(op, CanvasOp::Text { .. }))
        .count();

    assert!(plot.iterations() >= 3, "renderer stalled");
    assert_eq!(texts as u64, plot.iterations(), "one label per iteration");
}
