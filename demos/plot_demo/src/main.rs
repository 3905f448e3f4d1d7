// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated engine that exercises the whole draw pipeline.
//!
//! A stand-in backend answers `plot` by firing the callbacks a real engine
//! would (frame, axes, a sampled curve through an open path, markers for the
//! dataframe rows). The main thread paints into a
//! [`RecordingCanvas`](plotwire_core::canvas::RecordingCanvas) at roughly
//! 60 Hz, and each paint runs the re-plot the renderer loop has scheduled,
//! with a growing phase. Events go to both a
//! [`PrettyPrintSink`](plotwire_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](plotwire_debug::recorder::RecorderSink), and the
//! recording is exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use plotwire_core::backend::Backend;
use plotwire_core::callbacks::EngineCallbacks;
use plotwire_core::canvas::{CanvasOp, RecordingCanvas};
use plotwire_core::dataframe::Dataframe;
use plotwire_core::error::{Error, Result};
use plotwire_core::plot::Plot;
use plotwire_core::renderer::RendererConfig;
use plotwire_core::trace::SharedSink;

use plotwire_debug::pretty::PrettyPrintSink;
use plotwire_debug::recorder::RecorderSink;

const PAINT_FRAMES: u32 = 30;
const PAINT_INTERVAL: Duration = Duration::from_millis(16);
const RENDER_PERIOD: Duration = Duration::from_millis(100);

/// Engine units per axis.
const XMAX: u32 = 64_000;
const YMAX: u32 = 48_000;
const SAMPLES: u32 = 48;

/// A fake engine that understands `plot <phase>`.
#[derive(Default)]
struct SimulatedEngine {
    loaded: bool,
    callbacks: Option<Arc<dyn EngineCallbacks>>,
    frame: Option<Dataframe>,
    status: i32,
}

impl SimulatedEngine {
    fn plot(&self, cb: &dyn EngineCallbacks, phase: f64) {
        cb.set_xsize(XMAX);
        cb.set_ysize(YMAX);
        cb.set_background(0x00FF_FFFF);
        cb.init();
        cb.graphics();

        // Axes.
        cb.set_color(0x3333_33FF);
        cb.linewidth(1.0);
        cb.move_to(4_000, 4_000);
        cb.vector(XMAX - 4_000, 4_000);
        cb.move_to(4_000, 4_000);
        cb.vector(4_000, YMAX - 4_000);
        cb.justify_text(1);
        cb.put_text(XMAX / 2, 1_500, "x");

        // Curve.
        cb.set_color(0x1F77_B4FF);
        cb.linewidth(2.0);
        cb.set_path_is_open(true);
        for i in 0..=SAMPLES {
            let t = f64::from(i) / f64::from(SAMPLES);
            let x = 4_000 + scale(t, XMAX - 8_000);
            let y = 4_000 + scale(0.5 + 0.4 * (t * 6.0 + phase).sin(), YMAX - 8_000);
            if i == 0 {
                cb.move_to(x, y);
            } else {
                cb.vector(x, y);
            }
        }
        cb.set_path_is_open(false);

        // One marker per dataframe row, first two columns as (x, y) in 0..1.
        if let Some(frame) = &self.frame {
            cb.set_color(0xD627_28FF);
            cb.pointsize(1.5);
            for row in frame.rows() {
                if let [x, y, ..] = row {
                    cb.point(
                        4_000 + scale(*x, XMAX - 8_000),
                        4_000 + scale(*y, YMAX - 8_000),
                        7,
                    );
                }
            }
        }

        cb.fillbox(0, XMAX - 9_000, YMAX - 6_000, 4_000, 2_000);
        cb.text();
    }
}

/// Maps `t` in `0..=1` onto `0..=span` engine units.
#[expect(
    clippy::cast_possible_truncation,
    reason = "clamped to 0..=span, which fits in u32"
)]
fn scale(t: f64, span: u32) -> u32 {
    (t.clamp(0.0, 1.0) * f64::from(span)).round() as u32
}

impl Backend for SimulatedEngine {
    fn load(&mut self, _path: &Path) -> Result<()> {
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
        let Some(cb) = self.callbacks.clone() else {
            return Err(Error::NotInitialized);
        };
        if self.status != 0 {
            return Err(Error::Engine(self.status));
        }
        match command.split_once(' ') {
            Some(("plot", phase)) => {
                let phase = phase.trim().parse().unwrap_or(0.0);
                self.plot(cb.as_ref(), phase);
                Ok(())
            }
            _ => {
                self.status = 1;
                Err(Error::Engine(1))
            }
        }
    }

    fn set_dataframe(&mut self, frame: Dataframe) -> Result<()> {
        if !self.loaded {
            return Err(Error::NotInitialized);
        }
        self.frame = Some(frame);
        Ok(())
    }

    fn load_dataframe(&mut self) -> Result<()> {
        if self.callbacks.is_none() {
            return Err(Error::NotInitialized);
        }
        match &self.frame {
            Some(frame) if !frame.is_empty() => Ok(()),
            _ => Err(Error::MismatchedDimension { len: 0, columns: 0 }),
        }
    }

    fn engine_version(&self) -> Result<String> {
        if self.callbacks.is_none() {
            return Err(Error::NotInitialized);
        }
        Ok("simulated 1.0".to_owned())
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    // -- sinks -------------------------------------------------------------
    let recorder = SharedSink::new(RecorderSink::new());
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));

    // -- plot --------------------------------------------------------------
    let config = RendererConfig::default().with_period(RENDER_PERIOD);
    let mut plot = Plot::with_config(SimulatedEngine::default(), config);
    plot.set_trace_sink(Some(Box::new((pretty, recorder.clone()))));

    plot.load_backend("simulated").expect("simulated engine always loads");
    let samples = [0.1, 0.2, 0.3, 0.7, 0.5, 0.4, 0.8, 0.9];
    plot.set_dataframe(samples.to_vec(), 2).expect("eight values split into two columns");
    plot.load_dataframe().expect("dataframe was just set");
    tracing::info!(
        version = plot.version(),
        engine = ?plot.engine_version(),
        "plot ready"
    );

    // An unknown command trips the status gate until it is cleared.
    if let Err(e) = plot.run_command("splot") {
        tracing::info!(error = %e, "engine rejected command");
    }
    plot.clear_status();

    // -- renderer ----------------------------------------------------------
    let mut phase = 0.0_f64;
    plot.start_renderer(move |engine| {
        if let Err(e) = engine.run_command(&format!("plot {phase}")) {
            tracing::warn!(error = %e, "plot iteration failed");
        }
        phase += 0.25;
    })
    .expect("renderer thread starts");

    // -- paint loop --------------------------------------------------------
    let mut canvas = RecordingCanvas::new();
    let mut lines = 0_usize;
    let mut polylines = 0_usize;
    for _ in 0..PAINT_FRAMES {
        thread::sleep(PAINT_INTERVAL);
        plot.paint(&mut canvas);
        for op in canvas.take() {
            match op {
                CanvasOp::Line { .. } => lines += 1,
                CanvasOp::Polyline { .. } => polylines += 1,
                _ => {}
            }
        }
    }
    plot.stop_renderer();
    tracing::info!(
        iterations = plot.iterations(),
        passes = plot.state().paint_passes(),
        lines,
        polylines,
        "rendering stopped"
    );

    // -- export ------------------------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    recorder
        .with(|r| plotwire_debug::chrome::export(r.as_bytes(), &mut writer))
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({PAINT_FRAMES} paint passes)");
}
