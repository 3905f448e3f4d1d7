// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Paint passes land on one track and engine activity (queued commands,
//! renderer iterations, backend operations) on another.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const PAINT_TID: u32 = 0;
const ENGINE_TID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Recorded timestamps are already in microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::CommandQueued(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Queue",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": ENGINE_TID,
                    "s": "t",
                    "args": {
                        "encoded_len": e.encoded_len,
                    }
                }));
            }
            RecordedEvent::PaintPass(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Paint",
                    "cat": "Surface",
                    "ts": e.begin_us,
                    "pid": 0,
                    "tid": PAINT_TID,
                    "args": {
                        "pass_index": e.pass_index,
                        "drained": e.drained,
                        "replayed": e.replayed,
                    }
                }));
                events.push(json!({
                    "ph": "E",
                    "name": "Paint",
                    "cat": "Surface",
                    "ts": e.end_us,
                    "pid": 0,
                    "tid": PAINT_TID,
                }));
            }
            RecordedEvent::StageChange(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.to),
                    "cat": "Stage",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": PAINT_TID,
                    "s": "g",
                    "args": {
                        "from": format!("{:?}", e.from),
                    }
                }));
            }
            RecordedEvent::Iteration(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Iteration",
                    "cat": "Renderer",
                    "ts": e.begin_us,
                    "pid": 0,
                    "tid": ENGINE_TID,
                    "args": {
                        "iteration": e.iteration,
                    }
                }));
                events.push(json!({
                    "ph": "E",
                    "name": "Iteration",
                    "cat": "Renderer",
                    "ts": e.end_us,
                    "pid": 0,
                    "tid": ENGINE_TID,
                }));
            }
            RecordedEvent::BackendOp(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.op),
                    "cat": "Backend",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": ENGINE_TID,
                    "s": "t",
                    "args": {
                        "status": e.status,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
