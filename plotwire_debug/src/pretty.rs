// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use plotwire_core::trace::{
    BackendOpEvent, CommandQueuedEvent, IterationEvent, PaintPassEvent, StageChangeEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_command_queued(&mut self, e: &CommandQueuedEvent) {
        let _ = writeln!(
            self.writer,
            "[queued] {:?} len={} at={}us",
            e.kind, e.encoded_len, e.timestamp_us,
        );
    }

    fn on_paint_pass(&mut self, e: &PaintPassEvent) {
        let _ = writeln!(
            self.writer,
            "[paint] pass={} drained={} replayed={} took={}us",
            e.pass_index,
            e.drained,
            e.replayed,
            e.end_us.saturating_sub(e.begin_us),
        );
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[stage] {:?} -> {:?} at={}us",
            e.from, e.to, e.timestamp_us,
        );
    }

    fn on_iteration(&mut self, e: &IterationEvent) {
        let _ = writeln!(
            self.writer,
            "[iteration] n={} took={}us",
            e.iteration,
            e.end_us.saturating_sub(e.begin_us),
        );
    }

    fn on_backend_op(&mut self, e: &BackendOpEvent) {
        if e.status == 0 {
            let _ = writeln!(self.writer, "[backend] {:?} ok at={}us", e.op, e.timestamp_us);
        } else {
            let _ = writeln!(
                self.writer,
                "[backend] {:?} status={} at={}us",
                e.op, e.status, e.timestamp_us,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use plotwire_core::command::CommandKind;
    use plotwire_core::stage::Stage;
    use plotwire_core::trace::BackendOp;

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_command_queued(&CommandQueuedEvent {
            kind: CommandKind::Line,
            encoded_len: 25,
            timestamp_us: 100,
        });
        sink.on_stage_change(&StageChangeEvent {
            from: Stage::Engine,
            to: Stage::Surface,
            timestamp_us: 150,
        });
        sink.on_paint_pass(&PaintPassEvent {
            pass_index: 0,
            drained: 4,
            replayed: 4,
            begin_us: 150,
            end_us: 190,
        });

        let text = output(sink);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[queued] Line len=25 at=100us");
        assert_eq!(lines[1], "[stage] Engine -> Surface at=150us");
        assert_eq!(lines[2], "[paint] pass=0 drained=4 replayed=4 took=40us");
    }

    #[test]
    fn backend_status_is_shown_only_on_failure() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_backend_op(&BackendOpEvent {
            op: BackendOp::Load,
            status: 0,
            timestamp_us: 1,
        });
        sink.on_backend_op(&BackendOpEvent {
            op: BackendOp::RunCommand,
            status: -2,
            timestamp_us: 2,
        });

        let text = output(sink);
        assert!(text.contains("[backend] Load ok"), "got {text}");
        assert!(text.contains("[backend] RunCommand status=-2"), "got {text}");
    }

    #[test]
    fn iteration_reports_duration() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_iteration(&IterationEvent {
            iteration: 7,
            begin_us: 1_000,
            end_us: 1_250,
        });
        assert!(output(sink).contains("[iteration] n=7 took=250us"));
    }
}
