// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, one tag byte each. [`decode`]
//! reads them back as an iterator of [`RecordedEvent`].

use plotwire_core::command::CommandKind;
use plotwire_core::stage::Stage;
use plotwire_core::trace::{
    BackendOp, BackendOpEvent, CommandQueuedEvent, IterationEvent, PaintPassEvent,
    StageChangeEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_COMMAND_QUEUED: u8 = 1;
const TAG_PAINT_PASS: u8 = 2;
const TAG_STAGE_CHANGE: u8 = 3;
const TAG_ITERATION: u8 = 4;
const TAG_BACKEND_OP: u8 = 5;

fn stage_code(stage: Stage) -> u8 {
    match stage {
        Stage::Undefined => 0,
        Stage::Engine => 1,
        Stage::Surface => 2,
    }
}

fn stage_from_code(code: u8) -> Option<Stage> {
    match code {
        0 => Some(Stage::Undefined),
        1 => Some(Stage::Engine),
        2 => Some(Stage::Surface),
        _ => None,
    }
}

fn op_code(op: BackendOp) -> u8 {
    match op {
        BackendOp::Load => 0,
        BackendOp::Unload => 1,
        BackendOp::Init => 2,
        BackendOp::RunCommand => 3,
        BackendOp::SetDataframe => 4,
        BackendOp::LoadDataframe => 5,
    }
}

fn op_from_code(code: u8) -> Option<BackendOp> {
    match code {
        0 => Some(BackendOp::Load),
        1 => Some(BackendOp::Unload),
        2 => Some(BackendOp::Init),
        3 => Some(BackendOp::RunCommand),
        4 => Some(BackendOp::SetDataframe),
        5 => Some(BackendOp::LoadDataframe),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
}

impl TraceSink for RecorderSink {
    fn on_command_queued(&mut self, e: &CommandQueuedEvent) {
        self.write_u8(TAG_COMMAND_QUEUED);
        self.write_u8(e.kind.tag());
        self.write_u32(e.encoded_len);
        self.write_u64(e.timestamp_us);
    }

    fn on_paint_pass(&mut self, e: &PaintPassEvent) {
        self.write_u8(TAG_PAINT_PASS);
        self.write_u64(e.pass_index);
        self.write_u32(e.drained);
        self.write_u32(e.replayed);
        self.write_u64(e.begin_us);
        self.write_u64(e.end_us);
    }

    fn on_stage_change(&mut self, e: &StageChangeEvent) {
        self.write_u8(TAG_STAGE_CHANGE);
        self.write_u8(stage_code(e.from));
        self.write_u8(stage_code(e.to));
        self.write_u64(e.timestamp_us);
    }

    fn on_iteration(&mut self, e: &IterationEvent) {
        self.write_u8(TAG_ITERATION);
        self.write_u64(e.iteration);
        self.write_u64(e.begin_us);
        self.write_u64(e.end_us);
    }

    fn on_backend_op(&mut self, e: &BackendOpEvent) {
        self.write_u8(TAG_BACKEND_OP);
        self.write_u8(op_code(e.op));
        self.write_i32(e.status);
        self.write_u64(e.timestamp_us);
    }
}

// ---------------------------------------------------------------------------
// Decoded events
// ---------------------------------------------------------------------------

/// A decoded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A queued command.
    CommandQueued(CommandQueuedEvent),
    /// A finished paint pass.
    PaintPass(PaintPassEvent),
    /// A stage change.
    StageChange(StageChangeEvent),
    /// A renderer-loop iteration.
    Iteration(IterationEvent),
    /// A finished backend operation.
    BackendOp(BackendOpEvent),
}

/// Decodes a byte buffer produced by [`RecorderSink`] into events.
///
/// Iteration stops at the end of the buffer, at a truncated record, or at an
/// unknown tag or code.
#[must_use]
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter { bytes, pos: 0 }
}

/// Iterator over decoded events from a recorded byte buffer.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let chunk = self.bytes.get(self.pos..end)?;
        self.pos = end;
        chunk.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn decode_command_queued(&mut self) -> Option<RecordedEvent> {
        let kind = CommandKind::from_tag(self.read_u8()?)?;
        let encoded_len = self.read_u32()?;
        let timestamp_us = self.read_u64()?;
        Some(RecordedEvent::CommandQueued(CommandQueuedEvent {
            kind,
            encoded_len,
            timestamp_us,
        }))
    }

    fn decode_paint_pass(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PaintPass(PaintPassEvent {
            pass_index: self.read_u64()?,
            drained: self.read_u32()?,
            replayed: self.read_u32()?,
            begin_us: self.read_u64()?,
            end_us: self.read_u64()?,
        }))
    }

    fn decode_stage_change(&mut self) -> Option<RecordedEvent> {
        let from = stage_from_code(self.read_u8()?)?;
        let to = stage_from_code(self.read_u8()?)?;
        let timestamp_us = self.read_u64()?;
        Some(RecordedEvent::StageChange(StageChangeEvent {
            from,
            to,
            timestamp_us,
        }))
    }

    fn decode_iteration(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Iteration(IterationEvent {
            iteration: self.read_u64()?,
            begin_us: self.read_u64()?,
            end_us: self.read_u64()?,
        }))
    }

    fn decode_backend_op(&mut self) -> Option<RecordedEvent> {
        let op = op_from_code(self.read_u8()?)?;
        let status = self.read_i32()?;
        let timestamp_us = self.read_u64()?;
        Some(RecordedEvent::BackendOp(BackendOpEvent {
            op,
            status,
            timestamp_us,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_COMMAND_QUEUED => self.decode_command_queued(),
            TAG_PAINT_PASS => self.decode_paint_pass(),
            TAG_STAGE_CHANGE => self.decode_stage_change(),
            TAG_ITERATION => self.decode_iteration(),
            TAG_BACKEND_OP => self.decode_backend_op(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_queued_survives_recording() {
        let mut sink = RecorderSink::new();
        sink.on_command_queued(&CommandQueuedEvent {
            kind: CommandKind::Polygon,
            encoded_len: 57,
            timestamp_us: 1_234,
        });

        let events: Vec<_> = decode(sink.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::CommandQueued(e) => {
                assert_eq!(e.kind, CommandKind::Polygon);
                assert_eq!(e.encoded_len, 57);
                assert_eq!(e.timestamp_us, 1_234);
            }
            other => panic!("expected CommandQueued, got {other:?}"),
        }
    }

    #[test]
    fn stage_change_and_negative_status() {
        let mut sink = RecorderSink::new();
        sink.on_stage_change(&StageChangeEvent {
            from: Stage::Surface,
            to: Stage::Engine,
            timestamp_us: 10,
        });
        sink.on_backend_op(&BackendOpEvent {
            op: BackendOp::RunCommand,
            status: -7,
            timestamp_us: 20,
        });

        let events: Vec<_> = decode(&sink.into_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::StageChange(e) => {
                assert_eq!(e.from, Stage::Surface);
                assert_eq!(e.to, Stage::Engine);
            }
            other => panic!("expected StageChange, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::BackendOp(e) => {
                assert_eq!(e.op, BackendOp::RunCommand);
                assert_eq!(e.status, -7);
                assert_eq!(e.timestamp_us, 20);
            }
            other => panic!("expected BackendOp, got {other:?}"),
        }
    }

    #[test]
    fn spans_keep_their_bounds() {
        let mut sink = RecorderSink::new();
        sink.on_paint_pass(&PaintPassEvent {
            pass_index: 3,
            drained: 12,
            replayed: 11,
            begin_us: 100,
            end_us: 180,
        });
        sink.on_iteration(&IterationEvent {
            iteration: 9,
            begin_us: 200,
            end_us: 450,
        });

        let events: Vec<_> = decode(sink.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::PaintPass(e) => {
                assert_eq!(e.pass_index, 3);
                assert_eq!(e.drained, 12);
                assert_eq!(e.replayed, 11);
                assert_eq!((e.begin_us, e.end_us), (100, 180));
            }
            other => panic!("expected PaintPass, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::Iteration(e) => {
                assert_eq!(e.iteration, 9);
                assert_eq!((e.begin_us, e.end_us), (200, 450));
            }
            other => panic!("expected Iteration, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_ends_iteration() {
        let mut sink = RecorderSink::new();
        sink.on_iteration(&IterationEvent {
            iteration: 1,
            begin_us: 0,
            end_us: 5,
        });
        sink.on_iteration(&IterationEvent {
            iteration: 2,
            begin_us: 5,
            end_us: 9,
        });
        let bytes = sink.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn unknown_tag_ends_iteration() {
        assert_eq!(decode(&[0xEE, 1, 2, 3]).count(), 0);
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
