// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary encoding of drawing intents.
//!
//! A [`DrawCommand`] is one tag byte followed by a fixed, kind-specific
//! little-endian layout. Geometry is always 4-byte IEEE-754 `f32`; colors are
//! packed `u32` ([`Color`]). Text and vertex lists carry a `u32` prefix (byte
//! length or vertex count) so the fields after them can be located.
//!
//! | Kind         | Layout after the tag                                    |
//! |--------------|---------------------------------------------------------|
//! | `Init`       | `x y w h color`                                         |
//! | `Rectangle`  | `x y w h color`                                         |
//! | `Line`       | `x1 y1 x2 y2 width color`                               |
//! | `Text`       | `len bytes[len] x y angle font_size justify color`      |
//! | `Point`      | `x y size color`                                        |
//! | `Polygon`    | `count (x y)[count] color`                              |
//! | `PathStroke` | `count (x y)[count] width color`                        |
//!
//! [`DrawCommand::replay`] reads the fields back in the same order and issues
//! exactly one [`Canvas`] call. Unknown tags, truncated payloads and empty
//! vertex lists issue nothing.

use core::fmt;

use kurbo::{Point, Rect, Size};

use crate::canvas::{Canvas, Justify, TextRun};
use crate::color::Color;

// Every geometry field in flight depends on this width.
const _: () = assert!(
    size_of::<f32>() == 4,
    "draw commands require a 4-byte f32"
);

// ---------------------------------------------------------------------------
// Kind tags
// ---------------------------------------------------------------------------

const TAG_INIT: u8 = 1;
const TAG_RECTANGLE: u8 = 2;
const TAG_LINE: u8 = 3;
const TAG_TEXT: u8 = 4;
const TAG_POINT: u8 = 5;
const TAG_POLYGON: u8 = 6;
const TAG_PATH_STROKE: u8 = 7;

/// Initial payload capacity; enough for every fixed-size kind.
const INITIAL_CAPACITY: usize = 32;

/// A vertex in surface coordinates.
pub type Vertex = [f32; 2];

/// Which paint operation a [`DrawCommand`] encodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Clear of the plot area at the start of a plot.
    Init,
    /// Filled rectangle.
    Rectangle,
    /// Single stroked segment.
    Line,
    /// Text run.
    Text,
    /// Point marker.
    Point,
    /// Filled polygon.
    Polygon,
    /// Stroked open path.
    PathStroke,
}

impl CommandKind {
    /// All kinds, in tag order.
    pub const ALL: [Self; 7] = [
        Self::Init,
        Self::Rectangle,
        Self::Line,
        Self::Text,
        Self::Point,
        Self::Polygon,
        Self::PathStroke,
    ];

    /// The wire tag for this kind.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Init => TAG_INIT,
            Self::Rectangle => TAG_RECTANGLE,
            Self::Line => TAG_LINE,
            Self::Text => TAG_TEXT,
            Self::Point => TAG_POINT,
            Self::Polygon => TAG_POLYGON,
            Self::PathStroke => TAG_PATH_STROKE,
        }
    }

    /// Looks up a kind by wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            TAG_INIT => Self::Init,
            TAG_RECTANGLE => Self::Rectangle,
            TAG_LINE => Self::Line,
            TAG_TEXT => Self::Text,
            TAG_POINT => Self::Point,
            TAG_POLYGON => Self::Polygon,
            TAG_PATH_STROKE => Self::PathStroke,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// DrawCommand
// ---------------------------------------------------------------------------

/// One encoded drawing intent awaiting replay.
///
/// Commands are immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct DrawCommand {
    buf: Vec<u8>,
}

impl fmt::Debug for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawCommand")
            .field("kind", &self.kind())
            .field("len", &self.buf.len())
            .finish()
    }
}

impl DrawCommand {
    /// Encodes a plot-area clear.
    #[must_use]
    pub fn init(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        let mut cmd = Self::begin(CommandKind::Init);
        cmd.write_rect(x, y, width, height);
        cmd.write_color(color);
        cmd
    }

    /// Encodes a filled rectangle.
    #[must_use]
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        let mut cmd = Self::begin(CommandKind::Rectangle);
        cmd.write_rect(x, y, width, height);
        cmd.write_color(color);
        cmd
    }

    /// Encodes a stroked segment.
    #[must_use]
    pub fn line(from: Vertex, to: Vertex, width: f32, color: Color) -> Self {
        let mut cmd = Self::begin(CommandKind::Line);
        cmd.write_vertex(from);
        cmd.write_vertex(to);
        cmd.write_f32(width);
        cmd.write_color(color);
        cmd
    }

    /// Encodes a text run. `angle` is in radians.
    #[must_use]
    pub fn text(
        origin: Vertex,
        angle: f32,
        font_size: i32,
        justify: Justify,
        color: Color,
        text: &str,
    ) -> Self {
        let bytes = text.as_bytes();
        let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        let bytes = &bytes[..len as usize];

        let mut cmd = Self::begin(CommandKind::Text);
        cmd.write_u32(len);
        cmd.write_bytes(bytes);
        cmd.write_vertex(origin);
        cmd.write_f32(angle);
        cmd.write_i32(font_size);
        cmd.write_i32(justify.code());
        cmd.write_color(color);
        cmd
    }

    /// Encodes a point marker of radius `size`.
    #[must_use]
    pub fn point(center: Vertex, size: f32, color: Color) -> Self {
        let mut cmd = Self::begin(CommandKind::Point);
        cmd.write_vertex(center);
        cmd.write_f32(size);
        cmd.write_color(color);
        cmd
    }

    /// Encodes a filled polygon.
    #[must_use]
    pub fn polygon(points: &[Vertex], color: Color) -> Self {
        let mut cmd = Self::begin(CommandKind::Polygon);
        cmd.write_vertices(points);
        cmd.write_color(color);
        cmd
    }

    /// Encodes a stroked open path.
    #[must_use]
    pub fn path_stroke(points: &[Vertex], width: f32, color: Color) -> Self {
        let mut cmd = Self::begin(CommandKind::PathStroke);
        cmd.write_vertices(points);
        cmd.write_f32(width);
        cmd.write_color(color);
        cmd
    }

    /// Wraps an already-encoded payload without validating it.
    ///
    /// Malformed payloads are harmless: [`replay`](Self::replay) ignores them.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { buf: bytes }
    }

    /// The decoded kind, or `None` for an empty payload or unknown tag.
    #[must_use]
    pub fn kind(&self) -> Option<CommandKind> {
        self.buf.first().copied().and_then(CommandKind::from_tag)
    }

    /// The encoded payload, tag included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of encoded bytes, tag included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.buf.len()
    }

    /// Bytes currently allocated for the payload.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Decodes this command and issues the matching call on `canvas`.
    ///
    /// Returns `true` if a call was issued.
    pub fn replay(&self, canvas: &mut dyn Canvas) -> bool {
        let mut r = Reader::new(&self.buf);
        let Some(kind) = r.read_u8().and_then(CommandKind::from_tag) else {
            return false;
        };
        let issued = match kind {
            CommandKind::Init => replay_init(&mut r, canvas),
            CommandKind::Rectangle => replay_rectangle(&mut r, canvas),
            CommandKind::Line => replay_line(&mut r, canvas),
            CommandKind::Text => replay_text(&mut r, canvas),
            CommandKind::Point => replay_point(&mut r, canvas),
            CommandKind::Polygon => replay_polygon(&mut r, canvas),
            CommandKind::PathStroke => replay_path_stroke(&mut r, canvas),
        };
        issued.is_some()
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(kind: CommandKind) -> Self {
        let mut cmd = Self {
            buf: Vec::with_capacity(INITIAL_CAPACITY),
        };
        cmd.write_u8(kind.tag());
        cmd
    }

    /// Doubles capacity (or grows to fit, if larger) when `additional` bytes
    /// would overflow it.
    fn grow_for(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        let capacity = self.buf.capacity();
        if needed > capacity {
            let target = capacity.saturating_mul(2).max(needed);
            self.buf.reserve_exact(target - self.buf.len());
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.grow_for(1);
        self.buf.push(v);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.grow_for(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_color(&mut self, c: Color) {
        self.write_u32(c.0);
    }

    fn write_vertex(&mut self, [x, y]: Vertex) {
        self.write_f32(x);
        self.write_f32(y);
    }

    fn write_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.write_vertex([x, y]);
        self.write_vertex([width, height]);
    }

    fn write_vertices(&mut self, points: &[Vertex]) {
        let count = u32::try_from(points.len()).unwrap_or(u32::MAX);
        self.write_u32(count);
        self.grow_for(points.len() * 8);
        for &p in &points[..count as usize] {
            self.write_vertex(p);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Cursor over an encoded payload. Every read fails on truncation.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.read_bytes(N)?.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    fn read_f32(&mut self) -> Option<f64> {
        self.read_array().map(f32::from_le_bytes).map(f64::from)
    }

    fn read_color(&mut self) -> Option<Color> {
        self.read_u32().map(Color)
    }

    fn read_point(&mut self) -> Option<Point> {
        Some(Point::new(self.read_f32()?, self.read_f32()?))
    }

    fn read_rect(&mut self) -> Option<Rect> {
        let origin = self.read_point()?;
        let size = Size::new(self.read_f32()?, self.read_f32()?);
        Some(Rect::from_origin_size(origin, size))
    }

    fn read_points(&mut self) -> Option<Vec<Point>> {
        let count = self.read_u32()? as usize;
        if count.checked_mul(8)? > self.remaining() {
            return None;
        }
        (0..count).map(|_| self.read_point()).collect()
    }
}

fn replay_init(r: &mut Reader<'_>, canvas: &mut dyn Canvas) -> Option<()> {
    let rect = r.read_rect()?;
    let color = r.read_color()?;
    canvas.clear(rect, color);
    Some(())
}

fn replay_rectangle(r: &mut Reader<'_>, canvas: &mut dyn Canvas) -> Option<()> {
    let rect = r.read_rect()?;
    let color = r.read_color()?;
    canvas.fill_rect(rect, color);
    Some(())
}

fn replay_line(r: &mut Reader<'_>, canvas: &mut dyn Canvas) -> Option<()> {
    let from = r.read_point()?;
    let to = r.read_point()?;
    let width = r.read_f32()?;
    let color = r.read_color()?;
    canvas.stroke_line(from, to, width, color);
    Some(())
}

fn replay_text(r: &mut Reader<'_>, canvas: &mut dyn Canvas) -> Option<()> {
    let len = r.read_u32()? as usize;
    let text = core::str::from_utf8(r.read_bytes(len)?).ok()?;
    let run = TextRun {
        origin: r.read_point()?,
        angle: r.read_f32()?,
        font_size: r.read_i32()?,
        justify: Justify::from_code(r.read_i32()?),
        color: r.read_color()?,
        text,
    };
    canvas.draw_text(&run);
    Some(())
}

fn replay_point(r: &mut Reader<'_>, canvas: &mut dyn Canvas) -> Option<()> {
    let center = r.read_point()?;
    let radius = r.read_f32()?;
    let color = r.read_color()?;
    canvas.fill_circle(center, radius, color);
    Some(())
}

fn replay_polygon(r: &mut Reader<'_>, canvas: &mut dyn Canvas) -> Option<()> {
    let points = r.read_points()?;
    let color = r.read_color()?;
    if points.is_empty() {
        return None;
    }
    canvas.fill_polygon(&points, color);
    Some(())
}

fn replay_path_stroke(r: &mut Reader<'_>, canvas: &mut dyn Canvas) -> Option<()> {
    let points = r.read_points()?;
    let width = r.read_f32()?;
    let color = r.read_color()?;
    if points.is_empty() {
        return None;
    }
    canvas.stroke_polyline(&points, width, color);
    Some(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
