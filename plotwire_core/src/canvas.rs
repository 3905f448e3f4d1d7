// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paint-side surface contract.
//!
//! A [`Canvas`] receives decoded [`DrawCommand`](crate::command::DrawCommand)s
//! as primitive paint calls. Every call happens during a paint pass, on the
//! thread that owns the surface.
//!
//! [`RecordingCanvas`] stores each call as a [`CanvasOp`], which is enough for
//! tests and headless tooling.

use kurbo::{Point, Rect};

use crate::color::Color;

/// Horizontal text alignment relative to the text origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    /// Origin is the left edge.
    #[default]
    Left,
    /// Origin is the horizontal center.
    Centre,
    /// Origin is the right edge.
    Right,
}

impl Justify {
    /// Maps the engine's justification code. Unknown codes fall back to
    /// [`Justify::Left`].
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Centre,
            2 => Self::Right,
            _ => Self::Left,
        }
    }

    /// The engine's justification code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Left => 0,
            Self::Centre => 1,
            Self::Right => 2,
        }
    }
}

/// One piece of text to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextRun<'a> {
    /// Anchor position, interpreted according to `justify`.
    pub origin: Point,
    /// Rotation around `origin`, in radians.
    pub angle: f64,
    /// Font size in surface units.
    pub font_size: i32,
    /// Horizontal alignment relative to `origin`.
    pub justify: Justify,
    /// Fill color.
    pub color: Color,
    /// The text itself.
    pub text: &'a str,
}

/// A 2D surface that primitive paint calls are issued against.
///
/// One method per [`CommandKind`](crate::command::CommandKind). Point lists
/// passed to [`fill_polygon`](Self::fill_polygon) and
/// [`stroke_polyline`](Self::stroke_polyline) are never empty.
pub trait Canvas {
    /// Clears `rect` to `color` at the start of a plot.
    ///
    /// Defaults to [`fill_rect`](Self::fill_rect).
    fn clear(&mut self, rect: Rect, color: Color) {
        self.fill_rect(rect, color);
    }

    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Strokes a single line segment.
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color);

    /// Draws a run of text.
    fn draw_text(&mut self, run: &TextRun<'_>);

    /// Fills a circle, used for plot point markers.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    /// Fills a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    /// Strokes an open polyline.
    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Color);
}

/// An owned record of one [`Canvas`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasOp {
    /// [`Canvas::clear`].
    Clear {
        /// Area cleared.
        rect: Rect,
        /// Clear color.
        color: Color,
    },
    /// [`Canvas::fill_rect`].
    FillRect {
        /// Area filled.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// [`Canvas::stroke_line`].
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Color,
    },
    /// [`Canvas::draw_text`].
    Text {
        /// Anchor position.
        origin: Point,
        /// Rotation in radians.
        angle: f64,
        /// Font size.
        font_size: i32,
        /// Alignment.
        justify: Justify,
        /// Fill color.
        color: Color,
        /// The text.
        text: String,
    },
    /// [`Canvas::fill_circle`].
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill color.
        color: Color,
    },
    /// [`Canvas::fill_polygon`].
    Polygon {
        /// Vertices in order.
        points: Vec<Point>,
        /// Fill color.
        color: Color,
    },
    /// [`Canvas::stroke_polyline`].
    Polyline {
        /// Vertices in order.
        points: Vec<Point>,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Color,
    },
}

/// A [`Canvas`] that records every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The calls recorded so far, in order.
    #[must_use]
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Takes the recorded calls, leaving the recording empty.
    pub fn take(&mut self) -> Vec<CanvasOp> {
        core::mem::take(&mut self.ops)
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, rect: Rect, color: Color) {
        self.ops.push(CanvasOp::Clear { rect, color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(CanvasOp::FillRect { rect, color });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.ops.push(CanvasOp::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn draw_text(&mut self, run: &TextRun<'_>) {
        self.ops.push(CanvasOp::Text {
            origin: run.origin,
            angle: run.angle,
            font_size: run.font_size,
            justify: run.justify,
            color: run.color,
            text: run.text.to_owned(),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ops.push(CanvasOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.ops.push(CanvasOp::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Color) {
        self.ops.push(CanvasOp::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
    }
}
