// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine's drawing callbacks, as a Rust trait.
//!
//! [`EngineCallbacks`] has one method per entry of the engine's fixed callback
//! table, in table order. Backends expose an implementation to the engine
//! through whatever binding their ABI needs; the engine then calls it
//! synchronously from its own thread, inside `run_command` and friends.
//!
//! Coordinates are in engine units (unsigned, origin bottom-left). Text
//! arguments arrive already decoded; entries whose text pointer was null are
//! not forwarded, except where the parameter is an `Option`.
//!
//! Every method defaults to a no-op so implementations only override what
//! they draw or track.

/// Receiver for every call in the engine's callback table.
///
/// Methods take `&self`: the engine holds a shared handle and may call from
/// a thread other than the one that created the implementation.
pub trait EngineCallbacks: Send + Sync {
    /// Terminal option parsing hook.
    fn options(&self) {}

    /// Start of a plot; the plot area should be cleared.
    fn init(&self) {}

    /// Terminal reset.
    fn reset(&self) {}

    /// End of a plot; the frame is complete.
    fn text(&self) {}

    /// Requests scaling. Returns whether the terminal applied it.
    fn scale(&self, x: f64, y: f64) -> bool {
        _ = (x, y);
        false
    }

    /// Switch to graphics mode before drawing.
    fn graphics(&self) {}

    /// Moves the pen without drawing.
    fn move_to(&self, x: u32, y: u32) {
        _ = (x, y);
    }

    /// Draws from the pen position to `(x, y)`.
    fn vector(&self, x: u32, y: u32) {
        _ = (x, y);
    }

    /// Selects a line type.
    fn linetype(&self, linetype: i32) {
        _ = linetype;
    }

    /// Draws text anchored at `(x, y)`.
    fn put_text(&self, x: u32, y: u32, text: &str) {
        _ = (x, y, text);
    }

    /// Sets the text angle in degrees. Returns whether rotation is supported.
    fn text_angle(&self, degrees: f32) -> bool {
        _ = degrees;
        false
    }

    /// Sets text justification. Returns whether the mode is supported.
    fn justify_text(&self, mode: i32) -> bool {
        _ = mode;
        false
    }

    /// Draws a point marker of style `kind` at `(x, y)`.
    fn point(&self, x: u32, y: u32, kind: i32) {
        _ = (x, y, kind);
    }

    /// Draws an arrow from `(sx, sy)` to `(ex, ey)`.
    fn arrow(&self, sx: u32, sy: u32, ex: u32, ey: u32, head: i32) {
        _ = (sx, sy, ex, ey, head);
    }

    /// Selects a font, optionally as `"name,size"`. Returns whether it was
    /// accepted.
    fn set_font(&self, name: Option<&str>, size: f64) -> bool {
        _ = (name, size);
        false
    }

    /// Changes the point marker size.
    fn pointsize(&self, size: f64) {
        _ = size;
    }

    /// Called after one plot of a multiplot.
    fn suspend(&self) {}

    /// Called before the plots of a multiplot.
    fn resume(&self) {}

    /// Fills a box; `style` packs the fill style and density.
    fn fillbox(&self, style: i32, x: u32, y: u32, width: u32, height: u32) {
        _ = (style, x, y, width, height);
    }

    /// Sets the line width multiplier.
    fn linewidth(&self, width: f64) {
        _ = width;
    }

    /// Palette negotiation. Returns the number of colors the terminal
    /// provides, or 0 for continuous color.
    fn make_palette(&self) -> i32 {
        0
    }

    /// Restores the palette before the last `make_palette`.
    fn previous_palette(&self) {}

    /// Sets the current color from a packed engine color.
    fn set_color(&self, color: u32) {
        _ = color;
    }

    /// Fills a polygon given its corners in engine units.
    fn filled_polygon(&self, corners: &[[i32; 2]], style: i32) {
        _ = (corners, style);
    }

    /// Draws an `m × n` image.
    fn image(&self, m: u32, n: u32, color_mode: u32) {
        _ = (m, n, color_mode);
    }

    /// Starts an enhanced-text fragment.
    fn enhanced_open(
        &self,
        font: &str,
        size: f64,
        base: f64,
        width_flag: bool,
        show_flag: bool,
        overprint: i32,
    ) {
        _ = (font, size, base, width_flag, show_flag, overprint);
    }

    /// Flushes the current enhanced-text fragment.
    fn enhanced_flush(&self) {}

    /// Appends one character to the current enhanced-text fragment.
    fn enhanced_writec(&self, c: i32) {
        _ = c;
    }

    /// Layer boundary notification.
    fn layer(&self, layer: u32) {
        _ = layer;
    }

    /// Path boundary notification.
    fn path(&self, p: i32) {
        _ = p;
    }

    /// Hypertext attached to the next drawn element.
    fn hypertext(&self, kind: i32, text: &str) {
        _ = (kind, text);
    }

    /// Boxed-text control.
    fn boxed_text(&self, x: u32, y: u32, option: i32) {
        _ = (x, y, option);
    }

    /// Interactive plot toggling.
    fn modify_plots(&self, operations: u32, plotno: i32) {
        _ = (operations, plotno);
    }

    /// Selects a dash type.
    fn dashtype(&self, kind: i32) {
        _ = kind;
    }

    // -- style state -------------------------------------------------------

    /// Horizontal resolution in engine units.
    fn set_xmax(&self, value: u32) {
        _ = value;
    }

    /// Vertical resolution in engine units.
    fn set_ymax(&self, value: u32) {
        _ = value;
    }

    /// Horizontal tic length.
    fn set_h_tic(&self, value: u32) {
        _ = value;
    }

    /// Vertical tic length.
    fn set_v_tic(&self, value: u32) {
        _ = value;
    }

    /// How the next colors are chosen.
    fn set_color_mode(&self, mode: u8) {
        _ = mode;
    }

    /// Current line type.
    fn set_linetype(&self, value: i32) {
        _ = value;
    }

    /// Current dash pattern.
    fn set_dashpattern(&self, pattern: &str) {
        _ = pattern;
    }

    /// Character width.
    fn set_h_char(&self, value: u32) {
        _ = value;
    }

    /// Character height.
    fn set_v_char(&self, value: u32) {
        _ = value;
    }

    /// Grid line style.
    fn set_gridline(&self, value: u32) {
        _ = value;
    }

    /// Whether a grid is drawn.
    fn set_hasgrid(&self, value: u32) {
        _ = value;
    }

    /// Index of the plot being drawn.
    fn set_plotno(&self, value: u32) {
        _ = value;
    }

    /// Fill pattern.
    fn set_fill_pattern(&self, value: i32) {
        _ = value;
    }

    /// Fill pattern index.
    fn set_fill_pattern_index(&self, value: u32) {
        _ = value;
    }

    /// Explicit `0xRRGGBB` color.
    fn set_rgb(&self, rgb: u32) {
        _ = rgb;
    }

    /// Pattern fill colors.
    fn set_patterncolor(&self, colors: [u32; 8]) {
        _ = colors;
    }

    /// Whether a filled group is open.
    fn set_group_filled_is_open(&self, open: bool) {
        _ = open;
    }

    /// Whether text is being drawn inside a box.
    fn set_in_textbox(&self, inside: bool) {
        _ = inside;
    }

    /// Plot width in engine units.
    fn set_xsize(&self, value: u32) {
        _ = value;
    }

    /// Plot height in engine units.
    fn set_ysize(&self, value: u32) {
        _ = value;
    }

    /// Last pen x position.
    fn set_xlast(&self, value: u32) {
        _ = value;
    }

    /// Last pen y position.
    fn set_ylast(&self, value: u32) {
        _ = value;
    }

    /// Line cap style.
    fn set_linecap(&self, value: i32) {
        _ = value;
    }

    /// Whether a group is open.
    fn set_group_is_open(&self, open: bool) {
        _ = open;
    }

    /// Whether a path is open; closing it ends the current stroke.
    fn set_path_is_open(&self, open: bool) {
        _ = open;
    }

    /// Font scale factor.
    fn set_fontscale(&self, value: f64) {
        _ = value;
    }

    /// Dash length factor.
    fn set_dashlength(&self, value: f64) {
        _ = value;
    }

    /// Terminal name.
    fn set_name(&self, name: &str) {
        _ = name;
    }

    /// Line width factor.
    fn set_linewidth_factor(&self, value: f64) {
        _ = value;
    }

    /// Background as `0xRRGGBB`.
    fn set_background(&self, rgb: i32) {
        _ = rgb;
    }

    /// Line color as `"r,g,b"` or a color name.
    fn set_linecolor(&self, spec: &str) {
        _ = spec;
    }

    /// Alpha override for fills.
    fn set_alpha(&self, value: f64) {
        _ = value;
    }

    /// Point marker size.
    fn set_term_pointsize(&self, value: f64) {
        _ = value;
    }

    /// Stroke width.
    fn set_stroke_width(&self, value: f64) {
        _ = value;
    }

    /// Defines pen `index`, or selects a pen when `index` is out of range.
    fn set_pen(&self, index: u32, color: u32, width: f64) {
        _ = (index, color, width);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::EngineCallbacks;

    #[derive(Default)]
    struct CountMoves(AtomicU32);

    impl EngineCallbacks for CountMoves {
        fn move_to(&self, _x: u32, _y: u32) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn defaults_are_noops_behind_a_trait_object() {
        let cb: Arc<dyn EngineCallbacks> = Arc::new(CountMoves::default());
        cb.init();
        cb.vector(1, 2);
        assert!(!cb.scale(1.0, 1.0));
        assert_eq!(cb.make_palette(), 0);
        cb.move_to(3, 4);
        cb.move_to(5, 6);
    }

    #[test]
    fn overridden_method_is_dispatched() {
        let cb = CountMoves::default();
        cb.move_to(0, 0);
        cb.set_pen(0, 0, 1.0);
        assert_eq!(cb.0.load(Ordering::Relaxed), 1);
    }
}
