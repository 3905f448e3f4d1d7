// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing state assigned by the engine between draw calls.
//!
//! The engine configures pens, colors, fonts and the plot size through
//! setter callbacks, then issues draw calls that depend on that state.
//! [`StyleState`] holds it and resolves the effective color, width and
//! surface coordinates for each draw call.
//!
//! Engine coordinates are unsigned, scaled by [`ENGINE_SCALE`] and have their
//! origin at the bottom left. Surface coordinates have theirs at the top left.

use crate::color::Color;

/// Engine units to surface units.
pub const ENGINE_SCALE: f32 = 0.01;

/// Number of pens the engine can define.
pub const PEN_COUNT: usize = 16;

/// How colors for the next draw calls are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Use the default color, or the current pen's.
    #[default]
    Default,
    /// Use the line color.
    LineType,
    /// Use the explicit color from `set_color`.
    Rgb,
    /// Any mode without a dedicated rule; treated like `Default`.
    Other(u8),
}

impl ColorMode {
    /// Maps the engine's color-mode code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Default,
            1 => Self::LineType,
            3 => Self::Rgb,
            other => Self::Other(other),
        }
    }
}

/// Fill style code for a solid fill, in the low nibble of a fill style.
const FILL_SOLID: i32 = 1;

/// One of the engine's configurable pens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pen {
    /// Stroke width.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            width: 2.0,
            color: Color::BLACK,
        }
    }
}

/// Font selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Face name, possibly with a `,size` suffix as the engine sent it.
    pub name: String,
    /// Size in points.
    pub size: f64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 12.0,
        }
    }
}

/// Everything the engine's setter callbacks assign.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleState {
    /// Pen table.
    pub pens: [Pen; PEN_COUNT],
    /// Pen used when the color mode does not pick another color.
    pub pen_index: usize,
    /// Current font.
    pub font: Font,
    /// Font scale factor.
    pub fontscale: f64,
    /// Color mode for the next draw calls.
    pub color_mode: ColorMode,
    /// Explicit color from `set_color`.
    pub color: Color,
    /// Line color from `set_linecolor`.
    pub line_color: Color,
    /// Explicit color from `set_rgb`.
    pub rgb: Color,
    /// Background color.
    pub background: Color,
    /// Current line width.
    pub linewidth: f64,
    /// Multiplier applied to `linewidth`.
    pub linewidth_factor: f64,
    /// Fill alpha override; `1.0` means no override.
    pub alpha: f64,
    /// Point marker radius.
    pub term_pointsize: f64,
    /// Text rotation in radians.
    pub text_angle: f32,
    /// Text justification code.
    pub justify: i32,
    /// Plot width in surface units.
    pub xsize: f32,
    /// Plot height in surface units.
    pub ysize: f32,
    /// Last pen position in engine units.
    pub last: (u32, u32),
    /// Dash length factor.
    pub dashlength: f64,
    /// Dash pattern.
    pub dashpattern: String,
    /// Terminal name.
    pub name: String,
    /// Hypertext for the next element.
    pub hypertext: String,
    /// Pattern fill colors.
    pub pattern_colors: [u32; 8],
    /// Line type.
    pub linetype: i32,
    /// Line cap style.
    pub linecap: i32,
    /// Fill pattern.
    pub fill_pattern: i32,
    /// Fill pattern index.
    pub fill_pattern_index: u32,
    /// Horizontal resolution in engine units.
    pub xmax: u32,
    /// Vertical resolution in engine units.
    pub ymax: u32,
    /// Horizontal tic length.
    pub h_tic: u32,
    /// Vertical tic length.
    pub v_tic: u32,
    /// Character width.
    pub h_char: u32,
    /// Character height.
    pub v_char: u32,
    /// Grid line style.
    pub gridline: u32,
    /// Whether a grid is drawn.
    pub hasgrid: u32,
    /// Index of the plot being drawn.
    pub plotno: u32,
    /// Whether a filled group is open.
    pub group_filled_is_open: bool,
    /// Whether text is being drawn inside a box.
    pub in_textbox: bool,
    /// Whether a group is open.
    pub group_is_open: bool,
    /// Whether a path is open.
    pub path_is_open: bool,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            pens: [Pen::default(); PEN_COUNT],
            pen_index: 0,
            font: Font::default(),
            fontscale: 1.0,
            color_mode: ColorMode::Default,
            color: Color::BLACK,
            line_color: Color::BLACK,
            rgb: Color::TRANSPARENT,
            background: Color::WHITE,
            linewidth: 2.0,
            linewidth_factor: 1.0,
            alpha: 1.0,
            term_pointsize: 1.0,
            text_angle: 0.0,
            justify: 0,
            xsize: 0.0,
            ysize: 0.0,
            last: (0, 0),
            dashlength: 2.0,
            dashpattern: String::new(),
            name: String::new(),
            hypertext: String::new(),
            pattern_colors: [0; 8],
            linetype: 0,
            linecap: 0,
            fill_pattern: 0,
            fill_pattern_index: 0,
            xmax: 0,
            ymax: 0,
            h_tic: 0,
            v_tic: 0,
            h_char: 0,
            v_char: 0,
            gridline: 0,
            hasgrid: 0,
            plotno: 0,
            group_filled_is_open: false,
            in_textbox: false,
            group_is_open: false,
            path_is_open: false,
        }
    }
}

impl StyleState {
    // -- coordinates -------------------------------------------------------

    /// Maps an engine x coordinate to the surface.
    #[must_use]
    pub fn x(&self, x: u32) -> f32 {
        engine_to_surface(x)
    }

    /// Maps an engine y coordinate to the surface, flipping the axis.
    #[must_use]
    pub fn y(&self, y: u32) -> f32 {
        self.ysize - engine_to_surface(y)
    }

    /// Maps an engine point to the surface.
    #[must_use]
    pub fn point(&self, x: u32, y: u32) -> [f32; 2] {
        [self.x(x), self.y(y)]
    }

    /// Maps a signed engine point, as used by polygon corners.
    #[must_use]
    pub fn corner(&self, [x, y]: [i32; 2]) -> [f32; 2] {
        [signed_to_surface(x), self.ysize - signed_to_surface(y)]
    }

    // -- resolved values ---------------------------------------------------

    /// Color for point markers and fills.
    #[must_use]
    pub fn fg_color(&self) -> Color {
        match self.color_mode {
            ColorMode::LineType => self.line_color,
            ColorMode::Rgb => self.color,
            _ => Color::BLACK,
        }
    }

    /// Color for strokes.
    #[must_use]
    pub fn stroke_color(&self) -> Color {
        match self.color_mode {
            ColorMode::LineType => self.line_color,
            ColorMode::Rgb => self.color,
            _ => self.current_pen().color,
        }
    }

    /// Color for text.
    #[must_use]
    pub fn font_color(&self) -> Color {
        self.stroke_color()
    }

    /// Color for a fill with the given packed style.
    ///
    /// The low nibble is the fill kind; only solid fills take the current
    /// color. The rest is a 0–99 density used as alpha unless an explicit
    /// alpha is set.
    #[must_use]
    pub fn fill_color(&self, style: i32) -> Color {
        let density = style >> 4;
        let kind = style & 0x0F;

        let mut c = self.fg_color();
        if (self.alpha - 1.0).abs() > f64::EPSILON {
            c = c.with_alpha_f64(self.alpha);
        } else if (0..100).contains(&density) {
            c = c.with_alpha_f64(f64::from(density) * 0.01);
        }

        if kind == FILL_SOLID { c } else { Color::BLACK }
    }

    /// Effective stroke width for segments and paths, at least `1.0`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "stroke widths are small"
    )]
    pub fn stroke_width(&self) -> f32 {
        (self.linewidth * self.linewidth_factor).max(1.0) as f32
    }

    /// Point marker radius.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "marker sizes are small"
    )]
    pub fn marker_size(&self) -> f32 {
        self.term_pointsize as f32
    }

    /// Effective font size, after scaling.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "font sizes are small and the cast saturates"
    )]
    pub fn font_size(&self) -> i32 {
        (self.font.size * self.fontscale) as i32
    }

    /// The pen selected by `pen_index`.
    #[must_use]
    pub fn current_pen(&self) -> &Pen {
        &self.pens[self.pen_index.min(PEN_COUNT - 1)]
    }

    // -- setters with parsing ---------------------------------------------

    /// Sets the plot width from engine units.
    pub fn set_xsize(&mut self, value: u32) {
        self.xsize = engine_to_surface(value);
    }

    /// Sets the plot height from engine units.
    pub fn set_ysize(&mut self, value: u32) {
        self.ysize = engine_to_surface(value);
    }

    /// Sets the text angle from degrees.
    pub fn set_text_angle(&mut self, degrees: f32) {
        self.text_angle = degrees.to_radians();
    }

    /// Sets the explicit color from `0xRRGGBB`.
    pub fn set_rgb(&mut self, rgb: u32) {
        self.rgb = Color::from_rgb24(rgb);
    }

    /// Sets the background from `0xRRGGBB`.
    pub fn set_background(&mut self, rgb: i32) {
        self.background = Color::from_rgb24(rgb.cast_unsigned());
    }

    /// Sets the line width factor. The engine's factor is halved.
    pub fn set_linewidth_factor(&mut self, factor: f64) {
        self.linewidth_factor = 0.5 * factor;
    }

    /// Defines a pen, or selects one when `index` is out of range.
    ///
    /// Out-of-range indices carry the pen to select in their upper bits
    /// (`index >> 8`); selections past the pen table are ignored.
    pub fn set_pen(&mut self, index: u32, color: u32, width: f64) {
        match self.pens.get_mut(index as usize) {
            Some(pen) => {
                pen.color = Color(color);
                pen.width = width;
            }
            None => {
                let selected = (index >> 8) as usize;
                if selected < PEN_COUNT {
                    self.pen_index = selected;
                }
            }
        }
    }

    /// Sets the font. A `"name,size"` name overrides `size` when the suffix
    /// is a positive integer.
    pub fn set_font(&mut self, name: Option<&str>, size: f64) {
        self.font.size = size;
        if let Some(name) = name {
            self.font.name = name.to_owned();
            if let Some((_, suffix)) = name.split_once(',')
                && let Ok(parsed) = suffix.trim().parse::<u32>()
                && parsed > 0
            {
                self.font.size = f64::from(parsed);
            }
        }
    }

    /// Sets the line color from `"r,g,b"` or a color name.
    ///
    /// Returns `false`, leaving the color unchanged, if `spec` is neither.
    pub fn set_linecolor(&mut self, spec: &str) -> bool {
        let parts: Vec<&str> = spec.split(',').filter(|s| !s.is_empty()).collect();
        let color = if let [r, g, b] = parts[..] {
            Some(Color::from_rgba8(
                channel(r),
                channel(g),
                channel(b),
                Color::BLACK.a(),
            ))
        } else {
            Color::named(spec)
        };
        match color {
            Some(c) => {
                self.line_color = c;
                true
            }
            None => false,
        }
    }
}

// Engine coordinates stay far below 2^24, so the f32 conversion is exact.
fn engine_to_surface(v: u32) -> f32 {
    v as f32 * ENGINE_SCALE
}

fn signed_to_surface(v: i32) -> f32 {
    v as f32 * ENGINE_SCALE
}

/// Parses one `"r,g,b"` channel, clamping to `0..=255`.
fn channel(s: &str) -> u8 {
    let v = s.trim().parse::<i64>().unwrap_or(0).clamp(0, 255);
    u8::try_from(v).unwrap_or(u8::MAX)
}
