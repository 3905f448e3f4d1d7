// Copyright 2026 the Plotwire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed RGBA colors.

use core::fmt;

/// An 8-bit-per-channel color packed as `0xRRGGBBAA`.
///
/// This is the representation the engine hands over and the one stored in
/// [`DrawCommand`](crate::command::DrawCommand) payloads.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08x})", self.0)
    }
}

impl Color {
    /// Opaque black, the engine's default drawing color.
    pub const BLACK: Self = Self(0x0000_00FF);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);

    /// Builds a color from individual channels.
    #[must_use]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    /// Builds an opaque color from a `0xRRGGBB` value.
    ///
    /// The top byte is discarded.
    #[must_use]
    pub const fn from_rgb24(rgb: u32) -> Self {
        Self((rgb << 8) | 0xFF)
    }

    /// Red channel.
    #[must_use]
    pub const fn r(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Green channel.
    #[must_use]
    pub const fn g(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    /// Blue channel.
    #[must_use]
    pub const fn b(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    /// Alpha channel.
    #[must_use]
    pub const fn a(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    /// Returns the same color with the alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    /// Returns the same color with alpha set from a `0.0..=1.0` fraction.
    ///
    /// Out-of-range values are clamped.
    #[must_use]
    pub fn with_alpha_f64(self, alpha: f64) -> Self {
        let scaled = (alpha.clamp(0.0, 1.0) * 255.0).round();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "value is clamped to 0..=255 above"
        )]
        let a = scaled as u8;
        self.with_alpha(a)
    }

    /// Looks up one of the basic named colors, case-insensitively.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        let rgb = match name.trim().to_ascii_lowercase().as_str() {
            "black" => 0x00_0000,
            "white" => 0xFF_FFFF,
            "red" => 0xFF_0000,
            "green" => 0x00_FF00,
            "blue" => 0x00_00FF,
            "yellow" => 0xFF_FF00,
            "cyan" => 0x00_FFFF,
            "magenta" => 0xFF_00FF,
            "gray" | "grey" => 0x80_8080,
            "orange" => 0xFF_A500,
            "purple" => 0x80_0080,
            "brown" => 0xA5_2A2A,
            _ => return None,
        };
        Some(Self::from_rgb24(rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels() {
        let c = Color::from_rgba8(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x1234_5678);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x12, 0x34, 0x56, 0x78));
    }

    #[test]
    fn rgb24_is_opaque() {
        assert_eq!(Color::from_rgb24(0xAB_CDEF), Color(0xABCD_EFFF));
        assert_eq!(Color::from_rgb24(0xFF00_0000), Color(0x0000_00FF));
    }

    #[test]
    fn alpha_fraction() {
        assert_eq!(Color::BLACK.with_alpha_f64(0.0), Color(0));
        assert_eq!(Color::BLACK.with_alpha_f64(2.0), Color::BLACK);
        assert_eq!(Color::WHITE.with_alpha_f64(0.5).a(), 128);
    }

    #[test]
    fn named_colors() {
        assert_eq!(Color::named("Red"), Some(Color(0xFF00_00FF)));
        assert_eq!(Color::named(" grey "), Some(Color(0x8080_80FF)));
        assert_eq!(Color::named("chartreuse-ish"), None);
    }
}
