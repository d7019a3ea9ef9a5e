//! Oklch colour maths for particle palettes.
//!
//! Hue offsets and gradients are computed in Oklch so tints that differ only
//! in hue keep the same perceived brightness.

use std::f32::consts::{PI, TAU};

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklch {
    pub l: f32,
    pub c: f32,
    /// Radians.
    pub h: f32,
}

impl Oklch {
    pub fn from_srgb(r: u8, g: u8, b: u8) -> Self {
        let [r, g, b] = [r, g, b].map(|v| srgb_to_linear(v as f32 / 255.0));

        let l = (0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b).cbrt();
        let m = (0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b).cbrt();
        let s = (0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b).cbrt();

        let lab_l = 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s;
        let lab_a = 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s;
        let lab_b = 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s;

        let c = lab_a.hypot(lab_b);
        let h = if c < 1e-8 { 0.0 } else { lab_b.atan2(lab_a) };

        Self { l: lab_l, c, h }
    }

    /// Out-of-gamut results are clipped per channel.
    pub fn to_srgb(self) -> (u8, u8, u8) {
        let a = self.c * self.h.cos();
        let b = self.c * self.h.sin();

        let l = (self.l + 0.3963377774 * a + 0.2158037573 * b).powi(3);
        let m = (self.l - 0.1055613458 * a - 0.0638541728 * b).powi(3);
        let s = (self.l - 0.0894841775 * a - 1.2914855480 * b).powi(3);

        let r = 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s;
        let g = -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s;
        let b = -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s;

        let to_u8 = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0 + 0.5) as u8;

        (to_u8(r), to_u8(g), to_u8(b))
    }

    pub fn from_hex(rgb: u32) -> Self {
        Self::from_srgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub fn to_color(self) -> Color {
        let (r, g, b) = self.to_srgb();
        Color::Rgb(r, g, b)
    }

    /// Rotates hue by `turns` of a full circle.
    pub fn shift_hue(self, turns: f32) -> Self {
        Self {
            h: (self.h + turns * TAU).rem_euclid(TAU),
            ..self
        }
    }

    /// Hue interpolates via shortest arc.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let mut dh = other.h - self.h;

        if dh > PI {
            dh -= TAU;
        } else if dh < -PI {
            dh += TAU;
        }

        Self {
            l: self.l + (other.l - self.l) * t,
            c: self.c + (other.c - self.c) * t,
            h: self.h + dh * t,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
