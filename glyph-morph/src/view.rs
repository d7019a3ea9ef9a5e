use std::time::Duration;

use glam::{Mat3, Vec2, Vec3};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::Widget;
use ratatui::widgets::canvas::{Canvas, Points};

use crate::engine::{MorphEngine, Particle};
use crate::oklch::Oklch;
use crate::sequencer::Bounds;

pub const PRIMARY: u32 = 0x2563eb;
pub const ACCENT: u32 = 0xf43f5e;

const NEAR: f32 = 1e-3;

/// World extent covered by `area` when drawn with braille dots, one unit per dot.
pub fn canvas_extent(area: Rect) -> Bounds {
    Bounds::new(area.width as f32 * 2.0, area.height as f32 * 4.0)
}

/// Perspective camera on the +z axis looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Radians per second of continuous rotation about y.
    pub yaw_rate: f32,
}

impl Camera {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            yaw: 0.0,
            pitch: 0.0,
            yaw_rate: 0.0108,
        }
    }

    /// Slow turn about y with a gentle nod about x.
    pub fn orbit(&mut self, now: Duration) {
        let t = now.as_secs_f32();
        self.yaw = t * self.yaw_rate;
        self.pitch = (t * 0.12).sin() * 0.08;
    }

    /// `None` for points at or behind the camera plane.
    pub fn project(&self, p: Vec3) -> Option<Vec2> {
        let rotated = Mat3::from_rotation_x(self.pitch) * Mat3::from_rotation_y(self.yaw) * p;
        let depth = self.distance - rotated.z;

        if depth <= NEAR {
            return None;
        }

        Some(rotated.truncate() * (self.distance / depth))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// `levels` hues spread evenly over `spread` turns around `base`.
    pub fn jittered(base: u32, levels: u8, spread: f32) -> Self {
        let base = Oklch::from_hex(base);
        let levels = levels.max(1);
        let colors = (0..levels)
            .map(|i| {
                let offset = if levels == 1 {
                    0.0
                } else {
                    spread * (i as f32 / (levels - 1) as f32 - 0.5)
                };
                base.shift_hue(offset).to_color()
            })
            .collect();

        Self { colors }
    }

    pub fn gradient(from: u32, to: u32, levels: u8) -> Self {
        let from = Oklch::from_hex(from);
        let to = Oklch::from_hex(to);
        let levels = levels.max(1);
        let colors = (0..levels)
            .map(|i| {
                let t = if levels == 1 {
                    0.0
                } else {
                    i as f32 / (levels - 1) as f32
                };
                from.lerp(to, t).to_color()
            })
            .collect();

        Self { colors }
    }

    pub fn color(&self, tint: u8) -> Color {
        self.colors[tint as usize % self.colors.len()]
    }

    pub(crate) fn len(&self) -> usize {
        self.colors.len()
    }
}

/// Draws the engine's current positions as braille dots, one colour per tint.
pub struct ParticleView<'a> {
    positions: &'a [Vec3],
    particles: &'a [Particle],
    palette: &'a Palette,
    camera: Camera,
}

impl<'a> ParticleView<'a> {
    pub fn new<G>(engine: &'a MorphEngine<G>, palette: &'a Palette, camera: Camera) -> Self {
        Self {
            positions: engine.positions(),
            particles: engine.particles(),
            palette,
            camera,
        }
    }
}

impl Widget for ParticleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let extent = canvas_extent(area);
        let half_w = f64::from(extent.width) / 2.0;
        let half_h = f64::from(extent.height) / 2.0;

        let mut buckets: Vec<Vec<(f64, f64)>> = vec![Vec::new(); self.palette.len()];

        for (pos, particle) in self.positions.iter().zip(self.particles) {
            if let Some(p) = self.camera.project(*pos) {
                let bucket = particle.tint as usize % buckets.len();
                buckets[bucket].push((f64::from(p.x), f64::from(p.y)));
            }
        }

        let palette = self.palette;

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-half_w, half_w])
            .y_bounds([-half_h, half_h])
            .paint(|ctx| {
                for (tint, coords) in buckets.iter().enumerate() {
                    ctx.draw(&Points {
                        coords,
                        color: palette.color(tint as u8),
                    });
                }
            })
            .render(area, buf);
    }
}
