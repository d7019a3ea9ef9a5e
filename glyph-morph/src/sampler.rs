use glam::Vec2;
use log::trace;

use crate::config::SamplerConfig;
use crate::raster::{AlphaBuffer, TextRasterizer};

/// Turns text into a cloud of 2D points covering its rendered glyphs.
///
/// Points are expressed in box units with the origin at the box centre and
/// y pointing up. The offscreen buffer is reused between calls.
pub struct GlyphSampler<R> {
    rasterizer: R,
    config: SamplerConfig,
    buffer: AlphaBuffer,
}

impl<R: TextRasterizer> GlyphSampler<R> {
    pub fn new(rasterizer: R) -> Self {
        Self::with_config(rasterizer, SamplerConfig::default())
    }

    pub fn with_config(rasterizer: R, config: SamplerConfig) -> Self {
        Self {
            rasterizer,
            config,
            buffer: AlphaBuffer::default(),
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Samples `text` fitted into a `box_w × box_h` box.
    ///
    /// Returns an empty set when the text has no opaque pixels.
    pub fn sample(&mut self, text: &str, box_w: f32, box_h: f32, desired: usize) -> Vec<Vec2> {
        let box_w = clamp_extent(box_w);
        let box_h = clamp_extent(box_h);

        if text.trim().is_empty() {
            return Vec::new();
        }

        let scale = self.config.supersample.max(1) as f32;
        let buf_w = ((box_w * scale).floor() as usize).max(2);
        let buf_h = ((box_h * scale).floor() as usize).max(2);
        self.buffer.resize(buf_w, buf_h);

        let font_px = self.fit_font(text, box_w, box_h, scale);
        self.rasterizer.rasterize(text, font_px, &mut self.buffer);

        let mut stride = self.initial_stride(desired);

        loop {
            let points = self.collect(stride, box_w, box_h);

            trace!(
                "sampled {text:?} at stride {stride}: {} points (font {font_px:.1}px)",
                points.len()
            );

            if points.len() >= self.config.min_points || stride == 1 {
                return points;
            }

            stride -= 1;
        }
    }

    fn fit_font(&self, text: &str, box_w: f32, box_h: f32, scale: f32) -> f32 {
        let base = (box_h * self.config.fill * scale).floor().max(1.0);
        let max_w = box_w * scale - self.config.padding * scale * 2.0;
        let width = self.rasterizer.measure(text, base);

        if width > max_w {
            let shrunk = (base * (max_w / width)).floor();
            shrunk.max(self.config.min_font_px)
        } else {
            base
        }
    }

    fn initial_stride(&self, desired: usize) -> usize {
        let area = (self.buffer.width() * self.buffer.height()) as f32;
        let cells = desired.max(1) as f32 * self.config.oversample.max(f32::EPSILON);
        let per_point = (area / cells).floor().max(1.0);

        (per_point.sqrt().floor() as usize).max(1)
    }

    fn collect(&self, stride: usize, box_w: f32, box_h: f32) -> Vec<Vec2> {
        let width = self.buffer.width();
        let height = self.buffer.height();
        let span_x = box_w * self.config.world_scale;
        let span_y = box_h * self.config.world_scale;
        let mut points = Vec::new();

        for y in (0..height).step_by(stride) {
            for x in (0..width).step_by(stride) {
                if self.buffer.alpha(x, y) <= self.config.alpha_threshold {
                    continue;
                }

                let nx = x as f32 / width as f32 - 0.5;
                let ny = y as f32 / height as f32 - 0.5;
                points.push(Vec2::new(nx * span_x, -ny * span_y));
            }
        }

        points
    }
}

fn clamp_extent(v: f32) -> f32 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}
