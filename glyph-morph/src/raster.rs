use font8x8::{BASIC_FONTS, GREEK_FONTS, LATIN_FONTS, UnicodeFonts};

/// Single-channel coverage image, row-major, one byte per pixel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlphaBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl AlphaBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Reshapes the buffer and clears it, keeping the allocation when it is large enough.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height, 0);
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Out-of-bounds reads are transparent.
    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }

        self.data[y * self.width + x]
    }

    /// Out-of-bounds writes are dropped.
    pub fn set(&mut self, x: usize, y: usize, alpha: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = alpha;
        }
    }
}

/// Draws text into an alpha buffer. Implementations must be deterministic.
pub trait TextRasterizer {
    /// Advance width of `text` at `font_px`, in buffer pixels.
    fn measure(&self, text: &str, font_px: f32) -> f32;

    /// Clears `buf` and draws `text` centred both horizontally and vertically.
    fn rasterize(&self, text: &str, font_px: f32, buf: &mut AlphaBuffer);
}

/// Monospaced 8×8 bitmap font covering ASCII, Latin-1 and Greek.
///
/// Glyphs are scaled with nearest-neighbour sampling; a character occupies a
/// `font_px × font_px` square. Characters outside the tables advance as blanks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

const GLYPH_CELLS: usize = 8;

impl BitmapFont {
    fn glyph(ch: char) -> Option<[u8; 8]> {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| GREEK_FONTS.get(ch))
    }
}

impl TextRasterizer for BitmapFont {
    fn measure(&self, text: &str, font_px: f32) -> f32 {
        text.chars().count() as f32 * font_px.max(0.0)
    }

    fn rasterize(&self, text: &str, font_px: f32, buf: &mut AlphaBuffer) {
        buf.clear();

        if font_px <= 0.0 || text.is_empty() {
            return;
        }

        let glyphs: Vec<Option<[u8; 8]>> = text.chars().map(Self::glyph).collect();
        let text_w = self.measure(text, font_px);
        let origin_x = (buf.width() as f32 - text_w) / 2.0;
        let origin_y = (buf.height() as f32 - font_px) / 2.0;
        let cell = font_px / GLYPH_CELLS as f32;

        let x_start = origin_x.max(0.0).floor() as usize;
        let x_end = ((origin_x + text_w).ceil().max(0.0) as usize).min(buf.width());
        let y_start = origin_y.max(0.0).floor() as usize;
        let y_end = ((origin_y + font_px).ceil().max(0.0) as usize).min(buf.height());

        for y in y_start..y_end {
            let local_y = y as f32 + 0.5 - origin_y;

            if local_y < 0.0 || local_y >= font_px {
                continue;
            }

            let row = ((local_y / cell) as usize).min(GLYPH_CELLS - 1);

            for x in x_start..x_end {
                let local_x = x as f32 + 0.5 - origin_x;

                if local_x < 0.0 || local_x >= text_w {
                    continue;
                }

                let index = (local_x / font_px) as usize;
                let Some(Some(bits)) = glyphs.get(index) else {
                    continue;
                };

                let within = local_x - index as f32 * font_px;
                let col = ((within / cell) as usize).min(GLYPH_CELLS - 1);

                // Bit 0 is the leftmost column.
                if bits[row] & (1 << col) != 0 {
                    buf.set(x, y, u8::MAX);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inked(buf: &AlphaBuffer) -> usize {
        (0..buf.height())
            .flat_map(|y| (0..buf.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| buf.alpha(x, y) > 0)
            .count()
    }

    #[test]
    fn measure_scales_with_length() {
        assert_eq!(BitmapFont.measure("", 16.0), 0.0);
        assert_eq!(BitmapFont.measure("ab", 16.0), 32.0);
        assert_eq!(BitmapFont.measure("αβγ", 10.0), 30.0);
    }

    #[test]
    fn blank_text_leaves_buffer_clear() {
        let mut buf = AlphaBuffer::new(64, 32);
        buf.set(3, 3, 255);

        BitmapFont.rasterize("   ", 16.0, &mut buf);

        assert_eq!(inked(&buf), 0);
    }

    #[test]
    fn glyph_is_centred() {
        let mut buf = AlphaBuffer::new(80, 80);
        BitmapFont.rasterize("I", 40.0, &mut buf);

        assert!(inked(&buf) > 0);

        for y in 0..80 {
            for x in 0..80 {
                if buf.alpha(x, y) > 0 {
                    assert!((20..60).contains(&x), "pixel at x={x} outside glyph cell");
                    assert!((20..60).contains(&y), "pixel at y={y} outside glyph cell");
                }
            }
        }
    }

    #[test]
    fn oversized_text_is_clipped() {
        let mut buf = AlphaBuffer::new(20, 10);
        BitmapFont.rasterize("WWWWWWWW", 16.0, &mut buf);

        assert!(inked(&buf) > 0);
        assert_eq!(buf.alpha(20, 0), 0);
    }

    #[test]
    fn resize_clears_previous_content() {
        let mut buf = AlphaBuffer::new(8, 8);
        buf.set(1, 1, 200);
        buf.resize(4, 4);

        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 4);
        assert_eq!(buf.alpha(1, 1), 0);
    }
}
