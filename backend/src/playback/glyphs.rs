//! Bitmap text for RGB24 frame buffers
//!
//! A 3×5 pixel font, scaled by an integer factor. Lowercase letters render as
//! uppercase; characters without a glyph render as a hollow box. This keeps
//! frame rendering independent of system fonts.

use crate::render::palette::Rgb;

const GLYPH_WIDTH: usize = 3;
const GLYPH_HEIGHT: usize = 5;

/// Horizontal advance of one character at scale 1
const ADVANCE: usize = GLYPH_WIDTH + 1;

const fn glyph(ch: char) -> [u8; GLYPH_HEIGHT] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b110, 0b001, 0b010, 0b000, 0b010],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b111, 0b101, 0b101, 0b101, 0b111],
    }
}

/// Pixel width of `text` drawn at `scale`
pub fn text_width(text: &str, scale: usize) -> usize {
    let chars = text.chars().count();
    if chars == 0 {
        return 0;
    }
    (chars * ADVANCE - 1) * scale
}

/// Pixel height of one line of text at `scale`
pub fn text_height(scale: usize) -> usize {
    GLYPH_HEIGHT * scale
}

/// Mutable view over a packed RGB24 buffer
pub struct GlyphCanvas<'a> {
    buffer: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> GlyphCanvas<'a> {
    /// Wrap `buffer`, which must hold `width * height * 3` bytes
    pub fn new(buffer: &'a mut [u8], width: usize, height: usize) -> Self {
        debug_assert_eq!(buffer.len(), width * height * 3);
        Self {
            buffer,
            width,
            height,
        }
    }

    /// Blend `color` over the pixel at (`x`, `y`); out-of-bounds is a no-op
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Rgb, alpha: f64) {
        if x >= self.width || y >= self.height || alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let idx = (y * self.width + x) * 3;
        for (offset, channel) in [color.0, color.1, color.2].into_iter().enumerate() {
            let dst = self.buffer[idx + offset] as f64;
            let mixed = dst + (channel as f64 - dst) * alpha;
            self.buffer[idx + offset] = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Fill an axis-aligned rectangle
    pub fn fill_rect(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        color: Rgb,
        alpha: f64,
    ) {
        let x1 = (x + width).min(self.width);
        let y1 = (y + height).min(self.height);
        for py in y..y1 {
            for px in x..x1 {
                self.blend_pixel(px, py, color, alpha);
            }
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`)
    ///
    /// Characters that would start past the right edge are dropped.
    pub fn draw_text(
        &mut self,
        x: usize,
        y: usize,
        text: &str,
        scale: usize,
        color: Rgb,
        alpha: f64,
    ) {
        if alpha <= 0.0 || scale == 0 {
            return;
        }
        let mut cursor = x;
        for ch in text.chars() {
            if cursor >= self.width {
                break;
            }
            self.draw_char(cursor, y, ch.to_ascii_uppercase(), scale, color, alpha);
            cursor += ADVANCE * scale;
        }
    }

    /// Draw `text` horizontally centred on `center_x`
    pub fn draw_text_centered(
        &mut self,
        center_x: i64,
        y: i64,
        text: &str,
        scale: usize,
        color: Rgb,
        alpha: f64,
    ) {
        let left = center_x - (text_width(text, scale) / 2) as i64;
        if left < 0 || y < 0 {
            return;
        }
        self.draw_text(left as usize, y as usize, text, scale, color, alpha);
    }

    fn draw_char(&mut self, x: usize, y: usize, ch: char, scale: usize, color: Rgb, alpha: f64) {
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                    self.fill_rect(x + col * scale, y + row * scale, scale, scale, color, alpha);
                }
            }
        }
    }
}
