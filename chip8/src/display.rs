//! Monochrome display buffer.
use std::fmt::{self, Write};

use crate::constants::*;

/// Read-only view of the display, one `bool` per pixel in row-major order.
pub type Chip8DisplayBuffer<'a> = &'a [bool; DISPLAY_BUFFER_SIZE];

/// Outcome of drawing a sprite.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawResult {
    /// At least one pixel was toggled.
    pub changed: bool,
    /// At least one pixel was switched from on to off.
    pub collision: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pixels: Box<[bool; DISPLAY_BUFFER_SIZE]>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            pixels: Box::new([false; DISPLAY_BUFFER_SIZE]),
        }
    }
}

impl Display {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    pub fn buffer(&self) -> Chip8DisplayBuffer<'_> {
        &self.pixels
    }

    #[inline(always)]
    pub fn index(x: usize, y: usize) -> usize {
        (x & DISPLAY_WIDTH_MASK) + (y & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)]
    }

    /// Switch all pixels off.
    ///
    /// Returns whether any pixel was on before clearing.
    pub fn clear(&mut self) -> bool {
        let was_lit = self.pixels.iter().any(|px| *px);
        self.pixels.fill(false);
        was_lit
    }

    /// XOR a sprite into the buffer with its top-left corner at `(x, y)`.
    ///
    /// Each byte of `rows` is one 8 pixel wide row, most significant bit on the left.
    /// Coordinates that fall outside of the display wrap around to the other side.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: impl IntoIterator<Item = u8>) -> DrawResult {
        let mut result = DrawResult::default();

        for (r, row) in rows.into_iter().enumerate() {
            for c in 0..SPRITE_WIDTH {
                let new_px = (row >> (7 - c)) & 1 != 0;
                if !new_px {
                    continue;
                }

                let d = Self::index(x + c, y + r);
                let old_px = self.pixels[d];

                // XOR erases a pixel when both the old and new values are both 1.
                result.collision |= old_px;
                result.changed = true;

                self.pixels[d] = !old_px;
            }
        }

        result
    }

    /// Render the buffer as text, `#` for lit pixels and `.` for dark ones.
    pub fn dump(&self) -> Result<String, fmt::Error> {
        let mut buf = String::with_capacity((DISPLAY_WIDTH + 1) * DISPLAY_HEIGHT);

        for row in self.pixels.chunks(DISPLAY_WIDTH) {
            for px in row {
                buf.write_char(if *px { '#' } else { '.' })?;
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}
