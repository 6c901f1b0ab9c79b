//! The monochrome framebuffer the draw instructions render into.
use std::fmt;

use crate::definitions::display;

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. Every pixel is addressed with wraparound, so coordinates past the
/// edge continue on the opposite side.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pixels: Box<[[bool; display::WIDTH]; display::HEIGHT]>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: Box::new([[false; display::WIDTH]; display::HEIGHT]),
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will turn every pixel off.
    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(false);
        }
    }

    /// Will return the pixel, the coordinates wrap around.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y % display::HEIGHT][x % display::WIDTH]
    }

    /// Will xor the pixel with the sprite bit and return the previous state.
    pub fn xor_pixel(&mut self, x: usize, y: usize, bit: bool) -> bool {
        let pixel = &mut self.pixels[y % display::HEIGHT][x % display::WIDTH];
        let previous = *pixel;
        *pixel ^= bit;
        previous
    }

    /// The rows of the framebuffer from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.pixels.iter().map(|row| &row[..])
    }

    /// The amount of pixels currently on.
    pub fn count_on(&self) -> usize {
        self.rows().flatten().filter(|&&pixel| pixel).count()
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for &pixel in row {
                write!(f, "{}", if pixel { '#' } else { '.' })?;
            }
        }
        Ok(())
    }
}
