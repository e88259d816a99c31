use alloc::{vec, vec::Vec};
use core::ops::Index;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::BmpError;

/// Color channel of a [`Pixel`], numbered in BMP storage order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Channel {
    /// Blue channel, stored first.
    Blue = 0,
    /// Green channel.
    Green = 1,
    /// Red channel, stored last.
    Red = 2,
}

/// A 24 BPP pixel.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Pixel {
    /// Blue channel.
    pub blue: u8,
    /// Green channel.
    pub green: u8,
    /// Red channel.
    pub red: u8,
}

impl Pixel {
    /// Creates a new pixel from its channel values.
    pub const fn new(blue: u8, green: u8, red: u8) -> Self {
        Self { blue, green, red }
    }

    /// Creates a pixel from bytes in BMP storage order.
    pub const fn from_bgr(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Returns the channels in BMP storage order.
    pub const fn to_bgr(self) -> [u8; 3] {
        [self.blue, self.green, self.red]
    }
}

impl Index<Channel> for Pixel {
    type Output = u8;

    fn index(&self, channel: Channel) -> &u8 {
        match channel {
            Channel::Blue => &self.blue,
            Channel::Green => &self.green,
            Channel::Red => &self.red,
        }
    }
}

impl From<Pixel> for Rgb888 {
    fn from(pixel: Pixel) -> Self {
        Rgb888::new(pixel.red, pixel.green, pixel.blue)
    }
}

impl From<Rgb888> for Pixel {
    fn from(color: Rgb888) -> Self {
        Pixel::new(color.b(), color.g(), color.r())
    }
}

/// Decoded pixel array.
///
/// Row 0 is the bottom scanline of the image, matching the order rows are stored in a bottom-up
/// BMP file. Every row contains exactly [`width`](Self::width) pixels.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct PixelGrid {
    width: usize,
    rows: Vec<Vec<Pixel>>,
}

impl PixelGrid {
    /// Creates a grid of black pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![vec![Pixel::default(); width]; height],
        }
    }

    /// Creates a grid from rows listed bottom scanline first.
    ///
    /// Returns [`BmpError::GridMismatch`] if the rows don't all have the same length.
    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> Result<Self, BmpError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(BmpError::GridMismatch {
                expected: (width, rows.len()),
                actual: (row.len(), rows.len()),
            });
        }

        Ok(Self { width, rows })
    }

    pub(crate) fn from_rows_unchecked(width: usize, rows: Vec<Vec<Pixel>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == width));
        Self { width, rows }
    }

    /// Returns the number of pixels in each row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns the pixels in a row, counted from the bottom of the image.
    pub fn row(&self, row: usize) -> Option<&[Pixel]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Returns an iterator over the rows, bottom scanline first.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Pixel]> + ExactSizeIterator + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Returns a mutable iterator over the rows, bottom scanline first.
    pub fn rows_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = &mut [Pixel]> + ExactSizeIterator + '_ {
        self.rows.iter_mut().map(Vec::as_mut_slice)
    }

    /// Returns the pixel at `row` and `column`, with row 0 at the bottom of the image.
    pub fn get(&self, row: usize, column: usize) -> Option<Pixel> {
        self.rows.get(row)?.get(column).copied()
    }

    /// Returns a mutable reference to the pixel at `row` and `column`.
    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut Pixel> {
        self.rows.get_mut(row)?.get_mut(column)
    }
}
