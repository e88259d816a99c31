use embedded_graphics::{pixelcolor::Rgb888, prelude::Point, Pixel};

use crate::grid::PixelGrid;

/// Iterator over the pixels in a decoded image, as drawable [`embedded_graphics`] pixels.
///
/// Positions are relative to the top left corner of the image, so the last grid row is returned
/// first.
#[derive(Clone, Debug)]
pub struct Pixels<'a> {
    grid: &'a PixelGrid,
    x: usize,
    y: usize,
}

impl<'a> Pixels<'a> {
    pub(crate) fn new(grid: &'a PixelGrid) -> Self {
        Self { grid, x: 0, y: 0 }
    }
}

impl Iterator for Pixels<'_> {
    type Item = Pixel<Rgb888>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.grid.width() {
            self.x = 0;
            self.y += 1;
        }
        if self.y >= self.grid.height() {
            return None;
        }

        let row = self.grid.height() - 1 - self.y;
        let color = self.grid.get(row, self.x)?;
        let position = Point::new(self.x as i32, self.y as i32);
        self.x += 1;

        Some(Pixel(position, color.into()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.grid.width() * self.grid.height();
        let done = (self.y * self.grid.width() + self.x).min(total);
        (total - done, Some(total - done))
    }
}
