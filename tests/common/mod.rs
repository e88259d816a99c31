#![allow(dead_code)]

use bmpparser::Pixel;

/// Builds 24 BPP BMP files in memory.
pub struct BmpBuilder {
    width: i32,
    height: i32,
    dib_header_size: u32,
    gap: Vec<u8>,
    bpp: u16,
    compression: u32,
    signature: [u8; 2],
    file_size: Option<u32>,
    pad_byte: u8,
}

impl BmpBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            dib_header_size: 40,
            gap: Vec::new(),
            bpp: 24,
            compression: 0,
            signature: *b"BM",
            file_size: None,
            pad_byte: 0,
        }
    }

    pub fn dib_header_size(mut self, size: u32) -> Self {
        self.dib_header_size = size;
        self
    }

    pub fn gap(mut self, gap: &[u8]) -> Self {
        self.gap = gap.to_vec();
        self
    }

    pub fn bpp(mut self, bpp: u16) -> Self {
        self.bpp = bpp;
        self
    }

    pub fn compression(mut self, compression: u32) -> Self {
        self.compression = compression;
        self
    }

    pub fn signature(mut self, signature: [u8; 2]) -> Self {
        self.signature = signature;
        self
    }

    pub fn file_size(mut self, file_size: u32) -> Self {
        self.file_size = Some(file_size);
        self
    }

    pub fn pad_byte(mut self, pad_byte: u8) -> Self {
        self.pad_byte = pad_byte;
        self
    }

    pub fn stride(&self) -> usize {
        (self.width.unsigned_abs() as usize * 3 + 3) & !3
    }

    /// Returns the file with every pixel set by `pixel(file_row, column)`.
    pub fn build_with(&self, pixel: impl Fn(usize, usize) -> Pixel) -> Vec<u8> {
        let width = self.width.unsigned_abs() as usize;
        let rows = self.height.unsigned_abs() as usize;
        let header_size = 14 + self.dib_header_size as usize;
        let offset = header_size + self.gap.len();
        let stride = self.stride();

        let mut data = vec![0u8; header_size];
        data[0..2].copy_from_slice(&self.signature);
        let file_size = self
            .file_size
            .unwrap_or((offset + stride * rows) as u32);
        data[2..6].copy_from_slice(&file_size.to_le_bytes());
        data[10..14].copy_from_slice(&(offset as u32).to_le_bytes());
        data[14..18].copy_from_slice(&self.dib_header_size.to_le_bytes());
        if self.dib_header_size >= 40 {
            data[18..22].copy_from_slice(&self.width.to_le_bytes());
            data[22..26].copy_from_slice(&self.height.to_le_bytes());
            data[26..28].copy_from_slice(&1u16.to_le_bytes());
            data[28..30].copy_from_slice(&self.bpp.to_le_bytes());
            data[30..34].copy_from_slice(&self.compression.to_le_bytes());
            data[34..38].copy_from_slice(&((stride * rows) as u32).to_le_bytes());
            data[38..42].copy_from_slice(&2835u32.to_le_bytes());
            data[42..46].copy_from_slice(&2835u32.to_le_bytes());
        }
        data.extend_from_slice(&self.gap);

        for row in 0..rows {
            for column in 0..width {
                data.extend_from_slice(&pixel(row, column).to_bgr());
            }
            data.extend(std::iter::repeat(self.pad_byte).take(stride - width * 3));
        }

        data
    }

    /// Returns the file with a deterministic gradient.
    pub fn build(&self) -> Vec<u8> {
        self.build_with(gradient)
    }
}

pub fn gradient(row: usize, column: usize) -> Pixel {
    Pixel::new(
        (row * 16 + column) as u8,
        (column * 7) as u8,
        (row * 31) as u8,
    )
}
