//! A BMP decoder and encoder for uncompressed 24 bit images.
//!
//! `bmpparser` reads the pixel array of a BMP file from any seekable byte stream into a
//! [`PixelGrid`] and writes a grid back behind the original header bytes. Only files with a
//! `BITMAPINFOHEADER` (or a later, larger DIB header), 24 bits per pixel and no compression are
//! supported. Everything else is rejected with [`BmpError::UnsupportedFormat`] instead of being
//! decoded incorrectly.
//!
//! # Examples
//!
//! ## Decoding and re-encoding an image
//!
//! The [`Bmp`] struct keeps the parsed header, the raw header bytes and the decoded pixels
//! together, so a modified image can be written out again.
//!
//! ```rust
//! use bmpparser::{Bmp, Channel, Pixel};
//! # fn bmp_bytes() -> Vec<u8> {
//! #     let mut data = vec![0u8; 54];
//! #     data[0..2].copy_from_slice(b"BM");
//! #     data[10..14].copy_from_slice(&54u32.to_le_bytes());
//! #     data[14..18].copy_from_slice(&40u32.to_le_bytes());
//! #     data[18..22].copy_from_slice(&2i32.to_le_bytes());
//! #     data[22..26].copy_from_slice(&1i32.to_le_bytes());
//! #     data[28..30].copy_from_slice(&24u16.to_le_bytes());
//! #     data.extend_from_slice(&[0, 0, 255, 0, 255, 0, 0, 0]);
//! #     data
//! # }
//!
//! let data = bmp_bytes();
//! let mut bmp = Bmp::from_slice(&data)?;
//!
//! assert_eq!(bmp.header().width, 2);
//! assert_eq!(bmp.pixels().get(0, 0).unwrap()[Channel::Red], 255);
//!
//! *bmp.pixels_mut().get_mut(0, 1).unwrap() = Pixel::new(255, 0, 0);
//! let encoded = bmp.to_vec()?;
//! assert_eq!(encoded.len(), data.len());
//! # Ok::<(), bmpparser::BmpError>(())
//! ```
//!
//! ## Working with streams
//!
//! The lower level functions in [`header`], [`decode`] and [`encode`] work directly on a
//! [`BmpReader`], which is implemented for every type that implements `Read` and `Seek`.
//!
//! ```rust
//! use bmpparser::{decode::load_pixel_array, header::{total_header_size, HeaderField}};
//! use std::io::Cursor;
//! # let mut data = vec![0u8; 62];
//! # data[0..2].copy_from_slice(b"BM");
//! # data[10..14].copy_from_slice(&54u32.to_le_bytes());
//! # data[14..18].copy_from_slice(&40u32.to_le_bytes());
//! # data[18..22].copy_from_slice(&2i32.to_le_bytes());
//! # data[22..26].copy_from_slice(&1i32.to_le_bytes());
//! # data[28..30].copy_from_slice(&24u16.to_le_bytes());
//!
//! let mut reader = Cursor::new(&data[..]);
//! assert_eq!(HeaderField::Width.read(&mut reader)?, 2);
//! assert_eq!(total_header_size(&mut reader)?, 54);
//!
//! let grid = load_pixel_array(&mut reader)?;
//! assert_eq!((grid.width(), grid.height()), (2, 1));
//! # Ok::<(), bmpparser::BmpError>(())
//! ```
//!
//! ## Drawing an image
//!
//! [`Bmp`] implements [`ImageDrawable`], so a decoded image can be drawn to any
//! [`embedded-graphics`] draw target that uses [`Rgb888`] colors.
//!
//! [`embedded-graphics`]: https://crates.io/crates/embedded-graphics
//! [`ImageDrawable`]: embedded_graphics::image::ImageDrawable
//! [`Rgb888`]: embedded_graphics::pixelcolor::Rgb888

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use core2::io::{Cursor, ErrorKind, Write};
use embedded_graphics::{pixelcolor::Rgb888, prelude::*, primitives::Rectangle};

pub mod decode;
pub mod encode;
mod grid;
pub mod header;
mod pixels;
pub mod reader;

pub use crate::{
    grid::{Channel, Pixel, PixelGrid},
    header::{CompressionMethod, Header, HeaderField, RowOrder},
    pixels::Pixels,
    reader::BmpReader,
};

/// A decoded 24 BPP BMP image.
///
/// Besides the pixels, the bytes in front of the pixel array are kept verbatim so that the image
/// can be encoded again with exactly the same header.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Bmp {
    header: Header,
    header_prefix: Vec<u8>,
    pixels: PixelGrid,
}

impl Bmp {
    /// Decodes a BMP image from a reader.
    pub fn from_reader<R>(reader: &mut R) -> Result<Self, BmpError>
    where
        R: BmpReader + ?Sized,
    {
        let header = Header::read(reader)?;
        let header_prefix = encode::read_block(reader, u64::from(header.image_data_start))?;
        let pixels = decode::load_pixel_array_with_header(reader, &header)?;

        Ok(Self {
            header,
            header_prefix,
            pixels,
        })
    }

    /// Decodes a BMP image from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BmpError> {
        Self::from_reader(&mut Cursor::new(bytes))
    }

    /// Opens and decodes the BMP file at `path`.
    #[cfg(feature = "std")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, BmpError> {
        let mut file = std::fs::File::open(path).map_err(|e| BmpError::Read {
            target: ReadTarget::File,
            kind: e.kind(),
        })?;
        Self::from_reader(&mut file)
    }

    /// Returns a reference to the BMP header.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the bytes in front of the pixel array, as read from the source.
    ///
    /// This is the file header and DIB header, followed by any bytes between the DIB header and
    /// the pixel array.
    pub fn header_prefix(&self) -> &[u8] {
        &self.header_prefix
    }

    /// Returns the decoded pixels.
    pub const fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    /// Returns the decoded pixels for modification.
    pub fn pixels_mut(&mut self) -> &mut PixelGrid {
        &mut self.pixels
    }

    /// Consumes the image and returns the decoded pixels.
    pub fn into_pixels(self) -> PixelGrid {
        self.pixels
    }

    /// Returns an iterator over the pixels, starting at the top left corner.
    pub fn draw_pixels(&self) -> Pixels<'_> {
        Pixels::new(&self.pixels)
    }

    /// Encodes the image, reusing the original header bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, BmpError> {
        encode::encode_with_prefix(&self.header, &self.header_prefix, &self.pixels)
    }

    /// Encodes the image and writes it to `writer`.
    pub fn write_to<W>(&self, writer: &mut W) -> Result<(), BmpError>
    where
        W: Write + ?Sized,
    {
        let data = self.to_vec()?;
        encode::write_all(writer, &data)
    }

    /// Encodes the image and writes it to a new file at `path`.
    ///
    /// The partially written file is removed if writing fails.
    #[cfg(feature = "std")]
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), BmpError> {
        let data = self.to_vec()?;
        encode::write_file(path.as_ref(), &data)
    }
}

impl ImageDrawable for Bmp {
    type Color = Rgb888;

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        target.draw_iter(self.draw_pixels())
    }

    fn draw_sub_image<D>(&self, target: &mut D, area: &Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        self.draw(&mut target.translated(-area.top_left).clipped(area))
    }
}

impl OriginDimensions for Bmp {
    fn size(&self) -> Size {
        Size::new(self.header.width, self.header.height)
    }
}

/// Error returned when reading, validating or writing a BMP file fails.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BmpError {
    /// Reading from the source failed, usually because it ended early.
    #[error("failed to read {target}: {kind:?}")]
    Read {
        /// The part of the file that couldn't be read.
        target: ReadTarget,
        /// Kind of the underlying I/O error.
        kind: ErrorKind,
    },

    /// Writing the encoded image failed.
    #[error("failed to write BMP data: {kind:?}")]
    Write {
        /// Kind of the underlying I/O error.
        kind: ErrorKind,
    },

    /// The file isn't a BMP file this crate can decode.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(#[from] UnsupportedFormat),

    /// The pixel grid doesn't have the dimensions required by the header.
    #[error(
        "pixel grid is {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    GridMismatch {
        /// Expected width and height.
        expected: (usize, usize),
        /// Actual width and height.
        actual: (usize, usize),
    },
}

/// Part of a BMP file that failed to read.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ReadTarget {
    /// A header field.
    Field(HeaderField),
    /// An inclusive range of bytes.
    Bytes {
        /// First byte.
        start: u64,
        /// Last byte.
        end: u64,
    },
    /// The header bytes in front of the pixel array.
    HeaderBlock,
    /// A row of the pixel array, counted in file order.
    Row(usize),
    /// The length of the stream.
    StreamLength,
    /// The file itself, which couldn't be opened.
    File,
}

impl fmt::Display for ReadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadTarget::Field(field) => write!(f, "{}", field),
            ReadTarget::Bytes { start, end } => write!(f, "bytes {}..={}", start, end),
            ReadTarget::HeaderBlock => f.write_str("header block"),
            ReadTarget::Row(row) => write!(f, "pixel row {}", row),
            ReadTarget::StreamLength => f.write_str("stream length"),
            ReadTarget::File => f.write_str("file"),
        }
    }
}

/// Reason a BMP file was rejected.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UnsupportedFormat {
    /// BMP files must start with `BM`.
    #[error("invalid file signature {0:?}")]
    InvalidSignature([u8; 2]),

    /// The DIB header is smaller than a `BITMAPINFOHEADER`.
    #[error("unsupported DIB header length {0}")]
    UnsupportedHeaderLength(u32),

    /// The pixel array is compressed.
    #[error("unsupported compression method {0}")]
    UnsupportedCompression(CompressionMethod),

    /// The image doesn't use 24 bits per pixel.
    #[error("unsupported bit depth {0}")]
    UnsupportedBpp(u16),

    /// Width isn't positive or height is zero.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: i32,
        /// Declared height.
        height: i32,
    },

    /// The pixel array would start inside the header.
    #[error("pixel array offset {offset} is inside the {header_size} byte header")]
    InconsistentPixelOffset {
        /// Declared pixel array offset.
        offset: u32,
        /// Size of the file header plus the DIB header.
        header_size: u64,
    },

    /// The declared file size is too small to hold the pixel array.
    #[error("declared file size {declared} is smaller than the required {required} bytes")]
    InconsistentFileSize {
        /// Declared file size.
        declared: u32,
        /// Size required by the header and pixel array.
        required: u64,
    },
}
