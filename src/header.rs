//! BMP header fields.
//!
//! All multi-byte values in a BMP header are little-endian integers stored at fixed offsets. The
//! first 14 bytes are the file header, followed by a DIB header whose first 4 bytes contain its
//! own size. Only DIB headers that start with the 40 byte `BITMAPINFOHEADER` layout are
//! supported, which includes the larger V2 to V5 headers.

use core::fmt;

use tracing::{debug, warn};

use crate::{reader::BmpReader, BmpError, ReadTarget, UnsupportedFormat};

/// Size of the fixed BMP file header that precedes the DIB header.
pub const FILE_HEADER_SIZE: u32 = 14;

/// Size of a `BITMAPINFOHEADER`, the smallest supported DIB header.
pub const BITMAPINFOHEADER_SIZE: u32 = 40;

/// Number of bytes used to store a single 24 BPP pixel.
pub const BYTES_PER_PIXEL: usize = 3;

const SUPPORTED_BPP: u16 = 24;
const SIGNATURE: [u8; 2] = *b"BM";

/// Reads the little-endian integer stored in the inclusive byte range `start..=end`.
///
/// The byte at `start + i` is shifted left by `8 * i` bits, so the first byte is the least
/// significant. The range must cover between one and four bytes.
pub fn extract_little_endian<R>(reader: &mut R, start: u64, end: u64) -> Result<u32, BmpError>
where
    R: BmpReader + ?Sized,
{
    read_le(reader, start, end).map_err(|kind| BmpError::Read {
        target: ReadTarget::Bytes { start, end },
        kind,
    })
}

fn read_le<R>(reader: &mut R, start: u64, end: u64) -> Result<u32, core2::io::ErrorKind>
where
    R: BmpReader + ?Sized,
{
    let len = match end.checked_sub(start) {
        Some(n @ 0..=3) => n as usize + 1,
        _ => return Err(core2::io::ErrorKind::InvalidInput),
    };

    let mut bytes = [0u8; 4];
    reader
        .read_at(start, &mut bytes[..len])
        .map_err(|e| e.kind())?;

    Ok(bytes[..len]
        .iter()
        .enumerate()
        .fold(0, |total, (i, &byte)| total | u32::from(byte) << (8 * i)))
}

/// A named integer field at a fixed position in the BMP header.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum HeaderField {
    /// Size of the whole file in bytes.
    FileSize,
    /// Offset of the pixel array from the start of the file.
    PixelArrayOffset,
    /// Size of the DIB header.
    DibHeaderSize,
    /// Image width in pixels.
    Width,
    /// Image height in pixels. Negative values mark top-down images.
    Height,
    /// Bits per pixel.
    BitDepth,
    /// Compression method.
    CompressionMethod,
    /// Number of important colors.
    ImportantColors,
}

impl HeaderField {
    /// Returns the inclusive byte range that stores this field.
    pub const fn offsets(self) -> (u64, u64) {
        match self {
            HeaderField::FileSize => (2, 5),
            HeaderField::PixelArrayOffset => (10, 13),
            HeaderField::DibHeaderSize => (14, 17),
            HeaderField::Width => (18, 21),
            HeaderField::Height => (22, 25),
            HeaderField::BitDepth => (28, 29),
            HeaderField::CompressionMethod => (30, 33),
            HeaderField::ImportantColors => (50, 53),
        }
    }

    /// Reads the raw value of this field from `reader`.
    ///
    /// Signed fields (width and height) are returned as their unsigned bit pattern.
    pub fn read<R>(self, reader: &mut R) -> Result<u32, BmpError>
    where
        R: BmpReader + ?Sized,
    {
        let (start, end) = self.offsets();
        read_le(reader, start, end).map_err(|kind| BmpError::Read {
            target: ReadTarget::Field(self),
            kind,
        })
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeaderField::FileSize => "file size",
            HeaderField::PixelArrayOffset => "pixel array offset",
            HeaderField::DibHeaderSize => "DIB header size",
            HeaderField::Width => "image width",
            HeaderField::Height => "image height",
            HeaderField::BitDepth => "bit depth",
            HeaderField::CompressionMethod => "compression method",
            HeaderField::ImportantColors => "important colors count",
        })
    }
}

/// Returns the size of the file header plus the DIB header, as declared by the file.
///
/// No validation beyond reading the DIB header size is performed.
pub fn total_header_size<R>(reader: &mut R) -> Result<u64, BmpError>
where
    R: BmpReader + ?Sized,
{
    let dib_header_size = HeaderField::DibHeaderSize.read(reader)?;
    Ok(u64::from(FILE_HEADER_SIZE) + u64::from(dib_header_size))
}

/// Returns the length in bytes of one padded pixel row.
///
/// Rows are padded to a multiple of 4 bytes.
pub const fn stride(width: u32, bpp: u16) -> u64 {
    ((width as u64 * bpp as u64 + 31) & !31) >> 3
}

/// Row order of the pixel array.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum RowOrder {
    /// Bottom-up (positive height).
    BottomUp,
    /// Top-down (negative height).
    TopDown,
}

impl RowOrder {
    pub(crate) const fn from_height(height: i32) -> Self {
        if height < 0 {
            RowOrder::TopDown
        } else {
            RowOrder::BottomUp
        }
    }
}

/// Compression method.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum CompressionMethod {
    /// No compression (`BI_RGB`).
    Rgb,
    /// 8 bit run-length encoding (`BI_RLE8`).
    Rle8,
    /// 4 bit run-length encoding (`BI_RLE4`).
    Rle4,
    /// Channel bit masks (`BI_BITFIELDS`).
    Bitfields,
    /// Embedded JPEG (`BI_JPEG`).
    Jpeg,
    /// Embedded PNG (`BI_PNG`).
    Png,
    /// Channel bit masks including alpha (`BI_ALPHABITFIELDS`).
    AlphaBitfields,
    /// Any other value.
    Other(u32),
}

impl From<u32> for CompressionMethod {
    fn from(value: u32) -> Self {
        match value {
            0 => CompressionMethod::Rgb,
            1 => CompressionMethod::Rle8,
            2 => CompressionMethod::Rle4,
            3 => CompressionMethod::Bitfields,
            4 => CompressionMethod::Jpeg,
            5 => CompressionMethod::Png,
            6 => CompressionMethod::AlphaBitfields,
            other => CompressionMethod::Other(other),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Rgb => f.write_str("BI_RGB"),
            CompressionMethod::Rle8 => f.write_str("BI_RLE8"),
            CompressionMethod::Rle4 => f.write_str("BI_RLE4"),
            CompressionMethod::Bitfields => f.write_str("BI_BITFIELDS"),
            CompressionMethod::Jpeg => f.write_str("BI_JPEG"),
            CompressionMethod::Png => f.write_str("BI_PNG"),
            CompressionMethod::AlphaBitfields => f.write_str("BI_ALPHABITFIELDS"),
            CompressionMethod::Other(value) => write!(f, "unknown ({})", value),
        }
    }
}

/// Validated BMP header.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Header {
    /// Total file size in bytes, as declared by the file. Zero if the encoder didn't set it.
    pub file_size: u32,

    /// Byte offset to the beginning of the pixel array.
    pub image_data_start: u32,

    /// Size of the DIB header in bytes.
    pub dib_header_size: u32,

    /// Image width in pixels.
    pub width: u32,

    /// Absolute image height in pixels.
    pub height: u32,

    /// Row order of the pixel array.
    pub row_order: RowOrder,

    /// Bits per pixel. Always 24.
    pub bpp: u16,

    /// Compression method. Always [`CompressionMethod::Rgb`].
    pub compression: CompressionMethod,

    /// Number of important colors, zero meaning all.
    pub important_colors: u32,
}

impl Header {
    /// Reads and validates the header of a BMP file.
    ///
    /// Files without the `BM` signature, with DIB headers smaller than `BITMAPINFOHEADER`, with
    /// compression, with a bit depth other than 24 or with inconsistent size fields are rejected
    /// with [`BmpError::UnsupportedFormat`].
    pub fn read<R>(reader: &mut R) -> Result<Self, BmpError>
    where
        R: BmpReader + ?Sized,
    {
        let mut signature = [0u8; 2];
        reader
            .read_at(0, &mut signature)
            .map_err(|e| BmpError::Read {
                target: ReadTarget::Bytes { start: 0, end: 1 },
                kind: e.kind(),
            })?;
        if signature != SIGNATURE {
            return Err(UnsupportedFormat::InvalidSignature(signature).into());
        }

        let dib_header_size = HeaderField::DibHeaderSize.read(reader)?;
        if dib_header_size < BITMAPINFOHEADER_SIZE {
            return Err(UnsupportedFormat::UnsupportedHeaderLength(dib_header_size).into());
        }

        let compression = CompressionMethod::from(HeaderField::CompressionMethod.read(reader)?);
        if compression != CompressionMethod::Rgb {
            return Err(UnsupportedFormat::UnsupportedCompression(compression).into());
        }

        // The bit depth field is 2 bytes wide, so this can't truncate.
        let bpp = HeaderField::BitDepth.read(reader)? as u16;
        if bpp != SUPPORTED_BPP {
            return Err(UnsupportedFormat::UnsupportedBpp(bpp).into());
        }

        let width = HeaderField::Width.read(reader)? as i32;
        let height = HeaderField::Height.read(reader)? as i32;
        if width <= 0 || height == 0 {
            return Err(UnsupportedFormat::InvalidDimensions { width, height }.into());
        }

        let header = Header {
            file_size: HeaderField::FileSize.read(reader)?,
            image_data_start: HeaderField::PixelArrayOffset.read(reader)?,
            dib_header_size,
            width: width.unsigned_abs(),
            height: height.unsigned_abs(),
            row_order: RowOrder::from_height(height),
            bpp,
            compression,
            important_colors: HeaderField::ImportantColors.read(reader)?,
        };
        header.check_sizes()?;

        debug!(
            width = header.width,
            height = header.height,
            row_order = ?header.row_order,
            image_data_start = header.image_data_start,
            dib_header_size = header.dib_header_size,
            "parsed BMP header"
        );

        Ok(header)
    }

    fn check_sizes(&self) -> Result<(), BmpError> {
        let header_size = self.total_header_size();
        let offset = u64::from(self.image_data_start);
        if offset < header_size {
            return Err(UnsupportedFormat::InconsistentPixelOffset {
                offset: self.image_data_start,
                header_size,
            }
            .into());
        }
        if offset > header_size {
            warn!(
                gap = offset - header_size,
                "pixel array doesn't directly follow the header"
            );
        }

        let required = offset + self.image_data_len();
        if self.file_size != 0 && u64::from(self.file_size) < required {
            return Err(UnsupportedFormat::InconsistentFileSize {
                declared: self.file_size,
                required,
            }
            .into());
        }

        Ok(())
    }

    /// Returns the size of the file header plus the DIB header.
    pub const fn total_header_size(&self) -> u64 {
        FILE_HEADER_SIZE as u64 + self.dib_header_size as u64
    }

    /// Returns the length in bytes of one padded row.
    pub const fn bytes_per_row(&self) -> u64 {
        stride(self.width, self.bpp)
    }

    /// Returns the length in bytes of the pixel data in one row, without padding.
    pub const fn unpadded_row_len(&self) -> u64 {
        self.width as u64 * BYTES_PER_PIXEL as u64
    }

    /// Returns the number of padding bytes at the end of each row.
    pub const fn padding_len(&self) -> u64 {
        self.bytes_per_row() - self.unpadded_row_len()
    }

    /// Returns the number of rows in the pixel array.
    pub const fn row_count(&self) -> u32 {
        self.height
    }

    /// Returns the length in bytes of the whole pixel array.
    pub const fn image_data_len(&self) -> u64 {
        self.bytes_per_row() * self.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core2::io::{Cursor, ErrorKind};

    #[test]
    fn little_endian_value() {
        let data = [0x10, 0x00, 0x00, 0x00];
        assert_eq!(
            extract_little_endian(&mut Cursor::new(&data[..]), 0, 3),
            Ok(16)
        );
    }

    #[test]
    fn little_endian_byte_order() {
        let data = [0xAA, 0x78, 0x56, 0x34, 0x12];
        let mut reader = Cursor::new(&data[..]);
        assert_eq!(extract_little_endian(&mut reader, 1, 4), Ok(0x1234_5678));
        assert_eq!(extract_little_endian(&mut reader, 1, 2), Ok(0x5678));
        assert_eq!(extract_little_endian(&mut reader, 0, 0), Ok(0xAA));
    }

    #[test]
    fn little_endian_past_end() {
        let data = [0x10, 0x00];
        assert_eq!(
            extract_little_endian(&mut Cursor::new(&data[..]), 0, 3),
            Err(BmpError::Read {
                target: ReadTarget::Bytes { start: 0, end: 3 },
                kind: ErrorKind::UnexpectedEof,
            })
        );
    }

    #[test]
    fn little_endian_invalid_range() {
        let data = [0u8; 16];
        let mut reader = Cursor::new(&data[..]);
        for (start, end) in [(0, 4), (3, 2)] {
            assert_eq!(
                extract_little_endian(&mut reader, start, end),
                Err(BmpError::Read {
                    target: ReadTarget::Bytes { start, end },
                    kind: ErrorKind::InvalidInput,
                })
            );
        }
    }

    #[test]
    fn field_read_error_names_field() {
        let data = [0u8; 20];
        assert_eq!(
            HeaderField::Width.read(&mut Cursor::new(&data[..])),
            Err(BmpError::Read {
                target: ReadTarget::Field(HeaderField::Width),
                kind: ErrorKind::UnexpectedEof,
            })
        );
    }

    #[test]
    fn stride_is_aligned() {
        for width in 1..64 {
            for bpp in [1, 4, 8, 16, 24, 32] {
                let stride = stride(width, bpp);
                assert_eq!(stride % 4, 0, "width {} bpp {}", width, bpp);
                assert!(stride * 8 >= u64::from(width) * u64::from(bpp));
                assert!(stride * 8 < u64::from(width) * u64::from(bpp) + 32);
            }
        }
    }

    #[test]
    fn stride_24bpp() {
        assert_eq!(stride(1, 24), 4);
        assert_eq!(stride(2, 24), 8);
        assert_eq!(stride(3, 24), 12);
        assert_eq!(stride(4, 24), 12);
        assert_eq!(stride(5, 24), 16);
        assert_eq!(stride(u32::MAX, 24), 12_884_901_888);
    }

    #[test]
    fn compression_names() {
        assert_eq!(CompressionMethod::from(1), CompressionMethod::Rle8);
        assert_eq!(CompressionMethod::from(17), CompressionMethod::Other(17));
    }
}
