//! Pixel array encoding.
//!
//! Encoding never rewrites the header. The bytes in front of the pixel array are copied verbatim
//! from the source and the grid is flattened behind them, so the grid must have the dimensions
//! the source header declares.

use alloc::{vec, vec::Vec};
use core2::io::Write;
use tracing::debug;

use crate::{
    grid::{Pixel, PixelGrid},
    header::{total_header_size, Header, RowOrder},
    reader::BmpReader,
    BmpError, ReadTarget,
};

/// Returns a verbatim copy of the file header and the DIB header.
pub fn copy_headers<R>(reader: &mut R) -> Result<Vec<u8>, BmpError>
where
    R: BmpReader + ?Sized,
{
    let len = total_header_size(reader)?;
    read_block(reader, len)
}

/// Reads the first `len` bytes of the stream.
pub(crate) fn read_block<R>(reader: &mut R, len: u64) -> Result<Vec<u8>, BmpError>
where
    R: BmpReader + ?Sized,
{
    let error = |kind| BmpError::Read {
        target: ReadTarget::HeaderBlock,
        kind,
    };

    // Refuse to allocate more than the stream can provide.
    let stream_len = reader.stream_len().map_err(|e| error(e.kind()))?;
    if len > stream_len {
        return Err(error(core2::io::ErrorKind::UnexpectedEof));
    }

    let mut block = vec![0; len as usize];
    reader.read_at(0, &mut block).map_err(|e| error(e.kind()))?;
    Ok(block)
}

/// Flattens a grid into the padded byte layout of the pixel array described by `header`.
///
/// Rows are written in file order: grid row 0 first for bottom-up images and last for top-down
/// images. Each row is followed by zero bytes up to the row stride.
pub fn flatten_pixel_array(header: &Header, grid: &PixelGrid) -> Result<Vec<u8>, BmpError> {
    let expected = (header.width as usize, header.row_count() as usize);
    let actual = (grid.width(), grid.height());
    if expected != actual {
        return Err(BmpError::GridMismatch { expected, actual });
    }

    let padding = header.padding_len() as usize;
    let mut data = Vec::with_capacity(header.image_data_len() as usize);

    let mut write_row = |row: &[Pixel]| {
        data.extend(row.iter().flat_map(|pixel| pixel.to_bgr()));
        data.extend(core::iter::repeat(0).take(padding));
    };
    match header.row_order {
        RowOrder::BottomUp => grid.rows().for_each(&mut write_row),
        RowOrder::TopDown => grid.rows().rev().for_each(&mut write_row),
    }

    Ok(data)
}

/// Encodes a grid as a BMP file, reusing the header of the BMP in `reader`.
///
/// The output contains the header, any bytes between the header and the pixel array and the
/// flattened pixel array.
pub fn encode<R>(reader: &mut R, grid: &PixelGrid) -> Result<Vec<u8>, BmpError>
where
    R: BmpReader + ?Sized,
{
    let header = Header::read(reader)?;
    let prefix = read_block(reader, u64::from(header.image_data_start))?;
    encode_with_prefix(&header, &prefix, grid)
}

pub(crate) fn encode_with_prefix(
    header: &Header,
    prefix: &[u8],
    grid: &PixelGrid,
) -> Result<Vec<u8>, BmpError> {
    let pixels = flatten_pixel_array(header, grid)?;

    let mut data = Vec::with_capacity(prefix.len() + pixels.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(&pixels);

    debug!(
        header_len = prefix.len(),
        pixel_data_len = pixels.len(),
        "encoded BMP"
    );

    Ok(data)
}

/// Encodes a grid using the header of the BMP in `reader` and writes the result to `writer`.
///
/// The image is encoded completely before anything is written.
pub fn write_transformation<R, W>(
    reader: &mut R,
    grid: &PixelGrid,
    writer: &mut W,
) -> Result<(), BmpError>
where
    R: BmpReader + ?Sized,
    W: Write + ?Sized,
{
    let data = encode(reader, grid)?;
    write_all(writer, &data)
}

pub(crate) fn write_all<W>(writer: &mut W, data: &[u8]) -> Result<(), BmpError>
where
    W: Write + ?Sized,
{
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| BmpError::Write { kind: e.kind() })
}

/// Encodes a grid using the header of the BMP in `reader` and writes it to a new file at `path`.
///
/// Nothing is created if encoding fails. If writing fails, the partially written file is removed.
#[cfg(feature = "std")]
pub fn write_transformation_to_path<R, P>(
    reader: &mut R,
    grid: &PixelGrid,
    path: P,
) -> Result<(), BmpError>
where
    R: BmpReader + ?Sized,
    P: AsRef<std::path::Path>,
{
    let data = encode(reader, grid)?;
    write_file(path.as_ref(), &data)
}

#[cfg(feature = "std")]
pub(crate) fn write_file(path: &std::path::Path, data: &[u8]) -> Result<(), BmpError> {
    std::fs::write(path, data).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "failed to write BMP file");
        let _ = std::fs::remove_file(path);
        BmpError::Write { kind: e.kind() }
    })
}
