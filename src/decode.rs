//! Pixel array decoding.

use alloc::vec::Vec;
use core2::io::ErrorKind;
use streaming_iterator::StreamingIterator;
use tracing::trace;

use crate::{
    grid::{Pixel, PixelGrid},
    header::{Header, RowOrder, BYTES_PER_PIXEL},
    reader::{BmpReader, Rows},
    BmpError, ReadTarget, UnsupportedFormat,
};

/// Reads and validates the header, then decodes the pixel array into a grid.
///
/// Row 0 of the returned grid is the bottom scanline of the image.
pub fn load_pixel_array<R>(reader: &mut R) -> Result<PixelGrid, BmpError>
where
    R: BmpReader + ?Sized,
{
    let header = Header::read(reader)?;
    load_pixel_array_with_header(reader, &header)
}

/// Decodes the pixel array described by an already parsed header.
pub fn load_pixel_array_with_header<R>(
    reader: &mut R,
    header: &Header,
) -> Result<PixelGrid, BmpError>
where
    R: BmpReader + ?Sized,
{
    let width = header.width as usize;
    let row_count = header.row_count() as usize;
    let start = u64::from(header.image_data_start);
    let stride = header.bytes_per_row();

    // Check the stream length up front so a truncated file fails before any row buffers are
    // allocated.
    let stream_len = reader.stream_len().map_err(|e| BmpError::Read {
        target: ReadTarget::StreamLength,
        kind: e.kind(),
    })?;
    let available_rows = stream_len.saturating_sub(start) / stride;
    if available_rows < u64::from(header.row_count()) {
        return Err(BmpError::Read {
            target: ReadTarget::Row(available_rows as usize),
            kind: ErrorKind::UnexpectedEof,
        });
    }

    let stride = usize::try_from(stride).map_err(|_| UnsupportedFormat::InvalidDimensions {
        width: header.width as i32,
        height: header.height as i32,
    })?;
    let unpadded_len = width * BYTES_PER_PIXEL;

    let mut rows = Vec::with_capacity(row_count);
    let mut chunks = Rows::new(reader, start, stride, row_count);
    while let Some(chunk) = chunks.next() {
        let row: Vec<Pixel> = chunk[..unpadded_len]
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|bgr| Pixel::new(bgr[0], bgr[1], bgr[2]))
            .collect();
        rows.push(row);
    }
    trace!(rows = chunks.rows_read(), stride, "read pixel rows");
    chunks.finish()?;

    if header.row_order == RowOrder::TopDown {
        rows.reverse();
    }

    Ok(PixelGrid::from_rows_unchecked(width, rows))
}
