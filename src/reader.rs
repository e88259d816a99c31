//! BMP stream reader
//!
//! The decoder never opens files itself. Everything it needs from its environment is expressed
//! by the [`BmpReader`] trait: reading a run of bytes at an absolute offset and asking how long
//! the stream is. Every type implementing [`Read`] and [`Seek`] is a `BmpReader`, which covers
//! files as well as in-memory cursors.
//!
//! Pixel rows are consumed through [`Rows`], a [`StreamingIterator`] that reuses a single
//! stride-sized buffer for every row.

use alloc::{vec, vec::Vec};
use core2::io::{self, Read, Seek, SeekFrom};
use streaming_iterator::StreamingIterator;

use crate::{BmpError, ReadTarget};

/// Byte-addressable, seekable source of BMP data.
pub trait BmpReader {
    /// Fills `buffer` with the bytes starting at `offset`.
    ///
    /// Fails if the stream can't seek to `offset` or ends before `buffer` is full.
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> io::Result<()>;

    /// Returns the total length of the stream in bytes.
    fn stream_len(&mut self) -> io::Result<u64>;
}

impl<T> BmpReader for T
where
    T: Read + Seek + ?Sized,
{
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(buffer)
    }

    fn stream_len(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::End(0))
    }
}

/// Streaming iterator over the padded pixel rows of a BMP file, in file order.
///
/// Each item is one full stride, padding included. Rows are only yielded when they were read
/// completely. The first failed read ends the iteration and is returned by [`finish`].
///
/// [`finish`]: Rows::finish
#[derive(Debug)]
pub struct Rows<'a, R: ?Sized> {
    reader: &'a mut R,
    buffer: Vec<u8>,
    start: u64,
    row_count: usize,
    index: usize,
    loaded: bool,
    error: Option<BmpError>,
}

impl<'a, R> Rows<'a, R>
where
    R: BmpReader + ?Sized,
{
    /// Creates an iterator over `row_count` rows of `stride` bytes, starting at byte `start`.
    pub fn new(reader: &'a mut R, start: u64, stride: usize, row_count: usize) -> Self {
        Self {
            reader,
            buffer: vec![0; stride],
            start,
            row_count,
            index: 0,
            loaded: false,
            error: None,
        }
    }

    /// Returns the number of rows read so far.
    pub fn rows_read(&self) -> usize {
        self.index
    }

    /// Consumes the iterator and reports the read error that stopped it, if any.
    pub fn finish(self) -> Result<(), BmpError> {
        self.error.map_or(Ok(()), Err)
    }
}

impl<R> StreamingIterator for Rows<'_, R>
where
    R: BmpReader + ?Sized,
{
    type Item = [u8];

    fn advance(&mut self) {
        self.loaded = false;
        if self.error.is_some() || self.index >= self.row_count {
            return;
        }

        let offset = self.start + self.index as u64 * self.buffer.len() as u64;
        match self.reader.read_at(offset, &mut self.buffer) {
            Ok(()) => {
                self.loaded = true;
                self.index += 1;
            }
            Err(e) => {
                self.error = Some(BmpError::Read {
                    target: ReadTarget::Row(self.index),
                    kind: e.kind(),
                });
            }
        }
    }

    fn get(&self) -> Option<&[u8]> {
        if self.loaded {
            Some(&self.buffer)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.row_count - self.index;
        (0, Some(remaining))
    }
}
