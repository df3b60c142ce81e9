//! Bounds-checked byte cursor and patchable writer
//!
//! PROP files are read with a single byte order throughout, so both types are
//! generic over a [`byteorder::ByteOrder`] defaulting to little-endian.

use std::io::{Cursor, Seek, SeekFrom, Write};
use std::marker::PhantomData;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};

/// Failure of a single cursor read.
///
/// Callers turn this into the phase-specific [`Error`] with
/// [`CursorError::in_preamble`] or [`CursorError::in_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    /// Fewer than `needed` bytes remained at `offset`.
    Eof { offset: usize, needed: usize },
    /// A length prefix was negative or larger than the remaining bytes.
    BadLength {
        offset: usize,
        length: i64,
        remaining: usize,
    },
}

impl CursorError {
    /// Map into a preamble error for `field`.
    pub fn in_preamble(self, field: &'static str) -> Error {
        match self {
            Self::Eof { offset, .. } => Error::TruncatedPreamble { field, offset },
            Self::BadLength { offset, length, remaining } => Error::CorruptLength {
                offset,
                length,
                remaining,
            },
        }
    }

    /// Map into a block-section error for block number `block`.
    pub fn in_block(self, block: usize) -> Error {
        match self {
            Self::Eof { offset, .. } => Error::TruncatedBlock { block, offset },
            Self::BadLength { offset, length, remaining } => Error::CorruptLength {
                offset,
                length,
                remaining,
            },
        }
    }
}

pub type CursorResult<T> = std::result::Result<T, CursorError>;

/// Little-endian cursor used for PROP data.
pub type PropCursor<'a> = ByteCursor<'a, LittleEndian>;

/// Little-endian writer used for PROP data.
pub type PropWriter = ByteWriter<LittleEndian>;

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSnapshot(usize);

impl CursorSnapshot {
    pub fn position(self) -> usize {
        self.0
    }
}

/// Sequential reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a, B: ByteOrder = LittleEndian> {
    data: &'a [u8],
    pos: usize,
    _order: PhantomData<B>,
}

impl<'a, B: ByteOrder> ByteCursor<'a, B> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::at(data, 0)
    }

    /// Create a cursor starting at `pos` (clamped to the end of `data`).
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos: pos.min(data.len()),
            _order: PhantomData,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot(self.pos)
    }

    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.pos = snapshot.0.min(self.data.len());
    }

    /// Read `len` bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> CursorResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(CursorError::Eof {
                offset: self.pos,
                needed: len,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> CursorResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> CursorResult<i32> {
        self.read_bytes(4).map(B::read_i32)
    }

    pub fn read_u32(&mut self) -> CursorResult<u32> {
        self.read_bytes(4).map(B::read_u32)
    }

    pub fn read_i64(&mut self) -> CursorResult<i64> {
        self.read_bytes(8).map(B::read_i64)
    }

    /// Read an i32 length followed by that many bytes.
    ///
    /// Negative lengths and lengths past the end of the data are rejected
    /// before any payload byte is consumed.
    pub fn read_prefixed(&mut self) -> CursorResult<&'a [u8]> {
        let offset = self.pos;
        let length = self.read_i32()?;
        let remaining = self.remaining();
        match usize::try_from(length) {
            Ok(len) if len <= remaining => self.read_bytes(len),
            _ => {
                self.pos = offset;
                Err(CursorError::BadLength {
                    offset,
                    length: i64::from(length),
                    remaining,
                })
            }
        }
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: usize) -> CursorResult<()> {
        self.read_bytes(len).map(|_| ())
    }
}

/// Growable output buffer supporting back-patching of earlier fields.
#[derive(Debug)]
pub struct ByteWriter<B: ByteOrder = LittleEndian> {
    inner: Cursor<Vec<u8>>,
    _order: PhantomData<B>,
}

impl<B: ByteOrder> ByteWriter<B> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Cursor::new(Vec::with_capacity(capacity)),
            _order: PhantomData,
        }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.inner.write_i32::<B>(value)?;
        Ok(())
    }

    /// Write `payload` preceded by its i32 length.
    pub fn write_prefixed(&mut self, payload: &[u8]) -> Result<()> {
        let length = i32::try_from(payload.len()).map_err(|_| Error::CorruptLength {
            offset: self.position(),
            length: payload.len() as i64,
            remaining: 0,
        })?;
        self.write_i32(length)?;
        self.write_bytes(payload)
    }

    /// Overwrite the i32 at `offset`, then return to the end of the buffer.
    pub fn patch_i32(&mut self, offset: usize, value: i32) -> Result<()> {
        if offset + 4 > self.position() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("patch offset {offset:#x} is past written data"),
            )));
        }
        self.inner.seek(SeekFrom::Start(offset as u64))?;
        self.inner.write_i32::<B>(value)?;
        self.inner.seek(SeekFrom::End(0))?;
        Ok(())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}
