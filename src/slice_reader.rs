//! Bounds-checked little-endian reader over a byte slice.
//!
//! [`SliceReader`] tracks a position like `std::io::Cursor<&[u8]>`, but every
//! read returns an [`AssemblyError`] on truncation so container parsing can
//! use `?` throughout.

use byteorder_lite::{ByteOrder, LittleEndian};
use core::fmt;

use crate::mux::AssemblyError;

fn truncated() -> AssemblyError {
    AssemblyError::InvalidFormat("Unexpected end of data".into())
}

/// A reader that wraps a byte slice and tracks the current position.
#[derive(Clone)]
pub(crate) struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// Create a new SliceReader wrapping the given byte slice.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek_from_start(&mut self, pos: usize) -> Result<(), AssemblyError> {
        if pos > self.data.len() {
            return Err(truncated());
        }
        self.pos = pos;
        Ok(())
    }

    /// Skip `n` bytes forward.
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<(), AssemblyError> {
        let pos = self.pos.checked_add(n).ok_or_else(truncated)?;
        self.seek_from_start(pos)
    }

    /// Read a four-character chunk tag.
    #[inline]
    pub fn read_fourcc(&mut self) -> Result<[u8; 4], AssemblyError> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.take_slice(4)?);
        Ok(tag)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, AssemblyError> {
        Ok(self.take_slice(1)?[0])
    }

    /// Read a u16 in little-endian byte order.
    #[inline]
    pub fn read_u16_le(&mut self) -> Result<u16, AssemblyError> {
        Ok(LittleEndian::read_u16(self.take_slice(2)?))
    }

    /// Read a u24 in little-endian byte order (as u32).
    #[inline]
    pub fn read_u24_le(&mut self) -> Result<u32, AssemblyError> {
        Ok(LittleEndian::read_u24(self.take_slice(3)?))
    }

    /// Read a u32 in little-endian byte order.
    #[inline]
    pub fn read_u32_le(&mut self) -> Result<u32, AssemblyError> {
        Ok(LittleEndian::read_u32(self.take_slice(4)?))
    }

    /// Take a slice of n bytes from the current position and advance position.
    /// Returns a slice reference without copying data.
    #[inline]
    pub fn take_slice(&mut self, n: usize) -> Result<&'a [u8], AssemblyError> {
        let end = self.pos.checked_add(n).ok_or_else(truncated)?;
        if end > self.data.len() {
            return Err(truncated());
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

impl fmt::Debug for SliceReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceReader")
            .field("len", &self.data.len())
            .field("pos", &self.pos)
            .finish()
    }
}
