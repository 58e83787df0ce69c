//! Bounds-checked big-endian cursors over byte buffers.

use alloc::vec::Vec;

use crate::error::IffError;

/// Read cursor over a borrowed byte range.
///
/// Every read is checked against the end of the range; a failed read
/// returns [`IffError::OutOfBounds`] and leaves the position untouched.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the range.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the position and the end of the range.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte of the range has been read.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Total length of the underlying range.
    pub fn range_len(&self) -> usize {
        self.data.len()
    }

    /// The unread tail of the range.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn check(&self, offset: usize, len: usize) -> Result<usize, IffError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(IffError::OutOfBounds {
                offset,
                len,
                available: self.data.len(),
            }),
        }
    }

    /// Move to an absolute offset. Seeking to the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<(), IffError> {
        self.check(offset, 0)?;
        self.pos = offset;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), IffError> {
        self.pos = self.check(self.pos, n)?;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], IffError> {
        let end = self.check(self.pos, n)?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], IffError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, IffError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, IffError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, IffError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a 4-byte chunk tag.
    pub fn read_tag(&mut self) -> Result<[u8; 4], IffError> {
        self.read_array()
    }
}

/// Append-only write cursor over an owned buffer.
///
/// Previously written bytes can only be changed through [`patch_u32`](Self::patch_u32).
#[derive(Clone, Debug, Default)]
pub struct WriteCursor {
    buf: Vec<u8>,
}

impl WriteCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_tag(&mut self, tag: [u8; 4]) {
        self.buf.extend_from_slice(&tag);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Overwrite four already-written bytes at `at` with `v` (big-endian).
    pub fn patch_u32(&mut self, at: usize, v: u32) -> Result<(), IffError> {
        let available = self.buf.len();
        let slot = at
            .checked_add(4)
            .and_then(|end| self.buf.get_mut(at..end))
            .ok_or(IffError::OutOfBounds {
                offset: at,
                len: 4,
                available,
            })?;
        slot.copy_from_slice(&v.to_be_bytes());
        Ok(())
    }
}
