//! Tagged, length-prefixed chunk structure.
//!
//! A chunk is a 4-byte tag, a big-endian `u32` payload length, and the
//! payload, padded with one zero byte when its length is odd. Group chunks
//! (`FOR4`, `FORM`, `LIST`, `CAT `) start their payload with a 4-byte form
//! type followed by child chunks.

use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;

use super::cursor::{ByteCursor, WriteCursor};
use crate::error::IffError;

/// Four-character chunk identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    pub const FOR4: Self = Self(*b"FOR4");
    pub const FORM: Self = Self(*b"FORM");
    pub const LIST: Self = Self(*b"LIST");
    pub const CAT: Self = Self(*b"CAT ");

    pub const CIMG: Self = Self(*b"CIMG");
    pub const TBHD: Self = Self(*b"TBHD");
    pub const TBMP: Self = Self(*b"TBMP");
    pub const RGBA: Self = Self(*b"RGBA");
    pub const AUTH: Self = Self(*b"AUTH");
    pub const DATE: Self = Self(*b"DATE");
    pub const ZBUF: Self = Self(*b"ZBUF");

    /// Whether chunks with this tag contain a form type and child chunks.
    pub fn is_group(self) -> bool {
        matches!(self, Self::FOR4 | Self::FORM | Self::LIST | Self::CAT)
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag(\"{self}\")")
    }
}

/// One chunk borrowed from the source buffer.
#[derive(Clone, Copy, Debug)]
pub struct Chunk<'a> {
    pub tag: ChunkTag,
    /// Offset of the chunk header within the range it was read from.
    pub offset: usize,
    pub payload: &'a [u8],
}

impl<'a> Chunk<'a> {
    pub fn is_group(&self) -> bool {
        self.tag.is_group()
    }

    /// Form type of a group chunk.
    pub fn form_type(&self) -> Result<ChunkTag, IffError> {
        if !self.is_group() {
            return Err(IffError::MalformedHeader(format!(
                "chunk {} is not a group",
                self.tag
            )));
        }
        ByteCursor::new(self.payload)
            .read_tag()
            .map(ChunkTag)
            .map_err(|_| {
                IffError::MalformedHeader(format!("group {} has no form type", self.tag))
            })
    }

    /// Reader over the child chunks of a group.
    pub fn children(&self) -> Result<ChunkReader<'a>, IffError> {
        self.form_type()?;
        Ok(ChunkReader::new(&self.payload[4..]))
    }
}

/// Iterates the chunks of a byte range.
///
/// The reader is positioned past each chunk's payload (and pad byte) before
/// the chunk is yielded, so callers may read as little of the payload as
/// they like. After the first error the iterator yields `None`.
#[derive(Clone, Debug)]
pub struct ChunkReader<'a> {
    cursor: ByteCursor<'a>,
    known: Option<&'a [ChunkTag]>,
    failed: bool,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            known: None,
            failed: false,
        }
    }

    /// Reject any tag not in `known` with [`IffError::UnexpectedChunk`].
    pub fn strict(mut self, known: &'a [ChunkTag]) -> Self {
        self.known = Some(known);
        self
    }

    /// Offset of the next chunk header.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>, IffError> {
        let offset = self.cursor.position();
        if self.cursor.remaining() < 8 {
            return Err(IffError::MalformedHeader(format!(
                "{} trailing bytes at offset {offset} cannot hold a chunk header",
                self.cursor.remaining()
            )));
        }
        let tag = ChunkTag(self.cursor.read_tag()?);
        let len = self.cursor.read_u32()? as usize;
        if len > self.cursor.remaining() {
            return Err(IffError::MalformedHeader(format!(
                "chunk {tag} at offset {offset} declares {len} bytes but only {} remain",
                self.cursor.remaining()
            )));
        }
        if let Some(known) = self.known {
            if !known.contains(&tag) {
                return Err(IffError::UnexpectedChunk(tag));
            }
        }
        let payload = self.cursor.read_bytes(len)?;
        // A missing pad byte after the last chunk is tolerated.
        if len % 2 == 1 && !self.cursor.is_exhausted() {
            self.cursor.skip(1)?;
        }
        Ok(Chunk {
            tag,
            offset,
            payload,
        })
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, IffError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_exhausted() {
            return None;
        }
        let chunk = self.read_chunk();
        self.failed = chunk.is_err();
        Some(chunk)
    }
}

/// Builds nested chunks, backfilling each length when the chunk is closed.
#[derive(Debug, Default)]
pub struct ChunkWriter {
    out: WriteCursor,
    open: Vec<usize>,
}

impl ChunkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: WriteCursor::with_capacity(capacity),
            open: Vec::new(),
        }
    }

    /// Number of chunks currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Cursor for writing the payload of the innermost open chunk.
    pub fn payload(&mut self) -> &mut WriteCursor {
        &mut self.out
    }

    pub fn begin_chunk(&mut self, tag: ChunkTag) {
        self.out.write_tag(tag.0);
        self.open.push(self.out.position());
        self.out.write_u32(0);
    }

    pub fn begin_group(&mut self, tag: ChunkTag, form_type: ChunkTag) {
        self.begin_chunk(tag);
        self.out.write_tag(form_type.0);
    }

    /// Close the innermost open chunk, padding it to an even length.
    pub fn end_chunk(&mut self) -> Result<(), IffError> {
        let at = self
            .open
            .pop()
            .ok_or_else(|| IffError::InvalidInput("end_chunk with no open chunk".to_string()))?;
        let len = self.out.position() - at - 4;
        let len = u32::try_from(len).map_err(|_| {
            IffError::LimitExceeded(format!("chunk payload of {len} bytes exceeds 4 GiB"))
        })?;
        if len % 2 == 1 {
            self.out.write_u8(0);
        }
        self.out.patch_u32(at, len)
    }

    /// Write a complete leaf chunk.
    pub fn write_chunk(&mut self, tag: ChunkTag, payload: &[u8]) -> Result<(), IffError> {
        self.begin_chunk(tag);
        self.out.write_bytes(payload);
        self.end_chunk()
    }

    pub fn finish(self) -> Result<Vec<u8>, IffError> {
        if !self.open.is_empty() {
            return Err(IffError::InvalidInput(format!(
                "{} chunks left open",
                self.open.len()
            )));
        }
        Ok(self.out.into_inner())
    }
}
