use alloc::string::String;

use crate::error::IffError;
use crate::pixel::PixelLayout;

/// File extensions conventionally used for IFF images.
///
/// `z` files are RLE compressed by default; `iff` files are not.
pub const EXTENSIONS: &[&str] = &["iff", "z"];

/// Pixel data compression declared in the image header.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Channel runs stored verbatim.
    None,
    /// Channel runs packed with the IFF run-length scheme.
    #[default]
    Rle,
}

impl Compression {
    /// Default compression for a file extension (case-insensitive, with or
    /// without the leading dot). Returns `None` for unknown extensions.
    pub fn for_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        if ext.eq_ignore_ascii_case("z") {
            Some(Self::Rle)
        } else if ext.eq_ignore_ascii_case("iff") {
            Some(Self::None)
        } else {
            None
        }
    }
}

/// How strictly the decoder treats chunks it does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IffStrictness {
    /// Skip unknown auxiliary chunks.
    #[default]
    Standard,
    /// Reject unknown chunks and a tile count that disagrees with the header.
    Strict,
}

/// Image description from the IFF header chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub compression: Compression,
    /// Tile count declared by the header.
    pub tiles: u16,
    /// Contents of the `AUTH` chunk, if any.
    pub author: Option<String>,
    /// Contents of the `DATE` chunk, if any.
    pub date: Option<String>,
}

impl ImageInfo {
    /// Probe the container header without decoding pixels.
    pub fn from_bytes(data: &[u8]) -> Result<Self, IffError> {
        crate::iff::probe(data)
    }

    /// Number of channels per pixel.
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Bits per channel sample: 8 or 16.
    pub fn bits_per_channel(&self) -> u32 {
        self.layout.bits_per_channel()
    }

    /// Bytes in one row of the decoded pixel buffer.
    pub fn row_bytes(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.layout.bytes_per_pixel())
    }

    /// Bytes in the whole decoded pixel buffer.
    pub fn buffer_len(&self) -> Option<usize> {
        self.row_bytes()?.checked_mul(self.height as usize)
    }
}
