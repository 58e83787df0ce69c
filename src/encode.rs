use alloc::string::String;
use alloc::vec::Vec;

use enough::Stop;

use crate::error::IffError;
use crate::iff::{self, EncodeOptions};
use crate::info::Compression;
use crate::pixel::PixelLayout;

/// Encode request: compression, tiling and optional text chunks.
#[derive(Clone, Debug, Default)]
pub struct EncodeRequest {
    options: EncodeOptions,
}

impl EncodeRequest {
    /// RLE compressed, 64-row tiles, no text chunks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request with the compression conventional for a file extension
    /// (`z` compressed, `iff` uncompressed). Unknown extensions get RLE.
    pub fn for_extension(ext: &str) -> Self {
        Self::new().with_compression(Compression::for_extension(ext).unwrap_or_default())
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.options.compression = compression;
        self
    }

    /// Tile width and height in pixels. Clamped to the image size; the
    /// resulting grid must not exceed 65535 tiles.
    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.options.tile_size = Some((width, height));
        self
    }

    /// Write an `AUTH` chunk.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.options.author = Some(author.into());
        self
    }

    /// Write a `DATE` chunk.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.options.date = Some(date.into());
        self
    }

    pub fn compression(&self) -> Compression {
        self.options.compression
    }

    /// Encode `pixels`, a row-major buffer of `width * height` pixels in `layout`.
    pub fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
        stop: impl Stop,
    ) -> Result<Vec<u8>, IffError> {
        iff::encode_iff(pixels, width, height, layout, &self.options, &stop)
    }
}
