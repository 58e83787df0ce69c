//! # zeniff
//!
//! Interchange File Format (Maya IFF) image decoder and encoder.
//!
//! ## Supported Formats
//!
//! - 8-bit and 16-bit luminance, luminance + alpha, RGB and RGBA
//! - Uncompressed and run-length compressed tiles
//! - `AUTH` / `DATE` text chunks
//!
//! Unknown chunks are skipped unless [`IffStrictness::Strict`] is requested.
//! Malformed or truncated input yields an [`IffError`]; a partially decoded
//! image is never returned.
//!
//! The lower layers ([`iff::cursor`], [`iff::rle`], [`iff::chunk`]) are
//! public for tools that need to inspect or build chunk trees directly.
//!
//! ## Non-Goals
//!
//! - Z-buffer (`ZBUF`) decoding
//! - Animated or multi-image (`CAT `) files
//! - Color management
//!
//! ## Usage
//!
//! ```no_run
//! use zeniff::{DecodeRequest, EncodeRequest, ImageInfo, PixelLayout};
//! use enough::Unstoppable;
//!
//! let data: &[u8] = &[]; // your IFF bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.layout);
//!
//! let decoded = DecodeRequest::new(data).decode(Unstoppable)?;
//!
//! let encoded = EncodeRequest::for_extension("z").encode(
//!     decoded.pixels(),
//!     decoded.width(),
//!     decoded.height(),
//!     decoded.layout(),
//!     Unstoppable,
//! )?;
//! # Ok::<(), zeniff::IffError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod info;
mod limits;
mod pixel;

pub mod iff;

mod decode;
mod encode;

// Re-exports
pub use decode::{DecodeOutput, DecodeRequest};
pub use encode::EncodeRequest;
pub use enough::{Stop, Unstoppable};
pub use error::IffError;
pub use info::{Compression, EXTENSIONS, IffStrictness, ImageInfo};
pub use limits::Limits;
#[cfg(feature = "rgb")]
pub use pixel::DecodePixel;
pub use pixel::PixelLayout;

use alloc::vec::Vec;

/// Decode an IFF image with default settings.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, IffError> {
    DecodeRequest::new(data).decode(stop)
}

/// Encode pixels as an RLE compressed IFF image.
pub fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    stop: impl Stop,
) -> Result<Vec<u8>, IffError> {
    EncodeRequest::new().encode(pixels, width, height, layout, stop)
}

/// Encode pixels as an uncompressed IFF image.
pub fn encode_uncompressed(
    pixels: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    stop: impl Stop,
) -> Result<Vec<u8>, IffError> {
    EncodeRequest::new()
        .with_compression(Compression::None)
        .encode(pixels, width, height, layout, stop)
}
