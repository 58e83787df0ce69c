//! IFF container internals: cursors, run-length coding, chunk structure,
//! and the image decoder/encoder built on them.
//!
//! Layout of an image file:
//!
//! ```text
//! FOR4 <len> CIMG
//!     TBHD <32>  width height prnum prden flags bytes tiles compression orgx orgy
//!     AUTH <n>   optional text
//!     DATE <n>   optional text
//!     FOR4 <len> TBMP
//!         RGBA <n>   x1 y1 x2 y2, then per row / channel / byte plane runs
//!         ...
//! ```
//!
//! All integers are big-endian. Tile bounds are inclusive. 16-bit samples
//! are split into byte planes, most significant first.

pub mod chunk;
pub mod cursor;
pub(crate) mod decode;
pub(crate) mod encode;
pub mod rle;

use alloc::format;

use self::chunk::ChunkTag;
use self::cursor::{ByteCursor, WriteCursor};
use crate::error::IffError;
use crate::info::{Compression, IffStrictness, ImageInfo};
use crate::pixel::PixelLayout;

pub(crate) use self::decode::decode_into;
pub(crate) use self::encode::{EncodeOptions, encode_iff};

/// Header flag: RGB color channels.
pub const FLAG_RGB: u32 = 0x01;
/// Header flag: alpha channel.
pub const FLAG_ALPHA: u32 = 0x02;
/// Header flag: depth buffer present (not decoded).
pub const FLAG_ZBUFFER: u32 = 0x04;
/// Header flag: luminance color channel.
pub const FLAG_LUMINANCE: u32 = 0x08;

const TBHD_LEN: usize = 32;

/// Parsed `TBHD` header chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Tbhd {
    pub width: u32,
    pub height: u32,
    pub prnum: u16,
    pub prden: u16,
    pub flags: u32,
    pub bytes: u16,
    pub tiles: u16,
    pub compression: u32,
    pub orgx: u32,
    pub orgy: u32,
}

impl Tbhd {
    pub fn parse(payload: &[u8]) -> Result<Self, IffError> {
        if payload.len() < TBHD_LEN {
            return Err(IffError::MalformedHeader(format!(
                "TBHD is {} bytes, expected {TBHD_LEN}",
                payload.len()
            )));
        }
        let mut c = ByteCursor::new(payload);
        let header = Self {
            width: c.read_u32()?,
            height: c.read_u32()?,
            prnum: c.read_u16()?,
            prden: c.read_u16()?,
            flags: c.read_u32()?,
            bytes: c.read_u16()?,
            tiles: c.read_u16()?,
            compression: c.read_u32()?,
            orgx: c.read_u32()?,
            orgy: c.read_u32()?,
        };
        if header.width == 0 || header.height == 0 {
            return Err(IffError::MalformedHeader(format!(
                "zero image dimension {}x{}",
                header.width, header.height
            )));
        }
        Ok(header)
    }

    pub fn for_image(
        width: u32,
        height: u32,
        layout: PixelLayout,
        compression: Compression,
        tiles: u16,
    ) -> Self {
        let color = if layout.is_luminance() {
            FLAG_LUMINANCE
        } else {
            FLAG_RGB
        };
        let alpha = if layout.has_alpha() { FLAG_ALPHA } else { 0 };
        Self {
            width,
            height,
            prnum: 1,
            prden: 1,
            flags: color | alpha,
            bytes: (layout.bytes_per_channel() - 1) as u16,
            tiles,
            compression: match compression {
                Compression::None => 0,
                Compression::Rle => 1,
            },
            orgx: 0,
            orgy: 0,
        }
    }

    pub fn write(&self, out: &mut WriteCursor) {
        out.write_u32(self.width);
        out.write_u32(self.height);
        out.write_u16(self.prnum);
        out.write_u16(self.prden);
        out.write_u32(self.flags);
        out.write_u16(self.bytes);
        out.write_u16(self.tiles);
        out.write_u32(self.compression);
        out.write_u32(self.orgx);
        out.write_u32(self.orgy);
    }

    pub fn layout(&self) -> Result<PixelLayout, IffError> {
        let channels = match self.flags & (FLAG_RGB | FLAG_ALPHA | FLAG_LUMINANCE) {
            FLAG_LUMINANCE => 1,
            f if f == FLAG_LUMINANCE | FLAG_ALPHA => 2,
            FLAG_RGB => 3,
            f if f == FLAG_RGB | FLAG_ALPHA => 4,
            other => {
                return Err(IffError::UnsupportedFormat(format!(
                    "channel flags {other:#06x}"
                )));
            }
        };
        let bits = match self.bytes {
            0 => 8,
            1 => 16,
            other => {
                return Err(IffError::UnsupportedFormat(format!(
                    "{other} extra bytes per channel"
                )));
            }
        };
        PixelLayout::from_channels(channels, bits).ok_or_else(|| {
            IffError::UnsupportedFormat(format!("{channels} channels at {bits} bits"))
        })
    }

    pub fn compression(&self) -> Result<Compression, IffError> {
        match self.compression {
            0 => Ok(Compression::None),
            1 => Ok(Compression::Rle),
            other => Err(IffError::UnsupportedFormat(format!(
                "compression type {other}"
            ))),
        }
    }
}

/// An inclusive tile rectangle inside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TileRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl TileRect {
    pub fn width(&self) -> usize {
        (self.x2 - self.x1) as usize + 1
    }

    pub fn height(&self) -> usize {
        (self.y2 - self.y1) as usize + 1
    }

    /// Size of the tile's channel data when stored uncompressed.
    pub fn raw_len(&self, layout: PixelLayout) -> usize {
        self.width() * self.height() * layout.bytes_per_pixel()
    }
}

/// Byte index within a native-endian sample for big-endian byte plane `plane`.
#[inline]
pub(crate) fn plane_offset(bytes_per_channel: usize, plane: usize) -> usize {
    if cfg!(target_endian = "little") {
        bytes_per_channel - 1 - plane
    } else {
        plane
    }
}

/// Chunk tags understood inside the `CIMG` group.
pub(crate) const CIMG_TAGS: &[ChunkTag] = &[
    ChunkTag::TBHD,
    ChunkTag::AUTH,
    ChunkTag::DATE,
    ChunkTag::FOR4,
    ChunkTag::FORM,
];

/// Chunk tags understood inside the `TBMP` group.
pub(crate) const TBMP_TAGS: &[ChunkTag] = &[ChunkTag::RGBA, ChunkTag::ZBUF];

/// Header probe used by [`ImageInfo::from_bytes`].
pub(crate) fn probe(data: &[u8]) -> Result<ImageInfo, IffError> {
    decode::parse_container(data, IffStrictness::Standard).map(|c| c.info)
}
