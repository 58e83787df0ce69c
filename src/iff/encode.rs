//! IFF image encoder.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;
use log::debug;

use super::chunk::{ChunkTag, ChunkWriter};
use super::cursor::WriteCursor;
use super::{Tbhd, TileRect, plane_offset, rle};
use crate::error::IffError;
use crate::info::Compression;
use crate::pixel::PixelLayout;

/// Rows per tile when the caller does not pick a tile size.
const DEFAULT_TILE_ROWS: u32 = 64;

/// Encoder settings collected by [`crate::EncodeRequest`].
#[derive(Clone, Debug, Default)]
pub(crate) struct EncodeOptions {
    pub compression: Compression,
    pub tile_size: Option<(u32, u32)>,
    pub author: Option<String>,
    pub date: Option<String>,
}

/// Tile width and height for an image, and the resulting tile count.
fn tile_grid(
    width: u32,
    height: u32,
    tile_size: Option<(u32, u32)>,
) -> Result<(u32, u32, u16), IffError> {
    let (tw, th) = match tile_size {
        Some((0, _)) | Some((_, 0)) => {
            return Err(IffError::InvalidInput("tile size must be non-zero".into()));
        }
        Some((tw, th)) => (tw.min(width), th.min(height)),
        None => {
            let rows = DEFAULT_TILE_ROWS.max(height.div_ceil(u32::from(u16::MAX)));
            (width, rows.min(height))
        }
    };
    let count = u64::from(width.div_ceil(tw)) * u64::from(height.div_ceil(th));
    let count = u16::try_from(count).map_err(|_| {
        IffError::UnsupportedFormat(format!(
            "{tw}x{th} tiles on a {width}x{height} image exceed {} tiles",
            u16::MAX
        ))
    })?;
    Ok((tw, th, count))
}

/// Encode `pixels` as an IFF image.
pub(crate) fn encode_iff(
    pixels: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    options: &EncodeOptions,
    stop: &dyn Stop,
) -> Result<Vec<u8>, IffError> {
    if width == 0 || height == 0 {
        return Err(IffError::InvalidInput(format!(
            "zero image dimension {width}x{height}"
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|wh| wh.checked_mul(layout.bytes_per_pixel()))
        .ok_or(IffError::DimensionsTooLarge { width, height })?;
    if pixels.len() < expected {
        return Err(IffError::BufferTooSmall {
            needed: expected,
            actual: pixels.len(),
        });
    }

    let (tw, th, tiles) = tile_grid(width, height, options.tile_size)?;
    stop.check()?;

    let mut w = ChunkWriter::with_capacity(expected + 256);
    w.begin_group(ChunkTag::FOR4, ChunkTag::CIMG);

    let mut header = WriteCursor::new();
    Tbhd::for_image(width, height, layout, options.compression, tiles).write(&mut header);
    w.write_chunk(ChunkTag::TBHD, header.as_slice())?;
    if let Some(author) = &options.author {
        w.write_chunk(ChunkTag::AUTH, author.as_bytes())?;
    }
    if let Some(date) = &options.date {
        w.write_chunk(ChunkTag::DATE, date.as_bytes())?;
    }

    w.begin_group(ChunkTag::FOR4, ChunkTag::TBMP);
    let mut raw = Vec::new();
    let mut packed = Vec::new();
    for y1 in (0..height).step_by(th as usize) {
        for x1 in (0..width).step_by(tw as usize) {
            stop.check()?;
            let rect = TileRect {
                x1,
                y1,
                x2: x1.saturating_add(tw - 1).min(width - 1),
                y2: y1.saturating_add(th - 1).min(height - 1),
            };
            gather_tile(pixels, width as usize, layout, &rect, &mut raw);

            w.begin_chunk(ChunkTag::RGBA);
            let out = w.payload();
            out.write_u32(rect.x1);
            out.write_u32(rect.y1);
            out.write_u32(rect.x2);
            out.write_u32(rect.y2);
            match options.compression {
                Compression::None => out.write_bytes(&raw),
                Compression::Rle => {
                    packed.clear();
                    for run in raw.chunks_exact(rect.width()) {
                        rle::encode(run, &mut packed);
                    }
                    out.write_bytes(&packed);
                }
            }
            w.end_chunk()?;
        }
    }
    w.end_chunk()?;
    w.end_chunk()?;
    let bytes = w.finish()?;
    debug!(
        "encoded {width}x{height} {layout:?} as {tiles} {:?} tiles in {} bytes",
        options.compression,
        bytes.len()
    );
    Ok(bytes)
}

/// Split a tile into its row / channel / byte-plane runs, in file order.
fn gather_tile(
    pixels: &[u8],
    width: usize,
    layout: PixelLayout,
    rect: &TileRect,
    raw: &mut Vec<u8>,
) {
    let channels = layout.channels();
    let bpc = layout.bytes_per_channel();
    let bpp = layout.bytes_per_pixel();
    let tw = rect.width();

    raw.clear();
    raw.reserve(rect.raw_len(layout));
    let mut plane = vec![0u8; tw];
    for row in 0..rect.height() {
        let y = rect.y1 as usize + row;
        let row_start = (y * width + rect.x1 as usize) * bpp;
        for channel in 0..channels {
            for p in 0..bpc {
                let first = row_start + channel * bpc + plane_offset(bpc, p);
                for (x, byte) in plane.iter_mut().enumerate() {
                    *byte = pixels[first + x * bpp];
                }
                raw.extend_from_slice(&plane);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    #[test]
    fn default_grid_is_row_strips() {
        assert_eq!(tile_grid(100, 10, None).unwrap(), (100, 10, 1));
        assert_eq!(tile_grid(100, 130, None).unwrap(), (100, 64, 3));
    }

    #[test]
    fn default_grid_grows_for_tall_images() {
        let (_, th, count) = tile_grid(1, u32::MAX, None).unwrap();
        assert!(th > DEFAULT_TILE_ROWS);
        assert!(count > 0);
    }

    #[test]
    fn explicit_grid() {
        assert_eq!(tile_grid(100, 100, Some((32, 32))).unwrap(), (32, 32, 16));
        assert_eq!(tile_grid(10, 10, Some((64, 64))).unwrap(), (10, 10, 1));
        assert!(matches!(
            tile_grid(100_000, 100_000, Some((1, 1))),
            Err(IffError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            tile_grid(4, 4, Some((0, 4))),
            Err(IffError::InvalidInput(_))
        ));
    }

    #[test]
    fn gather_splits_planes_big_endian() {
        let mut pixels = Vec::new();
        for v in [0x0102u16, 0x0304, 0x0506, 0x0708] {
            pixels.extend_from_slice(&v.to_ne_bytes());
        }
        // 2x1 GrayAlpha16: (gray 0x0102, alpha 0x0304), (0x0506, 0x0708)
        let rect = TileRect {
            x1: 0,
            y1: 0,
            x2: 1,
            y2: 0,
        };
        let mut raw = Vec::new();
        gather_tile(&pixels, 2, PixelLayout::GrayAlpha16, &rect, &mut raw);
        assert_eq!(raw, [0x01, 0x05, 0x02, 0x06, 0x03, 0x07, 0x04, 0x08]);
    }

    #[test]
    fn rejects_bad_input() {
        let opts = EncodeOptions::default();
        assert!(matches!(
            encode_iff(&[], 0, 1, PixelLayout::Gray8, &opts, &Unstoppable),
            Err(IffError::InvalidInput(_))
        ));
        assert!(matches!(
            encode_iff(&[0; 5], 2, 1, PixelLayout::Rgb8, &opts, &Unstoppable),
            Err(IffError::BufferTooSmall {
                needed: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn incompressible_tiles_stay_packed() {
        let pixels: Vec<u8> = (0..16).collect();
        let opts = EncodeOptions::default();
        let bytes = encode_iff(&pixels, 4, 4, PixelLayout::Gray8, &opts, &Unstoppable).unwrap();
        // Root(12) + TBHD(40) + TBMP group(12) + RGBA header(8) + rect(16)
        // + four rows of one 5-byte literal packet
        assert_eq!(bytes.len(), 12 + 40 + 12 + 8 + 16 + 20);
        assert_eq!(&bytes[bytes.len() - 5..], &[0x03, 12, 13, 14, 15]);
    }
}
