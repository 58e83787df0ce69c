//! IFF image decoder: walks the chunk tree, then unpacks tiles into the
//! destination buffer.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;
use log::debug;

use super::chunk::{Chunk, ChunkReader, ChunkTag};
use super::cursor::ByteCursor;
use super::{CIMG_TAGS, TBMP_TAGS, Tbhd, TileRect, plane_offset, rle};
use crate::error::IffError;
use crate::info::{Compression, IffStrictness, ImageInfo};

/// Header information plus the tile chunks still to be decoded.
pub(crate) struct Container<'a> {
    pub info: ImageInfo,
    pub tiles: Vec<Chunk<'a>>,
}

impl Container<'_> {
    /// Reject images whose tile payloads cannot possibly fill the buffer,
    /// before anything is allocated for them.
    pub fn check_payload_size(&self) -> Result<(), IffError> {
        let needed = self
            .info
            .buffer_len()
            .ok_or(IffError::DimensionsTooLarge {
                width: self.info.width,
                height: self.info.height,
            })?;
        let available: usize = self.tiles.iter().map(|t| t.payload.len()).sum();
        // A two-byte replicate packet expands to at most 128 bytes.
        let max_expansion = match self.info.compression {
            Compression::None => 1,
            Compression::Rle => rle::MAX_PACKET / 2,
        };
        if available.saturating_mul(max_expansion) < needed {
            return Err(IffError::TruncatedData(format!(
                "{available} bytes of tile data cannot fill a {needed} byte image"
            )));
        }
        Ok(())
    }
}

/// Walk the chunk tree, collecting the header and tile chunks.
pub(crate) fn parse_container(
    data: &[u8],
    strictness: IffStrictness,
) -> Result<Container<'_>, IffError> {
    let strict = strictness == IffStrictness::Strict;
    let is_root = data.len() >= 12
        && (data[0..4] == ChunkTag::FOR4.0 || data[0..4] == ChunkTag::FORM.0)
        && data[8..12] == ChunkTag::CIMG.0;
    if !is_root {
        return Err(IffError::UnrecognizedFormat);
    }

    let mut top = ChunkReader::new(data);
    let root = top.next().ok_or(IffError::UnrecognizedFormat)??;
    if top.position() < data.len() {
        debug!(
            "ignoring {} bytes after the root chunk",
            data.len() - top.position()
        );
    }

    let mut children = root.children()?;
    if strict {
        children = children.strict(CIMG_TAGS);
    }

    let mut header: Option<Tbhd> = None;
    let mut author = None;
    let mut date = None;
    let mut tiles = Vec::new();

    for chunk in children {
        let chunk = chunk?;
        match chunk.tag {
            ChunkTag::TBHD => {
                if header.is_some() {
                    return Err(IffError::MalformedHeader("duplicate TBHD chunk".into()));
                }
                header = Some(Tbhd::parse(chunk.payload)?);
            }
            ChunkTag::AUTH => author = Some(chunk_text(chunk.payload)),
            ChunkTag::DATE => date = Some(chunk_text(chunk.payload)),
            tag if tag.is_group() => {
                let form = chunk.form_type()?;
                if form != ChunkTag::TBMP {
                    if strict {
                        return Err(IffError::UnexpectedChunk(form));
                    }
                    debug!("skipping {tag} group of form {form}");
                    continue;
                }
                if header.is_none() {
                    return Err(IffError::MalformedHeader(
                        "pixel data before TBHD chunk".into(),
                    ));
                }
                collect_tiles(&chunk, strict, &mut tiles)?;
            }
            tag => debug!(
                "skipping chunk {tag} ({} bytes) at offset {}",
                chunk.payload.len(),
                chunk.offset
            ),
        }
    }

    let header = header.ok_or_else(|| IffError::MalformedHeader("missing TBHD chunk".into()))?;
    if strict && tiles.len() != usize::from(header.tiles) {
        return Err(IffError::MalformedHeader(format!(
            "header declares {} tiles, found {}",
            header.tiles,
            tiles.len()
        )));
    }

    let info = ImageInfo {
        width: header.width,
        height: header.height,
        layout: header.layout()?,
        compression: header.compression()?,
        tiles: header.tiles,
        author,
        date,
    };
    Ok(Container { info, tiles })
}

fn collect_tiles<'a>(
    group: &Chunk<'a>,
    strict: bool,
    tiles: &mut Vec<Chunk<'a>>,
) -> Result<(), IffError> {
    let mut reader = group.children()?;
    if strict {
        reader = reader.strict(TBMP_TAGS);
    }
    for chunk in reader {
        let chunk = chunk?;
        if chunk.tag == ChunkTag::RGBA {
            tiles.push(chunk);
        } else {
            debug!("skipping tile chunk {} ({} bytes)", chunk.tag, chunk.payload.len());
        }
    }
    Ok(())
}

fn chunk_text(payload: &[u8]) -> String {
    let end = payload
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}

/// One bit per pixel; rejects tiles that write a pixel twice.
struct Coverage {
    bits: Vec<u64>,
    covered: usize,
    total: usize,
}

impl Coverage {
    fn new(total: usize) -> Self {
        Self {
            bits: vec![0; total.div_ceil(64)],
            covered: 0,
            total,
        }
    }

    fn mark_span(&mut self, start: usize, len: usize) -> Result<(), IffError> {
        for i in start..start + len {
            let (word, bit) = (i / 64, 1u64 << (i % 64));
            if self.bits[word] & bit != 0 {
                return Err(IffError::MalformedHeader(format!(
                    "overlapping tiles at pixel {i}"
                )));
            }
            self.bits[word] |= bit;
        }
        self.covered += len;
        Ok(())
    }

    fn is_full(&self) -> bool {
        self.covered == self.total
    }
}

/// Decode every tile of `container` into `out`, which must hold exactly
/// `info.buffer_len()` bytes.
pub(crate) fn decode_into(
    container: &Container<'_>,
    out: &mut [u8],
    stop: &dyn Stop,
) -> Result<(), IffError> {
    let info = &container.info;
    let too_large = IffError::DimensionsTooLarge {
        width: info.width,
        height: info.height,
    };
    let needed = info.buffer_len().ok_or(too_large)?;
    if out.len() < needed {
        return Err(IffError::BufferTooSmall {
            needed,
            actual: out.len(),
        });
    }
    let total = info.width as usize * info.height as usize;
    let mut coverage = Coverage::new(total);

    for tile in &container.tiles {
        stop.check()?;
        decode_tile(tile, info, out, &mut coverage)?;
    }

    if !coverage.is_full() {
        return Err(IffError::TruncatedData(format!(
            "tiles cover {} of {} pixels",
            coverage.covered, coverage.total
        )));
    }
    Ok(())
}

fn read_rect(c: &mut ByteCursor<'_>, info: &ImageInfo) -> Result<TileRect, IffError> {
    let rect = TileRect {
        x1: c.read_u32()?,
        y1: c.read_u32()?,
        x2: c.read_u32()?,
        y2: c.read_u32()?,
    };
    if rect.x1 > rect.x2 || rect.y1 > rect.y2 || rect.x2 >= info.width || rect.y2 >= info.height
    {
        return Err(IffError::MalformedHeader(format!(
            "tile ({}, {})-({}, {}) outside {}x{} image",
            rect.x1, rect.y1, rect.x2, rect.y2, info.width, info.height
        )));
    }
    Ok(rect)
}

fn decode_tile(
    tile: &Chunk<'_>,
    info: &ImageInfo,
    out: &mut [u8],
    coverage: &mut Coverage,
) -> Result<(), IffError> {
    let mut c = ByteCursor::new(tile.payload);
    let rect = read_rect(&mut c, info)?;

    let width = info.width as usize;
    let (tw, th) = (rect.width(), rect.height());
    for row in 0..th {
        let y = rect.y1 as usize + row;
        coverage.mark_span(y * width + rect.x1 as usize, tw)?;
    }

    let layout = info.layout;
    let channels = layout.channels();
    let bpc = layout.bytes_per_channel();
    let bpp = layout.bytes_per_pixel();
    let packed = info.compression == Compression::Rle;

    let mut plane = vec![0u8; tw];
    for row in 0..th {
        let y = rect.y1 as usize + row;
        let row_start = (y * width + rect.x1 as usize) * bpp;
        for channel in 0..channels {
            for p in 0..bpc {
                if packed {
                    let consumed = rle::decode(c.rest(), &mut plane)?;
                    c.skip(consumed)?;
                } else {
                    let raw = c.read_bytes(tw).map_err(|_| {
                        IffError::TruncatedData(format!(
                            "tile at offset {} ends inside row {row}",
                            tile.offset
                        ))
                    })?;
                    plane.copy_from_slice(raw);
                }
                let first = row_start + channel * bpc + plane_offset(bpc, p);
                for (x, &byte) in plane.iter().enumerate() {
                    out[first + x * bpp] = byte;
                }
            }
        }
    }

    if !c.is_exhausted() {
        debug!(
            "{} unused bytes at end of tile at offset {}",
            c.remaining(),
            tile.offset
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iff::chunk::ChunkWriter;
    use crate::iff::cursor::WriteCursor;
    use crate::pixel::PixelLayout;
    use enough::Unstoppable;

    fn gray_file(width: u32, height: u32, tiles: &[(TileRect, &[u8])]) -> Vec<u8> {
        let mut w = ChunkWriter::new();
        w.begin_group(ChunkTag::FOR4, ChunkTag::CIMG);
        let mut hdr = WriteCursor::new();
        Tbhd::for_image(
            width,
            height,
            PixelLayout::Gray8,
            Compression::None,
            tiles.len() as u16,
        )
        .write(&mut hdr);
        w.write_chunk(ChunkTag::TBHD, hdr.as_slice()).unwrap();
        w.begin_group(ChunkTag::FOR4, ChunkTag::TBMP);
        for (rect, data) in tiles {
            w.begin_chunk(ChunkTag::RGBA);
            let p = w.payload();
            p.write_u32(rect.x1);
            p.write_u32(rect.y1);
            p.write_u32(rect.x2);
            p.write_u32(rect.y2);
            p.write_bytes(data);
            w.end_chunk().unwrap();
        }
        w.end_chunk().unwrap();
        w.end_chunk().unwrap();
        w.finish().unwrap()
    }

    fn rect(x1: u32, y1: u32, x2: u32, y2: u32) -> TileRect {
        TileRect { x1, y1, x2, y2 }
    }

    fn decode_gray(data: &[u8]) -> Result<Vec<u8>, IffError> {
        let container = parse_container(data, IffStrictness::Standard)?;
        let mut out = vec![0u8; container.info.buffer_len().unwrap()];
        decode_into(&container, &mut out, &Unstoppable)?;
        Ok(out)
    }

    #[test]
    fn tiles_placed_in_grid() {
        let data = gray_file(
            3,
            2,
            &[
                (rect(2, 0, 2, 1), &[3, 6]),
                (rect(0, 0, 1, 1), &[1, 2, 4, 5]),
            ],
        );
        assert_eq!(decode_gray(&data).unwrap(), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn missing_tile_is_truncated() {
        let data = gray_file(2, 2, &[(rect(0, 0, 1, 0), &[1, 2])]);
        assert!(matches!(
            decode_gray(&data),
            Err(IffError::TruncatedData(_))
        ));
    }

    #[test]
    fn overlapping_tiles_rejected() {
        let data = gray_file(
            2,
            1,
            &[(rect(0, 0, 1, 0), &[1, 2]), (rect(1, 0, 1, 0), &[9])],
        );
        assert!(matches!(
            decode_gray(&data),
            Err(IffError::MalformedHeader(_))
        ));
    }

    #[test]
    fn tile_outside_image_rejected() {
        let data = gray_file(2, 1, &[(rect(0, 0, 2, 0), &[1, 2, 3])]);
        assert!(matches!(
            decode_gray(&data),
            Err(IffError::MalformedHeader(_))
        ));
        let data = gray_file(2, 1, &[(rect(1, 0, 0, 0), &[])]);
        assert!(matches!(
            decode_gray(&data),
            Err(IffError::MalformedHeader(_))
        ));
    }

    #[test]
    fn short_raw_tile_is_truncated() {
        let data = gray_file(2, 2, &[(rect(0, 0, 1, 1), &[1, 2, 3])]);
        assert!(matches!(
            decode_gray(&data),
            Err(IffError::TruncatedData(_))
        ));
    }

    #[test]
    fn tile_without_bounds_is_out_of_bounds() {
        let mut data = gray_file(1, 1, &[]);
        // Splice an RGBA chunk holding only 4 bytes into the TBMP group.
        let tile = b"RGBA\x00\x00\x00\x04\x00\x00\x00\x00";
        data.extend_from_slice(tile);
        let patched = patch_lengths(data, tile.len() as u32);
        assert!(matches!(
            decode_gray(&patched),
            Err(IffError::OutOfBounds { .. })
        ));
    }

    /// Grow the root and TBMP group lengths by `extra` (the TBMP group is
    /// the last chunk of the root).
    fn patch_lengths(mut data: Vec<u8>, extra: u32) -> Vec<u8> {
        let bump = |data: &mut Vec<u8>, at: usize| {
            let old = u32::from_be_bytes(data[at..at + 4].try_into().unwrap());
            data[at..at + 4].copy_from_slice(&(old + extra).to_be_bytes());
        };
        bump(&mut data, 4);
        // FOR4 root (12) + TBHD chunk (8 + 32) puts TBMP's length at 56.
        bump(&mut data, 56);
        data
    }

    #[test]
    fn text_chunks_trim_nul() {
        assert_eq!(chunk_text(b"maya\0\0"), "maya");
        assert_eq!(chunk_text(b"\0"), "");
    }
}
