use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::error::IffError;
use crate::iff;
use crate::info::{IffStrictness, ImageInfo};
use crate::limits::Limits;
use crate::pixel::PixelLayout;

/// Decoded image: header information plus an owned pixel buffer.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pixels: Vec<u8>,
    pub info: ImageInfo,
}

impl DecodeOutput {
    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.info.layout
    }

    /// Take the pixel buffer, dropping the header information.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Split into header information and pixel buffer.
    pub fn into_parts(self) -> (ImageInfo, Vec<u8>) {
        (self.info, self.pixels)
    }

    /// Reinterpret pixel data as typed pixel slice.
    ///
    /// 8-bit layouts only; 16-bit images are read through [`pixels`](Self::pixels).
    /// Returns [`IffError::LayoutMismatch`] if the pixel layout doesn't match `P`.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: crate::DecodePixel>(&self) -> Result<&[P], IffError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        if self.info.layout != P::layout() {
            return Err(IffError::LayoutMismatch {
                expected: P::layout(),
                actual: self.info.layout,
            });
        }
        Ok(self.pixels().as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    ///
    /// Returns [`IffError::LayoutMismatch`] if the pixel layout doesn't match `P`.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::DecodePixel>(&self) -> Result<imgref::ImgRef<'_, P>, IffError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgRef::new(
            pixels,
            self.info.width as usize,
            self.info.height as usize,
        ))
    }

    /// Convert to an [`imgref::ImgVec`] of typed pixels.
    ///
    /// Returns [`IffError::LayoutMismatch`] if the pixel layout doesn't match `P`.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: crate::DecodePixel>(&self) -> Result<imgref::ImgVec<P>, IffError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgVec::new(
            pixels.to_vec(),
            self.info.width as usize,
            self.info.height as usize,
        ))
    }
}

/// Decode request with optional limits and strictness.
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    strictness: IffStrictness,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            strictness: IffStrictness::Standard,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_strictness(mut self, strictness: IffStrictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Decode into a newly allocated buffer.
    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, IffError> {
        let container = iff::decode::parse_container(self.data, self.strictness)?;
        let needed = self.check(&container)?;
        stop.check()?;

        let mut pixels = vec![0u8; needed];
        iff::decode_into(&container, &mut pixels, &stop)?;
        Ok(DecodeOutput {
            pixels,
            info: container.info,
        })
    }

    /// Decode into a caller-owned buffer of at least
    /// [`ImageInfo::buffer_len`] bytes.
    ///
    /// On error the buffer contents are unspecified.
    pub fn decode_into(self, out: &mut [u8], stop: impl Stop) -> Result<ImageInfo, IffError> {
        let container = iff::decode::parse_container(self.data, self.strictness)?;
        let needed = self.check(&container)?;
        if out.len() < needed {
            return Err(IffError::BufferTooSmall {
                needed,
                actual: out.len(),
            });
        }
        stop.check()?;

        iff::decode_into(&container, &mut out[..needed], &stop)?;
        Ok(container.info)
    }

    /// Apply limits and sanity checks; returns the pixel buffer size.
    fn check(&self, container: &iff::decode::Container<'_>) -> Result<usize, IffError> {
        let info = &container.info;
        if let Some(limits) = self.limits {
            limits.check(info.width, info.height)?;
        }
        let needed = info.buffer_len().ok_or(IffError::DimensionsTooLarge {
            width: info.width,
            height: info.height,
        })?;
        if let Some(limits) = self.limits {
            limits.check_memory(needed)?;
        }
        container.check_payload_size()?;
        Ok(needed)
    }
}
