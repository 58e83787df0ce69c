/// Pixel memory layout.
///
/// 16-bit layouts store each sample as a native-endian `u16`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Single channel, 8-bit luminance.
    Gray8,
    /// 2 channels, 8-bit luminance + alpha.
    GrayAlpha8,
    /// 3 channels, 8-bit RGB.
    Rgb8,
    /// 4 channels, 8-bit RGBA.
    Rgba8,
    /// Single channel, 16-bit luminance.
    Gray16,
    /// 2 channels, 16-bit luminance + alpha.
    GrayAlpha16,
    /// 3 channels, 16-bit RGB.
    Rgb16,
    /// 4 channels, 16-bit RGBA.
    Rgba16,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.bytes_per_channel()
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray8 | Self::Gray16 => 1,
            Self::GrayAlpha8 | Self::GrayAlpha16 => 2,
            Self::Rgb8 | Self::Rgb16 => 3,
            Self::Rgba8 | Self::Rgba16 => 4,
        }
    }

    /// Bytes per channel sample: 1 or 2.
    pub fn bytes_per_channel(&self) -> usize {
        match self {
            Self::Gray8 | Self::GrayAlpha8 | Self::Rgb8 | Self::Rgba8 => 1,
            Self::Gray16 | Self::GrayAlpha16 | Self::Rgb16 | Self::Rgba16 => 2,
        }
    }

    /// Bits per channel sample: 8 or 16.
    pub fn bits_per_channel(&self) -> u32 {
        self.bytes_per_channel() as u32 * 8
    }

    /// Whether the last channel is alpha.
    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            Self::GrayAlpha8 | Self::Rgba8 | Self::GrayAlpha16 | Self::Rgba16
        )
    }

    /// Whether the color channels are luminance rather than RGB.
    pub fn is_luminance(&self) -> bool {
        matches!(
            self,
            Self::Gray8 | Self::GrayAlpha8 | Self::Gray16 | Self::GrayAlpha16
        )
    }

    /// Layout for a channel count and bit depth, if supported.
    pub fn from_channels(channels: usize, bits: u32) -> Option<Self> {
        Some(match (channels, bits) {
            (1, 8) => Self::Gray8,
            (2, 8) => Self::GrayAlpha8,
            (3, 8) => Self::Rgb8,
            (4, 8) => Self::Rgba8,
            (1, 16) => Self::Gray16,
            (2, 16) => Self::GrayAlpha16,
            (3, 16) => Self::Rgb16,
            (4, 16) => Self::Rgba16,
            _ => return None,
        })
    }
}

/// Pixel types that a decoded 8-bit buffer can be viewed as.
#[cfg(feature = "rgb")]
pub trait DecodePixel: Copy {
    /// The layout whose bytes this pixel type reinterprets.
    fn layout() -> PixelLayout;
}

#[cfg(feature = "rgb")]
impl DecodePixel for rgb::RGB8 {
    fn layout() -> PixelLayout {
        PixelLayout::Rgb8
    }
}

#[cfg(feature = "rgb")]
impl DecodePixel for rgb::RGBA8 {
    fn layout() -> PixelLayout {
        PixelLayout::Rgba8
    }
}

#[cfg(feature = "rgb")]
impl DecodePixel for rgb::alt::Gray<u8> {
    fn layout() -> PixelLayout {
        PixelLayout::Gray8
    }
}

#[cfg(feature = "rgb")]
impl DecodePixel for rgb::alt::GrayAlpha<u8> {
    fn layout() -> PixelLayout {
        PixelLayout::GrayAlpha8
    }
}
