use enough::Unstoppable;
use zeniff::*;

#[test]
fn rgb8_2x2_compressed_roundtrip() {
    let pixels = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];

    let encoded = encode(&pixels, 2, 2, PixelLayout::Rgb8, Unstoppable).unwrap();
    assert_eq!(&encoded[0..4], b"FOR4");
    assert_eq!(&encoded[8..12], b"CIMG");

    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.width(), 2);
    assert_eq!(decoded.height(), 2);
    assert_eq!(decoded.info.channels(), 3);
    assert_eq!(decoded.info.bits_per_channel(), 8);
    assert_eq!(decoded.info.compression, Compression::Rle);
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn rgb8_2x2_uncompressed_roundtrip() {
    let pixels = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];

    let encoded = encode_uncompressed(&pixels, 2, 2, PixelLayout::Rgb8, Unstoppable).unwrap();
    let (info, decoded) = decode(&encoded, Unstoppable).unwrap().into_parts();
    assert_eq!(info.compression, Compression::None);
    assert_eq!(info.layout, PixelLayout::Rgb8);
    assert_eq!(decoded, pixels);
}

#[test]
fn rgba8_roundtrip() {
    let pixels = vec![
        255, 0, 0, 255, 0, 255, 0, 128, // row 0
        0, 0, 255, 0, 128, 128, 128, 255, // row 1
    ];

    let encoded = encode(&pixels, 2, 2, PixelLayout::Rgba8, Unstoppable).unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.layout(), PixelLayout::Rgba8);
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn gray16_roundtrip() {
    let mut pixels = Vec::new();
    for v in [0u16, 1, 256, 65535, 4660, 4660] {
        pixels.extend_from_slice(&v.to_ne_bytes());
    }

    let encoded = encode(&pixels, 3, 2, PixelLayout::Gray16, Unstoppable).unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.layout(), PixelLayout::Gray16);
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn image_info_probe() {
    let pixels = vec![7u8; 2 * 5 * 2];
    let encoded = EncodeRequest::new()
        .with_author("lighting")
        .with_date("Mon Oct 19 2026")
        .encode(&pixels, 5, 2, PixelLayout::GrayAlpha8, Unstoppable)
        .unwrap();

    let info = ImageInfo::from_bytes(&encoded).unwrap();
    assert_eq!(info.width, 5);
    assert_eq!(info.height, 2);
    assert_eq!(info.layout, PixelLayout::GrayAlpha8);
    assert_eq!(info.tiles, 1);
    assert_eq!(info.author.as_deref(), Some("lighting"));
    assert_eq!(info.date.as_deref(), Some("Mon Oct 19 2026"));
}

#[test]
fn extension_selects_compression() {
    let pixels = vec![9u8; 64];
    let z = EncodeRequest::for_extension("z")
        .encode(&pixels, 8, 8, PixelLayout::Gray8, Unstoppable)
        .unwrap();
    let iff = EncodeRequest::for_extension(".iff")
        .encode(&pixels, 8, 8, PixelLayout::Gray8, Unstoppable)
        .unwrap();
    assert!(z.len() < iff.len());
    assert_eq!(
        ImageInfo::from_bytes(&z).unwrap().compression,
        Compression::Rle
    );
    assert_eq!(
        ImageInfo::from_bytes(&iff).unwrap().compression,
        Compression::None
    );
    assert_eq!(decode(&z, Unstoppable).unwrap().pixels(), &pixels[..]);
    assert_eq!(decode(&iff, Unstoppable).unwrap().pixels(), &pixels[..]);
}

#[test]
fn decode_into_caller_buffer() {
    let pixels: Vec<u8> = (0..4 * 3 * 3).map(|i| i as u8).collect();
    let encoded = encode(&pixels, 4, 3, PixelLayout::Rgb8, Unstoppable).unwrap();

    let mut buf = vec![0xaa; pixels.len() + 5];
    let info = DecodeRequest::new(&encoded)
        .decode_into(&mut buf, Unstoppable)
        .unwrap();
    assert_eq!(info.buffer_len(), Some(pixels.len()));
    assert_eq!(&buf[..pixels.len()], &pixels[..]);
    assert_eq!(&buf[pixels.len()..], &[0xaa; 5]);

    let mut short = vec![0; pixels.len() - 1];
    match DecodeRequest::new(&encoded).decode_into(&mut short, Unstoppable) {
        Err(IffError::BufferTooSmall { needed, actual }) => {
            assert_eq!(needed, pixels.len());
            assert_eq!(actual, pixels.len() - 1);
        }
        other => panic!("expected BufferTooSmall, got {other:?}"),
    }
}

#[test]
fn limits_reject_large() {
    let pixels = vec![255u8; 6];
    let encoded = encode(&pixels, 1, 2, PixelLayout::Rgb8, Unstoppable).unwrap();

    let limits = Limits {
        max_pixels: Some(1),
        ..Default::default()
    };

    let result = DecodeRequest::new(&encoded)
        .with_limits(&limits)
        .decode(Unstoppable);
    match result.unwrap_err() {
        IffError::LimitExceeded(_) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }

    let limits = Limits {
        max_memory_bytes: Some(5),
        ..Default::default()
    };
    assert!(matches!(
        DecodeRequest::new(&encoded)
            .with_limits(&limits)
            .decode(Unstoppable),
        Err(IffError::LimitExceeded(_))
    ));
}

#[cfg(feature = "rgb")]
#[test]
fn typed_pixel_view() {
    let pixels = vec![1, 2, 3, 4, 5, 6];
    let encoded = encode(&pixels, 2, 1, PixelLayout::Rgb8, Unstoppable).unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();

    let typed: &[rgb::RGB8] = decoded.as_pixels().unwrap();
    assert_eq!(typed[1], rgb::RGB8::new(4, 5, 6));
    assert!(matches!(
        decoded.as_pixels::<rgb::RGBA8>(),
        Err(IffError::LayoutMismatch { .. })
    ));
}

#[cfg(feature = "rgb")]
#[test]
fn typed_gray_views() {
    let gray = encode(&[10, 20, 30], 3, 1, PixelLayout::Gray8, Unstoppable).unwrap();
    let decoded = decode(&gray, Unstoppable).unwrap();
    let typed: &[rgb::alt::Gray<u8>] = decoded.as_pixels().unwrap();
    assert_eq!(typed.len(), 3);
    assert_eq!(typed[2].0, 30);

    let gray_alpha = encode(&[1, 2, 3, 4], 2, 1, PixelLayout::GrayAlpha8, Unstoppable).unwrap();
    let decoded = decode(&gray_alpha, Unstoppable).unwrap();
    let typed: &[rgb::alt::GrayAlpha<u8>] = decoded.as_pixels().unwrap();
    assert_eq!((typed[1].0, typed[1].1), (3, 4));
    assert!(matches!(
        decoded.as_pixels::<rgb::alt::Gray<u8>>(),
        Err(IffError::LayoutMismatch { .. })
    ));
}
