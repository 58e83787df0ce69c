#![no_main]
use libfuzzer_sys::fuzz_target;
use zeniff::*;

fuzz_target!(|data: &[u8]| {
    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let Ok(decoded) = decode(data, enough::Unstoppable) else {
        return;
    };

    for compression in [Compression::Rle, Compression::None] {
        let reencoded = EncodeRequest::new()
            .with_compression(compression)
            .encode(
                decoded.pixels(),
                decoded.width(),
                decoded.height(),
                decoded.layout(),
                enough::Unstoppable,
            )
            .expect("decoded image failed to re-encode");
        let Ok(decoded2) = decode(&reencoded, enough::Unstoppable) else {
            panic!("re-encoded data failed to decode");
        };

        assert_eq!(decoded.pixels(), decoded2.pixels(), "roundtrip pixel mismatch");
        assert_eq!(decoded.width(), decoded2.width());
        assert_eq!(decoded.height(), decoded2.height());
        assert_eq!(decoded.layout(), decoded2.layout());
    }

    // The run-length codec on its own
    let mut packed = Vec::new();
    iff::rle::encode(data, &mut packed);
    let mut out = vec![0u8; data.len()];
    iff::rle::decode(&packed, &mut out).expect("rle roundtrip failed");
    assert_eq!(out, data);
});
