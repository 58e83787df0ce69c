#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic, whatever the input
    let _ = zeniff::ImageInfo::from_bytes(data);
    let _ = zeniff::decode(data, enough::Unstoppable);
    let _ = zeniff::DecodeRequest::new(data)
        .with_strictness(zeniff::IffStrictness::Strict)
        .decode(enough::Unstoppable);

    // Chunk walking alone must terminate without panicking
    for chunk in zeniff::iff::chunk::ChunkReader::new(data) {
        let Ok(chunk) = chunk else { break };
        if let Ok(children) = chunk.children() {
            for child in children {
                if child.is_err() {
                    break;
                }
            }
        }
    }
});
