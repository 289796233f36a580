//! Fuzz target: `FrameDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder and
//! asserts that it never panics, always makes progress, and never yields
//! an empty or oversized payload.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitalguard::codec::{FrameDecoder, MAX_FRAME_SIZE};

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();

    let mut rest = data;
    while !rest.is_empty() {
        let (used, frame) = decoder.feed(rest);
        if let Some(payload) = frame {
            assert!(payload.len() <= MAX_FRAME_SIZE, "payload exceeds MAX_FRAME_SIZE");
            assert!(!payload.is_empty(), "decoder must not yield empty payload");
        }
        assert!(used > 0, "decoder stalled");
        rest = &rest[used..];
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    assert!(decoder.is_idle());
    let _ = decoder.feed(data);
});
