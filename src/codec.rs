//! Length-prefix frame codec for the record log.
//!
//! Wire format:
//! ```text
//! ┌────────────┬────────────────────────────┐
//! │ Length (4B)│ postcard record (N B)      │
//! │ LE u32     │                            │
//! └────────────┴────────────────────────────┘
//! ```
//!
//! The decoder accumulates bytes and yields complete frames, so a reader
//! can feed it arbitrary chunks: part of a header, part of a payload, or
//! several frames at once.  A zero or oversized length resets the
//! decoder and resynchronises on the following bytes.

/// Maximum frame payload size.
pub const MAX_FRAME_SIZE: usize = 4096;

/// Frame header size (4-byte little-endian length).
pub const HEADER_SIZE: usize = 4;

enum DecoderState {
    ReadingHeader { collected: usize },
    ReadingPayload { expected: usize, collected: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    header_buf: [u8; HEADER_SIZE],
    payload_buf: Box<[u8; MAX_FRAME_SIZE]>,
    rejected: u64,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingHeader { collected: 0 },
            header_buf: [0; HEADER_SIZE],
            payload_buf: Box::new([0; MAX_FRAME_SIZE]),
            rejected: 0,
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns the number of bytes consumed and, when one completed, the
    /// frame payload.  Call again with the unconsumed tail to continue.
    pub fn feed(&mut self, data: &[u8]) -> (usize, Option<&[u8]>) {
        let mut offset = 0;

        while offset < data.len() {
            match &mut self.state {
                DecoderState::ReadingHeader { collected } => {
                    let to_copy = (HEADER_SIZE - *collected).min(data.len() - offset);
                    self.header_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == HEADER_SIZE {
                        let expected = u32::from_le_bytes(self.header_buf) as usize;
                        if expected == 0 || expected > MAX_FRAME_SIZE {
                            self.rejected += 1;
                            self.state = DecoderState::ReadingHeader { collected: 0 };
                            continue;
                        }
                        self.state = DecoderState::ReadingPayload {
                            expected,
                            collected: 0,
                        };
                    }
                }

                DecoderState::ReadingPayload { expected, collected } => {
                    let to_copy = (*expected - *collected).min(data.len() - offset);
                    self.payload_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let len = *expected;
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                        return (offset, Some(&self.payload_buf[..len]));
                    }
                }
            }
        }

        (offset, None)
    }

    /// Headers dropped for a zero or oversized length.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// True when no partial frame is buffered.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::ReadingHeader { collected: 0 })
    }

    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingHeader { collected: 0 };
    }
}

/// Append `[LE-u32 length][payload]` to `out`.  `None` if the payload is
/// empty or larger than [`MAX_FRAME_SIZE`].
pub fn encode_frame(payload: &[u8], out: &mut Vec<u8>) -> Option<usize> {
    if payload.is_empty() || payload.len() > MAX_FRAME_SIZE {
        return None;
    }
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    Some(HEADER_SIZE + payload.len())
}
