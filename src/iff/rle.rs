//! Packet run-length coding used for IFF channel data.
//!
//! Each packet starts with a header byte. With the high bit set, the next
//! byte is repeated `(header & 0x7f) + 1` times. With it clear, the next
//! `(header & 0x7f) + 1` bytes are copied verbatim.

use alloc::format;
use alloc::vec::Vec;
use core::ops::Range;

use crate::error::IffError;

/// Largest number of bytes a single packet can produce.
pub const MAX_PACKET: usize = 128;

const REPLICATE: u8 = 0x80;

/// Tracks how much of a run's output quota has been produced.
#[derive(Clone, Copy, Debug)]
pub struct RunState {
    expected: usize,
    produced: usize,
}

impl RunState {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            produced: 0,
        }
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn remaining(&self) -> usize {
        self.expected - self.produced
    }

    pub fn is_complete(&self) -> bool {
        self.produced == self.expected
    }

    /// Reserve the output range for a packet of `count` bytes.
    pub fn claim(&mut self, count: usize) -> Result<Range<usize>, IffError> {
        if count > self.remaining() {
            return Err(IffError::CorruptRun {
                packet: count,
                remaining: self.remaining(),
            });
        }
        let start = self.produced;
        self.produced += count;
        Ok(start..self.produced)
    }
}

/// Decode packets from `input` until `out` is exactly filled.
///
/// Returns the number of input bytes consumed.
pub fn decode(input: &[u8], out: &mut [u8]) -> Result<usize, IffError> {
    let mut state = RunState::new(out.len());
    let mut pos = 0;

    while !state.is_complete() {
        let header = *input.get(pos).ok_or_else(|| truncated(&state))?;
        let count = usize::from(header & 0x7f) + 1;

        if header & REPLICATE != 0 {
            let value = *input.get(pos + 1).ok_or_else(|| truncated(&state))?;
            let range = state.claim(count)?;
            out[range].fill(value);
            pos += 2;
        } else {
            let literal = input
                .get(pos + 1..pos + 1 + count)
                .ok_or_else(|| truncated(&state))?;
            let range = state.claim(count)?;
            out[range].copy_from_slice(literal);
            pos += 1 + count;
        }
    }

    Ok(pos)
}

fn truncated(state: &RunState) -> IffError {
    IffError::TruncatedData(format!(
        "run ended after {} of {} bytes",
        state.produced(),
        state.produced() + state.remaining()
    ))
}

/// Worst-case encoded size for `n` input bytes.
pub fn encoded_len_bound(n: usize) -> usize {
    n + n.div_ceil(MAX_PACKET)
}

/// Append the packet encoding of `input` to `out`.
pub fn encode(input: &[u8], out: &mut Vec<u8>) {
    let mut literal_start = 0;
    let mut i = 0;

    while i < input.len() {
        let run = run_length(&input[i..]);
        let pending = i - literal_start;
        if run >= 3 || (run == 2 && pending == 0) {
            flush_literal(&input[literal_start..i], out);
            out.push(REPLICATE | (run - 1) as u8);
            out.push(input[i]);
            i += run;
            literal_start = i;
        } else {
            i += 1;
            if i - literal_start == MAX_PACKET {
                flush_literal(&input[literal_start..i], out);
                literal_start = i;
            }
        }
    }
    flush_literal(&input[literal_start..], out);
}

/// Number of leading bytes equal to the first, capped at one packet.
fn run_length(data: &[u8]) -> usize {
    let first = data[0];
    data.iter()
        .take(MAX_PACKET)
        .take_while(|&&b| b == first)
        .count()
}

fn flush_literal(literal: &[u8], out: &mut Vec<u8>) {
    for chunk in literal.chunks(MAX_PACKET) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
}
