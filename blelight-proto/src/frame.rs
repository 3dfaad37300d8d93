//! Notification frame decoding
//!
//! A notification payload is zero or more frames back to back with no padding:
//!
//! ```text
//! +----+----+-----+---------------------------+--------+--------+
//! | 4C | 54 | len | body[0..len-2]            | crc_hi | crc_lo |
//! +----+----+-----+---------------------------+--------+--------+
//! ```
//!
//! The checksum covers magic, length and body. Each frame advances the cursor
//! by `3 + len` bytes.

use crate::{
    CHECKSUM_LEN, Condition, FRAME_HEADER_LEN, MAGIC, MAX_FRAME_SIZE, MIN_FRAME_LEN,
    REPORT_PREFIX, StateReport, checksum,
};

/// One item decoded from a notification buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Report(StateReport),
    Condition(Condition),
}

/// Decode one notification buffer.
///
/// Lazy: frames are validated as the iterator is advanced. Nothing is kept
/// between buffers; see [`Reassembler`] for carrying split frames over.
pub fn decode(buf: &[u8]) -> Frames<'_> {
    Frames {
        buf,
        pos: 0,
        pending: None,
        truncated: false,
    }
}

/// Iterator over the frames of one buffer, see [`decode`]
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    buf: &'a [u8],
    pos: usize,
    pending: Option<StateReport>,
    truncated: bool,
}

impl<'a> Frames<'a> {
    /// Bytes left unparsed after a `TruncatedFrame`, empty otherwise
    pub fn remainder(&self) -> &'a [u8] {
        let buf: &'a [u8] = self.buf;
        if self.truncated {
            &buf[self.pos..]
        } else {
            &[]
        }
    }

    fn truncate(&mut self, needed: usize) -> Decoded {
        self.truncated = true;
        Decoded::Condition(Condition::TruncatedFrame {
            offset: self.pos,
            needed,
            available: self.buf.len() - self.pos,
        })
    }
}

/// Could a frame start here? A lone trailing 0x4C counts.
fn at_frame_start(rest: &[u8]) -> bool {
    rest.starts_with(&MAGIC) || (!rest.is_empty() && MAGIC.starts_with(rest))
}

impl Iterator for Frames<'_> {
    type Item = Decoded;

    fn next(&mut self) -> Option<Decoded> {
        if let Some(report) = self.pending.take() {
            return Some(Decoded::Report(report));
        }
        if self.truncated || self.pos >= self.buf.len() {
            return None;
        }

        let offset = self.pos;
        let rest = &self.buf[offset..];

        if !at_frame_start(rest) {
            // resync on the next magic
            let skipped = (1..rest.len())
                .find(|&i| at_frame_start(&rest[i..]))
                .unwrap_or(rest.len());
            self.pos += skipped;
            return Some(Decoded::Condition(Condition::HeaderMismatch { offset, skipped }));
        }

        if rest.len() < FRAME_HEADER_LEN {
            return Some(self.truncate(FRAME_HEADER_LEN));
        }

        let length = rest[2];
        let total = FRAME_HEADER_LEN + length as usize;
        if rest.len() < total {
            return Some(self.truncate(total));
        }
        self.pos += total;

        if length < MIN_FRAME_LEN {
            return Some(Decoded::Condition(Condition::FrameTooShort { offset, length }));
        }

        let (signed, crc) = rest[..total].split_at(total - CHECKSUM_LEN);
        let expected = checksum(signed);
        if expected != crc {
            return Some(Decoded::Condition(Condition::ChecksumMismatch {
                offset,
                expected: u16::from_be_bytes(expected),
                actual: u16::from_be_bytes([crc[0], crc[1]]),
            }));
        }

        let body = &signed[FRAME_HEADER_LEN..];
        let (prefix, payload) = body.split_at(REPORT_PREFIX.len());
        // MIN_FRAME_LEN guarantees a category byte
        let report = StateReport::from_payload(payload)?;

        if prefix != REPORT_PREFIX {
            self.pending = Some(report);
            return Some(Decoded::Condition(Condition::UnrecognizedPrefix {
                offset,
                found: [prefix[0], prefix[1]],
            }));
        }

        Some(Decoded::Report(report))
    }
}

/// Frame a report the way the light does (prefix, length and checksum)
pub fn encode_frame(report: &StateReport) -> Vec<u8> {
    let payload = report.to_payload();
    let length = REPORT_PREFIX.len() + payload.len() + CHECKSUM_LEN;
    let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + length);
    buf.extend_from_slice(&MAGIC);
    buf.push(length as u8);
    buf.extend_from_slice(&REPORT_PREFIX);
    buf.extend_from_slice(&payload);
    let crc = checksum(&buf);
    buf.extend_from_slice(&crc);
    buf
}

/// Decoder that keeps a truncated tail and prepends it to the next buffer.
///
/// Frames split across two notifications survive instead of being dropped.
#[derive(Debug, Default)]
pub struct Reassembler {
    carry: Vec<u8>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            carry: Vec::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Decode `data` after whatever was carried from the previous call.
    ///
    /// If the carried frame does not check out once completed, its
    /// continuation was lost; the carry is dropped and `data` decoded alone.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Decoded> {
        if self.carry.is_empty() {
            return self.decode_keeping_tail(data);
        }

        let carried = std::mem::take(&mut self.carry);
        let mut joined = carried.clone();
        joined.extend_from_slice(data);

        let out = self.decode_keeping_tail(&joined);
        if !completes_carried_frame(&out) {
            tracing::debug!(dropped = carried.len(), "stale partial frame");
            return self.decode_keeping_tail(data);
        }
        out
    }

    fn decode_keeping_tail(&mut self, buf: &[u8]) -> Vec<Decoded> {
        let mut out = Vec::new();
        let mut frames = decode(buf);
        for item in frames.by_ref() {
            match item {
                Decoded::Condition(Condition::TruncatedFrame { needed, available, .. }) => {
                    tracing::trace!(needed, available, "carrying partial frame");
                }
                other => out.push(other),
            }
        }
        self.carry = frames.remainder().to_vec();
        out
    }

    pub fn buffered_len(&self) -> usize {
        self.carry.len()
    }

    pub fn clear(&mut self) {
        self.carry.clear();
    }
}

/// The carried bytes start a frame at offset 0; it must not be rejected there
fn completes_carried_frame(items: &[Decoded]) -> bool {
    !matches!(
        items.first(),
        Some(Decoded::Condition(
            Condition::ChecksumMismatch { offset: 0, .. }
                | Condition::FrameTooShort { offset: 0, .. }
                | Condition::HeaderMismatch { offset: 0, .. }
        ))
    )
}
