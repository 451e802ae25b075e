//! Frame buffer for accumulating ring bytes and extracting units.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Decoding is destructive and order-preserving: each call to
//! [`FrameBuffer::decode`] removes exactly one unit from the front and leaves
//! the unread bytes in place. A partial data frame stays buffered until its
//! ETX arrives.
//!
//! Bytes that cannot start a unit are skipped up to the next ETX (consumed),
//! STX or SYN (both kept) and reported as [`Frame::Corrupt`], so the parser
//! always resynchronises instead of failing.
//!
//! # Example
//!
//! ```
//! use tokring::protocol::{Decoded, Frame, FrameBuffer};
//!
//! let mut buffer = FrameBuffer::new();
//! buffer.push(b"XYZ@AB-hi~^").unwrap();
//!
//! assert!(matches!(buffer.decode(), Decoded::Frame(Frame::Corrupt { .. })));
//! assert!(matches!(buffer.decode(), Decoded::Frame(Frame::Data { .. })));
//! assert!(matches!(buffer.decode(), Decoded::Frame(Frame::Token)));
//! assert!(matches!(buffer.decode(), Decoded::Empty));
//! ```

use bytes::BytesMut;

use super::frame::Frame;
use super::wire_format::{
    StationId, DEST_POS, ETX, NUL, PAYLOAD_POS, SEPARATOR, SEPARATOR_POS, SRC_POS, STX, SYN,
};
use crate::error::{Result, TokenRingError};

/// Default buffer capacity (16 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 16 * 1024;

/// Result of a single decode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// No complete unit available. Partial bytes, if any, are retained.
    Empty,
    /// One unit was removed from the front of the buffer.
    Frame(Frame),
}

/// Bounded buffer of concatenated wire units.
#[derive(Debug)]
pub struct FrameBuffer {
    /// Buffered bytes, oldest first.
    buffer: BytesMut,
    /// Maximum number of bytes the buffer may hold.
    capacity: usize,
}

impl FrameBuffer {
    /// Create a new frame buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a new frame buffer bounded to `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity.min(DEFAULT_BUFFER_CAPACITY)),
            capacity,
        }
    }

    /// Append raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::BufferOverflow`] if the bytes do not fit;
    /// the buffer is left unchanged.
    pub fn push(&mut self, data: &[u8]) -> Result<()> {
        self.reserve_for(data.len())?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Append one encoded frame.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::BufferOverflow`] if the frame does not fit.
    pub fn push_frame(&mut self, frame: &Frame) -> Result<()> {
        self.reserve_for(frame.encoded_len())?;
        frame.encode_into(&mut self.buffer);
        Ok(())
    }

    fn reserve_for(&self, additional: usize) -> Result<()> {
        let needed = self.buffer.len() + additional;
        if needed > self.capacity {
            return Err(TokenRingError::BufferOverflow {
                needed,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Remove and return the unit at the front of the buffer.
    pub fn decode(&mut self) -> Decoded {
        let Some(&first) = self.buffer.first() else {
            return Decoded::Empty;
        };

        match first {
            SYN => {
                let _ = self.buffer.split_to(1);
                Decoded::Frame(Frame::Token)
            }
            STX => self.decode_data(),
            _ => Decoded::Frame(self.skip_garbage()),
        }
    }

    /// Decode the STX..ETX span at the front, or wait for more bytes.
    fn decode_data(&mut self) -> Decoded {
        let Some(end) = self.buffer.iter().position(|&b| b == ETX) else {
            return Decoded::Empty;
        };

        let span = self.buffer.split_to(end + 1).freeze();
        let well_formed = span.len() > PAYLOAD_POS
            && span[SEPARATOR_POS] == SEPARATOR
            && !span[PAYLOAD_POS..end].contains(&NUL);

        if !well_formed {
            return Decoded::Frame(Frame::Corrupt { skipped: span });
        }

        Decoded::Frame(Frame::Data {
            dest: StationId::from_wire(span[DEST_POS]),
            src: StationId::from_wire(span[SRC_POS]),
            payload: span.slice(PAYLOAD_POS..end),
        })
    }

    /// Skip bytes that cannot start a unit.
    fn skip_garbage(&mut self) -> Frame {
        let stop = self
            .buffer
            .iter()
            .position(|&b| matches!(b, ETX | STX | SYN));

        let len = match stop {
            Some(i) if self.buffer[i] == ETX => i + 1,
            Some(i) => i,
            None => self.buffer.len(),
        };

        Frame::Corrupt {
            skipped: self.buffer.split_to(len).freeze(),
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffered bytes, oldest first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn station_id() -> impl Strategy<Value = StationId> {
        (0x21u8..0x7f)
            .prop_filter("not a delimiter", |b| !matches!(*b, SYN | STX | ETX))
            .prop_map(|b| StationId::new(b).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn decode_inverts_encode(
            dest in station_id(),
            src in station_id(),
            payload in proptest::collection::vec(any::<u8>().prop_filter("no ETX/NUL", |b| *b != ETX && *b != NUL), 0..64),
            trailer in proptest::collection::vec(any::<u8>(), 0..16),
        ) {
            let frame = Frame::data(dest, src, payload.clone()).unwrap();
            let mut buffer = FrameBuffer::new();
            buffer.push_frame(&frame).unwrap();
            buffer.push(&trailer).unwrap();

            prop_assert_eq!(buffer.decode(), Decoded::Frame(frame));
            prop_assert_eq!(buffer.as_bytes(), &trailer[..]);
        }
    }
}
