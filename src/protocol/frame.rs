//! Frame type with encoding.
//!
//! A [`Frame`] is one self-delimited unit on the ring: the token, a data
//! frame, or a run of bytes that could not be parsed.
//! Uses `bytes::Bytes` for zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use tokring::protocol::{Frame, StationId};
//!
//! let dest = StationId::try_from('C').unwrap();
//! let src = StationId::try_from('A').unwrap();
//! let frame = Frame::data(dest, src, "hello").unwrap();
//!
//! assert_eq!(&frame.encode()[..], b"@CA-hello~");
//! assert_eq!(&Frame::Token.encode()[..], b"^");
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{
    is_valid_payload, StationId, ACK_PAYLOAD, ETX, FRAME_OVERHEAD, SEPARATOR, STX, SYN,
};
use crate::error::{Result, TokenRingError};

/// One unit read from or written to the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The circulating token.
    Token,
    /// An addressed data frame.
    Data {
        /// Destination station.
        dest: StationId,
        /// Originating station.
        src: StationId,
        /// Payload bytes (no ETX, no NUL).
        payload: Bytes,
    },
    /// Bytes skipped while resynchronising after corruption.
    Corrupt {
        /// The discarded bytes.
        skipped: Bytes,
    },
}

impl Frame {
    /// Build a data frame, validating the payload.
    pub fn data(dest: StationId, src: StationId, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if !is_valid_payload(&payload) {
            return Err(TokenRingError::Framing(format!(
                "Payload for {} contains ETX or NUL",
                dest
            )));
        }
        Ok(Frame::Data { dest, src, payload })
    }

    /// Build an acknowledgement addressed to `dest`.
    pub fn ack(dest: StationId, src: StationId) -> Self {
        Frame::Data {
            dest,
            src,
            payload: Bytes::from_static(ACK_PAYLOAD),
        }
    }

    /// Check if this is the token.
    #[inline]
    pub fn is_token(&self) -> bool {
        matches!(self, Frame::Token)
    }

    /// Check if this is an acknowledgement data frame.
    #[inline]
    pub fn is_ack(&self) -> bool {
        matches!(self, Frame::Data { payload, .. } if &payload[..] == ACK_PAYLOAD)
    }

    /// Number of bytes this frame occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match self {
            Frame::Token => 1,
            Frame::Data { payload, .. } => FRAME_OVERHEAD + payload.len(),
            Frame::Corrupt { skipped } => skipped.len(),
        }
    }

    /// Append the wire encoding to `dst`.
    ///
    /// A `Corrupt` frame encodes to the bytes it skipped.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        match self {
            Frame::Token => dst.put_u8(SYN),
            Frame::Data { dest, src, payload } => {
                dst.put_u8(STX);
                dst.put_u8(dest.as_byte());
                dst.put_u8(src.as_byte());
                dst.put_u8(SEPARATOR);
                dst.extend_from_slice(payload);
                dst.put_u8(ETX);
            }
            Frame::Corrupt { skipped } => dst.extend_from_slice(skipped),
        }
    }

    /// Encode to a standalone buffer.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}
