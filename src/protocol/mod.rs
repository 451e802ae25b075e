//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the ring's byte-oriented framing:
//! - delimiter constants and station identifiers
//! - [`Frame`] with encoding
//! - [`FrameBuffer`] for destructive, resynchronising decoding

mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::Frame;
pub use frame_buffer::{Decoded, FrameBuffer, DEFAULT_BUFFER_CAPACITY};
pub use wire_format::{
    is_valid_payload, StationId, ACK_PAYLOAD, DEST_POS, ETX, FRAME_OVERHEAD, NUL, PAYLOAD_POS,
    SEPARATOR, SEPARATOR_POS, SRC_POS, STX, SYN,
};
