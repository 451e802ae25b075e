//! Per-station transmit and receive queues.
//!
//! Both queues are [`FrameBuffer`]s holding encoded frames, so their content
//! is always a concatenation of self-delimited units and extraction is FIFO.
//! Appends beyond the configured capacity are rejected with
//! [`TokenRingError::BufferOverflow`](crate::TokenRingError::BufferOverflow),
//! never truncated.

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Decoded, Frame, FrameBuffer, StationId, DEFAULT_BUFFER_CAPACITY};

/// A captured message waiting for the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// Station that sent the message.
    pub src: StationId,
    /// Message payload.
    pub payload: Bytes,
}

/// Transmit-pending and receive-pending queues of one station.
#[derive(Debug)]
pub struct StationBuffer {
    tx: FrameBuffer,
    rx: FrameBuffer,
}

impl StationBuffer {
    /// Create empty queues with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create empty queues, each bounded to `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tx: FrameBuffer::with_capacity(capacity),
            rx: FrameBuffer::with_capacity(capacity),
        }
    }

    /// Append one frame to transmit-pending.
    pub fn enqueue(&mut self, frame: &Frame) -> Result<()> {
        self.tx.push_frame(frame)
    }

    /// Pop the oldest frame waiting for the token.
    pub fn next_outgoing(&mut self) -> Option<Frame> {
        match self.tx.decode() {
            Decoded::Frame(frame) => Some(frame),
            Decoded::Empty => None,
        }
    }

    /// Append a received frame to receive-pending.
    pub fn capture(&mut self, frame: &Frame) -> Result<()> {
        self.rx.push_frame(frame)
    }

    /// Pop the oldest captured message.
    pub fn receive(&mut self) -> Option<Received> {
        loop {
            match self.rx.decode() {
                Decoded::Frame(Frame::Data { src, payload, .. }) => {
                    return Some(Received { src, payload })
                }
                // Only data frames are ever captured.
                Decoded::Frame(_) => continue,
                Decoded::Empty => return None,
            }
        }
    }

    /// Check if a frame is waiting for the token.
    pub fn has_outgoing(&self) -> bool {
        !self.tx.is_empty()
    }

    /// Check if a captured message is waiting.
    pub fn has_received(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Encoded bytes waiting in transmit-pending.
    pub fn tx_bytes(&self) -> &[u8] {
        self.tx.as_bytes()
    }

    /// Encoded bytes waiting in receive-pending.
    pub fn rx_bytes(&self) -> &[u8] {
        self.rx.as_bytes()
    }
}

impl Default for StationBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenRingError;

    fn id(c: char) -> StationId {
        StationId::try_from(c).unwrap()
    }

    #[test]
    fn test_new_buffers_are_empty() {
        let buffer = StationBuffer::new();
        assert!(!buffer.has_outgoing());
        assert!(!buffer.has_received());
        assert!(buffer.tx_bytes().is_empty());
        assert!(buffer.rx_bytes().is_empty());
    }

    #[test]
    fn test_outgoing_is_fifo() {
        let mut buffer = StationBuffer::new();
        let first = Frame::data(id('C'), id('A'), "one").unwrap();
        let second = Frame::ack(id('B'), id('A'));
        let third = Frame::data(id('C'), id('A'), "two").unwrap();

        buffer.enqueue(&first).unwrap();
        buffer.enqueue(&second).unwrap();
        buffer.enqueue(&third).unwrap();
        assert_eq!(buffer.tx_bytes(), b"@CA-one~@BA-Ack~@CA-two~");

        assert_eq!(buffer.next_outgoing(), Some(first));
        assert_eq!(buffer.next_outgoing(), Some(second));
        assert_eq!(buffer.next_outgoing(), Some(third));
        assert_eq!(buffer.next_outgoing(), None);
    }

    #[test]
    fn test_capture_then_receive() {
        let mut buffer = StationBuffer::new();
        buffer
            .capture(&Frame::data(id('C'), id('A'), "hello").unwrap())
            .unwrap();

        assert!(buffer.has_received());
        let received = buffer.receive().unwrap();
        assert_eq!(received.src, id('A'));
        assert_eq!(&received.payload[..], b"hello");
        assert!(buffer.receive().is_none());
    }

    #[test]
    fn test_enqueue_overflow_rejected() {
        let mut buffer = StationBuffer::with_capacity(10);
        buffer.enqueue(&Frame::ack(id('B'), id('A'))).unwrap();

        let result = buffer.enqueue(&Frame::ack(id('C'), id('A')));
        assert!(matches!(
            result,
            Err(TokenRingError::BufferOverflow { needed: 16, capacity: 10 })
        ));
        assert_eq!(buffer.tx_bytes(), b"@BA-Ack~");
    }

    #[test]
    fn test_capture_overflow_rejected() {
        let mut buffer = StationBuffer::with_capacity(4);
        let result = buffer.capture(&Frame::data(id('B'), id('A'), "x").unwrap());
        assert!(result.is_err());
        assert!(!buffer.has_received());
    }
}
