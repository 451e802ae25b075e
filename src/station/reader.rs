//! Ring input reader.
//!
//! Each station owns one [`StreamReader`] holding the bytes it has read but
//! not yet decoded. The reader only touches the underlying stream when no
//! complete unit is buffered, which makes the read call the station's single
//! suspension point.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::protocol::{Decoded, Frame, FrameBuffer, DEFAULT_BUFFER_CAPACITY};

/// Size of a single read from the ring input.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Decoding reader over a station's ring-facing input.
pub struct StreamReader<R> {
    /// Underlying input stream.
    reader: R,
    /// Bytes read but not yet decoded.
    pending: FrameBuffer,
    /// Read buffer.
    chunk: Vec<u8>,
    /// Set once the input returned end of stream.
    closed: bool,
}

impl<R> StreamReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Wrap an input stream with the default pending capacity.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_CAPACITY)
    }

    /// Wrap an input stream, bounding pending bytes to `capacity`.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            reader,
            pending: FrameBuffer::with_capacity(capacity),
            chunk: vec![0u8; READ_CHUNK_SIZE.min(capacity)],
            closed: false,
        }
    }

    /// Next unit from the ring, or `None` once the input is closed.
    ///
    /// Corrupt runs are returned as [`Frame::Corrupt`] so the caller can
    /// report them; scanning continues on the next call.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if reading the input fails.
    pub async fn next_unit(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Decoded::Frame(frame) = self.pending.decode() {
                return Ok(Some(frame));
            }
            if self.closed {
                return Ok(None);
            }

            let room = self.pending.capacity() - self.pending.len();
            if room == 0 {
                // An open frame that never closes; drop it and start over.
                tracing::warn!(
                    "Discarding {} pending bytes: unterminated frame fills capacity {}",
                    self.pending.len(),
                    self.pending.capacity()
                );
                self.pending.clear();
                continue;
            }

            let limit = room.min(self.chunk.len());
            let n = self.reader.read(&mut self.chunk[..limit]).await?;
            if n == 0 {
                self.closed = true;
                if !self.pending.is_empty() {
                    tracing::warn!(
                        "Ring input closed with {} undecoded bytes",
                        self.pending.len()
                    );
                    self.pending.clear();
                }
                return Ok(None);
            }

            // Never exceeds capacity: the read was bounded by the free room.
            if let Err(e) = self.pending.push(&self.chunk[..n]) {
                tracing::warn!("Discarding read chunk: {}", e);
            }
        }
    }

    /// Check if the input has reached end of stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of bytes read but not yet decoded.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StationId;
    use tokio::io::{duplex, AsyncWriteExt};

    fn id(c: char) -> StationId {
        StationId::try_from(c).unwrap()
    }

    #[tokio::test]
    async fn test_units_from_single_read() {
        let mut reader = StreamReader::new(&b"^@CA-hi~"[..]);

        assert_eq!(reader.next_unit().await.unwrap(), Some(Frame::Token));
        assert_eq!(
            reader.next_unit().await.unwrap(),
            Some(Frame::data(id('C'), id('A'), "hi").unwrap())
        );
        assert_eq!(reader.next_unit().await.unwrap(), None);
        assert!(reader.is_closed());
    }

    #[tokio::test]
    async fn test_frame_split_across_reads() {
        let (mut tx, rx) = duplex(64);
        let mut reader = StreamReader::new(rx);

        let task = tokio::spawn(async move {
            tx.write_all(b"@DB-spl").await.unwrap();
            tx.flush().await.unwrap();
            tokio::task::yield_now().await;
            tx.write_all(b"it~").await.unwrap();
        });

        let unit = reader.next_unit().await.unwrap();
        assert_eq!(unit, Some(Frame::data(id('D'), id('B'), "split").unwrap()));
        task.await.unwrap();
        assert_eq!(reader.next_unit().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corruption_is_reported_not_fatal() {
        let mut reader = StreamReader::new(&b"XYZ@AB-hi~^"[..]);

        assert!(matches!(
            reader.next_unit().await.unwrap(),
            Some(Frame::Corrupt { .. })
        ));
        assert!(matches!(
            reader.next_unit().await.unwrap(),
            Some(Frame::Data { .. })
        ));
        assert_eq!(reader.next_unit().await.unwrap(), Some(Frame::Token));
    }

    #[tokio::test]
    async fn test_partial_frame_dropped_at_eof() {
        let mut reader = StreamReader::new(&b"^@CA-unterminated"[..]);

        assert_eq!(reader.next_unit().await.unwrap(), Some(Frame::Token));
        assert_eq!(reader.next_unit().await.unwrap(), None);
        assert_eq!(reader.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_unterminated_frame_beyond_capacity_is_discarded() {
        let mut input = b"@CA-".to_vec();
        input.extend(std::iter::repeat(b'x').take(40));
        input.extend_from_slice(b"~^");
        let mut reader = StreamReader::with_capacity(&input[..], 16);

        let mut units = Vec::new();
        while let Some(unit) = reader.next_unit().await.unwrap() {
            units.push(unit);
        }

        assert_eq!(units.last(), Some(&Frame::Token));
        assert!(!units.iter().any(|u| matches!(u, Frame::Data { .. })));
    }

    #[tokio::test]
    async fn test_near_capacity_frame_split_across_reads() {
        let payload = vec![b'x'; 15_000];
        let frame = Frame::data(id('C'), id('A'), payload.clone()).unwrap();

        let mut input = vec![b'^'; READ_CHUNK_SIZE - 3];
        input.extend_from_slice(&frame.encode());
        input.extend(std::iter::repeat(b'^').take(READ_CHUNK_SIZE));
        let mut reader = StreamReader::new(&input[..]);

        let mut tokens = 0;
        let mut frames = Vec::new();
        while let Some(unit) = reader.next_unit().await.unwrap() {
            match unit {
                Frame::Token => tokens += 1,
                Frame::Data { .. } => frames.push(unit),
                Frame::Corrupt { skipped } => panic!("corrupt run of {} bytes", skipped.len()),
            }
        }

        assert_eq!(frames, vec![frame]);
        assert_eq!(tokens, 2 * READ_CHUNK_SIZE - 3);
    }
}
