//! Ring output writer.
//!
//! A station writes every unit it forwards or originates through a
//! [`RingWriter`]. Each unit is written in full and flushed before the
//! monitor reads again, so the downstream station sees units in the exact
//! order they were decided.
//!
//! ```text
//! TokenMonitor ─► RingWriter ─► station output ─► hub relay ─► next station
//! ```

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{Result, TokenRingError};
use crate::protocol::Frame;

/// Writer for a station's ring-facing output.
pub struct RingWriter<W> {
    /// Underlying output stream.
    writer: W,
    /// Scratch buffer reused for encoding.
    scratch: BytesMut,
    /// Units written so far.
    units_written: u64,
    /// Tokens written so far.
    tokens_written: u64,
}

impl<W> RingWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wrap an output stream.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            scratch: BytesMut::with_capacity(256),
            units_written: 0,
            tokens_written: 0,
        }
    }

    /// Write one unit and flush.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::RingClosed`] if the downstream end is gone,
    /// or the I/O error for any other write failure.
    pub async fn send(&mut self, frame: &Frame) -> Result<()> {
        self.scratch.clear();
        frame.encode_into(&mut self.scratch);

        self.writer.write_all(&self.scratch).await.map_err(closed_or_io)?;
        self.writer.flush().await.map_err(closed_or_io)?;

        self.units_written += 1;
        if frame.is_token() {
            self.tokens_written += 1;
        }
        Ok(())
    }

    /// Number of units written.
    #[inline]
    pub fn units_written(&self) -> u64 {
        self.units_written
    }

    /// Number of tokens written.
    #[inline]
    pub fn tokens_written(&self) -> u64 {
        self.tokens_written
    }

    /// Shut down the output so the downstream side observes end of stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn closed_or_io(e: std::io::Error) -> TokenRingError {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            TokenRingError::RingClosed
        }
        _ => TokenRingError::Io(e),
    }
}
