//! One relay link: station output to successor input.
//!
//! Bytes are copied verbatim and in order; the relay never looks at frame
//! boundaries. When the link ends for any reason the relay shuts down and
//! drops its write half, so the downstream station sees end of stream.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, watch};

use crate::control::{LinkOutcome, LinkReport};
use crate::error::TokenRingError;
use crate::protocol::StationId;
use crate::transport::{BoxedReader, BoxedWriter};

/// Size of a single relay read.
pub const RELAY_CHUNK_SIZE: usize = 8 * 1024;

/// Both ends of one ring link, owned by its relay task.
pub(crate) struct Relay {
    pub link: usize,
    pub from: StationId,
    pub to: StationId,
    pub reader: BoxedReader,
    pub writer: BoxedWriter,
}

enum ReadResult {
    Data(usize),
    Done(LinkOutcome),
}

impl Relay {
    /// Copy until end of stream, failure, or shutdown, then report.
    pub(crate) async fn run(
        self,
        mut shutdown: watch::Receiver<bool>,
        events: mpsc::Sender<LinkReport>,
    ) {
        let Relay {
            link,
            from,
            to,
            mut reader,
            mut writer,
        } = self;
        let mut buf = vec![0u8; RELAY_CHUNK_SIZE];
        let mut bytes_relayed = 0u64;

        let outcome = loop {
            let read = tokio::select! {
                _ = shutdown.changed() => ReadResult::Done(LinkOutcome::Cancelled),
                result = reader.read(&mut buf) => match result {
                    Ok(0) => ReadResult::Done(LinkOutcome::Eof),
                    Ok(n) => ReadResult::Data(n),
                    Err(e) => ReadResult::Done(failed(link, from, to, e)),
                },
            };

            let n = match read {
                ReadResult::Data(n) => n,
                ReadResult::Done(outcome) => break outcome,
            };

            let written = tokio::select! {
                _ = shutdown.changed() => Err(LinkOutcome::Cancelled),
                result = write_chunk(&mut writer, &buf[..n]) => {
                    result.map_err(|e| failed(link, from, to, e))
                }
            };

            match written {
                Ok(()) => bytes_relayed += n as u64,
                Err(outcome) => break outcome,
            }
        };

        match &outcome {
            LinkOutcome::Eof => {
                tracing::info!(link, from = %from, to = %to, "Link closed by upstream station")
            }
            LinkOutcome::Cancelled => tracing::debug!(link, "Link cancelled"),
            LinkOutcome::Failed { .. } => {}
        }

        if let Err(e) = writer.shutdown().await {
            tracing::debug!(link, "Downstream already closed: {}", e);
        }
        drop(writer);

        let report = LinkReport {
            link,
            from,
            to,
            bytes_relayed,
            outcome,
        };
        let _ = events.send(report).await;
    }
}

async fn write_chunk(writer: &mut BoxedWriter, chunk: &[u8]) -> std::io::Result<()> {
    writer.write_all(chunk).await?;
    writer.flush().await
}

fn failed(link: usize, from: StationId, to: StationId, source: std::io::Error) -> LinkOutcome {
    let err = TokenRingError::RelayIo { link, source };
    tracing::error!(from = %from, to = %to, "{}", err);
    LinkOutcome::Failed {
        error: err.to_string(),
    }
}
