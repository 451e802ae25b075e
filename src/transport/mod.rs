//! Transport module - station link bootstrap.
//!
//! The hub sees every station as a pair of byte streams:
//!
//! - **input**: the hub writes ring bytes into the station
//! - **output**: the hub reads the bytes the station forwards
//!
//! Two transports build these pairs:
//! - [`memory`]: stations as tokio tasks over in-memory duplex pipes
//! - [`process`]: stations as child processes over their stdin/stdout

pub mod memory;
pub mod process;

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};

/// Boxed read half of a link.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed write half of a link.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Hub-side ends of one station.
pub struct StationLink {
    /// Write half of the station's ring input.
    pub input: BoxedWriter,
    /// Read half of the station's ring output.
    pub output: BoxedReader,
}

impl StationLink {
    /// Bundle hub-side ends.
    pub fn new<W, R>(input: W, output: R) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }
}

impl std::fmt::Debug for StationLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationLink").finish_non_exhaustive()
    }
}

/// Station-side ends of an in-memory link.
#[derive(Debug)]
pub struct StationEnds {
    /// Ring input, read by the station.
    pub input: DuplexStream,
    /// Ring output, written by the station.
    pub output: DuplexStream,
}
