//! Station: one node on the ring.
//!
//! A station is two pieces taking turns on a single [`StationContext`]:
//!
//! - [`TokenMonitor`] reads units from the ring input, forwards them, and
//!   uses the token to transmit queued frames
//! - [`ApplicationLayer`] consumes captured messages, answers them with
//!   acks, and queues its own messages stop-and-wait
//!
//! The monitor returns control to the application layer each time a message
//! for this station is captured. The station stops when its ring input
//! closes or its output has nowhere to go.
//!
//! # Example
//!
//! ```ignore
//! use tokring::station::{Station, StationConfig};
//!
//! let config = StationConfig::load(path)?;
//! let report = Station::new(config)?
//!     .run(tokio::io::stdin(), tokio::io::stdout())
//!     .await?;
//! ```

mod app;
mod buffer;
mod config;
mod context;
mod monitor;
mod reader;

pub use app::ApplicationLayer;
pub use buffer::{Received, StationBuffer};
pub use config::{StationConfig, MAX_MESSAGES};
pub use context::StationContext;
pub use monitor::{MonitorEvent, MonitorState, MonitorStats, Step, TokenMonitor};
pub use reader::{StreamReader, READ_CHUNK_SIZE};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::control::StationReport;
use crate::error::{Result, TokenRingError};
use crate::protocol::StationId;
use crate::writer::RingWriter;

/// A configured station, ready to be attached to the ring.
#[derive(Debug)]
pub struct Station {
    ctx: StationContext,
    app: ApplicationLayer,
    monitor: TokenMonitor,
    capacity: usize,
}

impl Station {
    /// Build a station from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::Config`] if the configuration is invalid.
    pub fn new(config: StationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ctx: StationContext::new(config.id, config.buffer_capacity),
            app: ApplicationLayer::new(config.destination, config.messages),
            monitor: TokenMonitor::new(),
            capacity: config.buffer_capacity,
        })
    }

    /// This station's identifier.
    pub fn id(&self) -> StationId {
        self.ctx.id()
    }

    /// Run the station on the given ring input and output until the ring
    /// closes.
    ///
    /// # Errors
    ///
    /// Returns I/O errors other than the ring closing underneath the station.
    pub async fn run<R, W>(mut self, input: R, output: W) -> Result<StationReport>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let id = self.ctx.id();
        let mut reader = StreamReader::with_capacity(input, self.capacity);
        let mut writer = RingWriter::new(output);

        tracing::info!(station = %id, unsent = self.app.unsent(), "Station started");

        loop {
            if let Err(e) = self.app.service(&mut self.ctx) {
                tracing::warn!(station = %id, "Application layer: {}", e);
            }

            match self
                .monitor
                .run(&mut self.ctx, &mut reader, &mut writer)
                .await
            {
                Ok(MonitorEvent::MessageAvailable) => continue,
                Ok(MonitorEvent::RingClosed) => break,
                Err(TokenRingError::RingClosed) => {
                    tracing::info!(station = %id, "Ring output closed");
                    break;
                }
                Err(e) => {
                    tracing::error!(station = %id, "Station failed: {}", e);
                    return Err(e);
                }
            }
        }

        if let Err(e) = writer.shutdown().await {
            tracing::debug!(station = %id, "Output shutdown: {}", e);
        }

        let report = self.app.into_report(id, self.monitor.stats());
        tracing::info!(
            station = %id,
            sent = report.sent.len(),
            acks = report.acks_received,
            received = report.received.len(),
            units_written = writer.units_written(),
            tokens_written = writer.tokens_written(),
            "Station stopped"
        );
        Ok(report)
    }
}
