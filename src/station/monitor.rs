//! Token-passing state machine.
//!
//! The monitor consumes units from the station's ring input and decides what
//! goes onward:
//!
//! | Unit received                   | Written onward                         |
//! |---------------------------------|----------------------------------------|
//! | Token, transmit queue non-empty | oldest queued frame (replaces token)   |
//! | Token, transmit queue empty     | Token                                  |
//! | Data, src == self               | Token (frame completed the loop)       |
//! | Data, dest == self              | the frame, unchanged (copy captured)   |
//! | Data, other                     | the frame, unchanged                   |
//! | Corrupt                         | nothing                                |
//!
//! Every Token in is matched by exactly one Token or one data frame out, and a
//! Token only reappears when a station's own frame comes home, which keeps a
//! single token on the ring.

use tokio::io::{AsyncRead, AsyncWrite};

use super::context::StationContext;
use super::reader::StreamReader;
use crate::error::Result;
use crate::protocol::Frame;
use crate::writer::RingWriter;

/// Protocol state of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Waiting for the next unit from the ring.
    WaitForInput,
    /// Holding the token: transmitting a queued frame or passing it on.
    HaveToken,
    /// Passing on a data frame addressed elsewhere or captured.
    Forwarding,
    /// Ring input closed.
    Terminated,
}

/// Why [`TokenMonitor::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A message for this station was placed in receive-pending.
    MessageAvailable,
    /// The ring input reached end of stream.
    RingClosed,
}

/// Outcome of processing one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Unit to write onward, if any.
    pub emit: Option<Frame>,
    /// Whether a message was captured into receive-pending.
    pub captured: bool,
}

/// Counters kept by the monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Tokens received.
    pub tokens_seen: u64,
    /// Queued frames transmitted on the token.
    pub frames_sent: u64,
    /// Data frames passed on unchanged, captured ones included.
    pub frames_forwarded: u64,
    /// Data frames captured for this station.
    pub frames_captured: u64,
    /// Corrupt runs skipped.
    pub framing_errors: u64,
}

/// Per-station token-ring monitor.
#[derive(Debug)]
pub struct TokenMonitor {
    state: MonitorState,
    stats: MonitorStats,
}

impl TokenMonitor {
    /// Create a monitor waiting for input.
    pub fn new() -> Self {
        Self {
            state: MonitorState::WaitForInput,
            stats: MonitorStats::default(),
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Counters so far.
    #[inline]
    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Process one unit from the ring.
    ///
    /// Mutates the station's queues and returns what to write onward. Does no
    /// I/O, so a whole ring can be stepped deterministically.
    pub fn step(&mut self, ctx: &mut StationContext, frame: Frame) -> Step {
        let me = ctx.id();

        match frame {
            Frame::Token => {
                self.state = MonitorState::HaveToken;
                self.stats.tokens_seen += 1;
                let emit = match ctx.buffer.next_outgoing() {
                    Some(queued) => {
                        tracing::debug!(station = %me, "Token received, transmitting queued frame");
                        self.stats.frames_sent += 1;
                        queued
                    }
                    None => {
                        tracing::trace!(station = %me, "Token received, passing on");
                        Frame::Token
                    }
                };
                Step {
                    emit: Some(emit),
                    captured: false,
                }
            }

            Frame::Data { src, .. } if src == me => {
                self.state = MonitorState::HaveToken;
                tracing::debug!(station = %me, "Own frame returned, releasing token");
                Step {
                    emit: Some(Frame::Token),
                    captured: false,
                }
            }

            Frame::Data { dest, src, .. } if dest == me => {
                self.state = MonitorState::Forwarding;
                self.stats.frames_forwarded += 1;
                let captured = match ctx.buffer.capture(&frame) {
                    Ok(()) => {
                        self.stats.frames_captured += 1;
                        true
                    }
                    Err(e) => {
                        tracing::warn!(station = %me, from = %src, "Dropping captured frame: {}", e);
                        false
                    }
                };
                Step {
                    emit: Some(frame),
                    captured,
                }
            }

            Frame::Data { .. } => {
                self.state = MonitorState::Forwarding;
                self.stats.frames_forwarded += 1;
                Step {
                    emit: Some(frame),
                    captured: false,
                }
            }

            Frame::Corrupt { skipped } => {
                self.stats.framing_errors += 1;
                tracing::warn!(
                    station = %me,
                    "No STX, skipped {} bytes: {:?}",
                    skipped.len(),
                    String::from_utf8_lossy(&skipped)
                );
                Step {
                    emit: None,
                    captured: false,
                }
            }
        }
    }

    /// Monitor the ring until a message is captured or the input closes.
    ///
    /// The only await point that can suspend for long is the read of the ring
    /// input.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the input or output stream.
    pub async fn run<R, W>(
        &mut self,
        ctx: &mut StationContext,
        reader: &mut StreamReader<R>,
        writer: &mut RingWriter<W>,
    ) -> Result<MonitorEvent>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            self.state = MonitorState::WaitForInput;

            let frame = match reader.next_unit().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    self.state = MonitorState::Terminated;
                    tracing::info!(station = %ctx.id(), "Ring input closed");
                    return Ok(MonitorEvent::RingClosed);
                }
                Err(e) => {
                    self.state = MonitorState::Terminated;
                    return Err(e);
                }
            };

            let step = self.step(ctx, frame);

            if let Some(out) = &step.emit {
                if let Err(e) = writer.send(out).await {
                    self.state = MonitorState::Terminated;
                    return Err(e);
                }
            }

            if step.captured {
                return Ok(MonitorEvent::MessageAvailable);
            }
        }
    }
}

impl Default for TokenMonitor {
    fn default() -> Self {
        Self::new()
    }
}
