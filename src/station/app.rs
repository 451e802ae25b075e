//! Stop-and-wait application layer.
//!
//! A station sends its configured messages one at a time to a single
//! destination and holds the next message back until an `Ack` from that
//! destination arrives. Every non-ack message received is answered with an
//! `Ack` to its sender, whether or not the station is itself waiting. An
//! `Ack` that does not fit the transmit queue is kept and retried on the
//! next call.

use std::collections::VecDeque;

use bytes::Bytes;

use super::context::StationContext;
use super::monitor::MonitorStats;
use crate::control::{ReceivedMessage, StationReport};
use crate::error::Result;
use crate::protocol::{Frame, StationId, ACK_PAYLOAD};

/// Stop-and-wait sender and acknowledging receiver.
#[derive(Debug)]
pub struct ApplicationLayer {
    destination: StationId,
    outgoing: VecDeque<Bytes>,
    /// Senders still owed an `Ack`, oldest first.
    pending_acks: VecDeque<StationId>,
    awaiting_ack: bool,
    sent: Vec<String>,
    received: Vec<ReceivedMessage>,
    acks_received: usize,
    acks_ignored: usize,
}

impl ApplicationLayer {
    /// Create an application layer with messages to send to `destination`.
    pub fn new(destination: StationId, messages: impl IntoIterator<Item = Bytes>) -> Self {
        Self {
            destination,
            outgoing: messages.into_iter().collect(),
            pending_acks: VecDeque::new(),
            awaiting_ack: false,
            sent: Vec::new(),
            received: Vec::new(),
            acks_received: 0,
            acks_ignored: 0,
        }
    }

    /// Handle everything received so far, then queue the next message if
    /// the previous one has been acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::BufferOverflow`](crate::TokenRingError::BufferOverflow)
    /// if the transmit queue cannot take a frame. A message or `Ack` that
    /// could not be queued is kept and retried on the next call.
    pub fn service(&mut self, ctx: &mut StationContext) -> Result<()> {
        let me = ctx.id();

        while let Some(msg) = ctx.buffer.receive() {
            if &msg.payload[..] == ACK_PAYLOAD {
                if msg.src == self.destination {
                    tracing::debug!(station = %me, from = %msg.src, "Ack received");
                    self.awaiting_ack = false;
                    self.acks_received += 1;
                } else {
                    tracing::warn!(
                        station = %me,
                        from = %msg.src,
                        expected = %self.destination,
                        "Ignoring Ack from unexpected station"
                    );
                    self.acks_ignored += 1;
                }
                continue;
            }

            let text = String::from_utf8_lossy(&msg.payload).into_owned();
            tracing::info!(station = %me, from = %msg.src, "Received {:?}", text);
            self.received.push(ReceivedMessage {
                from: msg.src,
                payload: text,
            });
            self.pending_acks.push_back(msg.src);
        }

        while let Some(&to) = self.pending_acks.front() {
            ctx.buffer.enqueue(&Frame::ack(to, me))?;
            self.pending_acks.pop_front();
        }

        if self.awaiting_ack {
            return Ok(());
        }

        if let Some(next) = self.outgoing.front() {
            let frame = Frame::data(self.destination, me, next.clone())?;
            ctx.buffer.enqueue(&frame)?;
            let text = String::from_utf8_lossy(next).into_owned();
            tracing::debug!(station = %me, to = %self.destination, "Queued {:?}", text);
            self.sent.push(text);
            self.outgoing.pop_front();
            self.awaiting_ack = true;
        }

        Ok(())
    }

    /// Check if the last sent message is unacknowledged.
    #[inline]
    pub fn awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }

    /// Check if every message was sent and acknowledged.
    pub fn is_done(&self) -> bool {
        self.outgoing.is_empty() && !self.awaiting_ack
    }

    /// Messages not yet queued for transmission.
    pub fn unsent(&self) -> usize {
        self.outgoing.len()
    }

    /// Build the final report for this station.
    pub fn into_report(self, station: StationId, stats: MonitorStats) -> StationReport {
        StationReport {
            station,
            destination: self.destination,
            sent: self.sent,
            acks_received: self.acks_received,
            acks_ignored: self.acks_ignored,
            received: self.received,
            unsent: self.outgoing.len(),
            awaiting_ack: self.awaiting_ack,
            tokens_seen: stats.tokens_seen,
            framing_errors: stats.framing_errors,
        }
    }
}
