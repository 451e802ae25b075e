//! Station context shared by the monitor and the application layer.
//!
//! The context owns everything a station mutates: its identity and its
//! transmit/receive queues. The station loop owns the context and lends it
//! by `&mut` to [`TokenMonitor`](super::TokenMonitor) and
//! [`ApplicationLayer`](super::ApplicationLayer) in turn, so no state is
//! shared across stations or tasks.

use super::buffer::StationBuffer;
use crate::protocol::StationId;

/// Identity and queues of one station.
#[derive(Debug)]
pub struct StationContext {
    /// This station's identifier.
    id: StationId,
    /// Transmit-pending and receive-pending queues.
    pub buffer: StationBuffer,
}

impl StationContext {
    /// Create a context with empty queues of the given capacity.
    pub fn new(id: StationId, capacity: usize) -> Self {
        Self {
            id,
            buffer: StationBuffer::with_capacity(capacity),
        }
    }

    /// This station's identifier.
    #[inline]
    pub fn id(&self) -> StationId {
        self.id
    }
}
