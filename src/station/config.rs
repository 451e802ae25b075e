//! Station configuration.
//!
//! Configuration files use a line-oriented format. Empty lines and lines
//! starting with `#` are ignored; the first data line gives the station id
//! (its first character), the second the destination id, and every further
//! line is a message to send:
//!
//! ```text
//! # Station A
//! A
//! C
//! hello
//! how are you
//! ```

use std::path::Path;

use bytes::Bytes;

use crate::error::{Result, TokenRingError};
use crate::protocol::{is_valid_payload, StationId, DEFAULT_BUFFER_CAPACITY, FRAME_OVERHEAD};

/// Maximum number of messages kept from a configuration file.
pub const MAX_MESSAGES: usize = 10;

/// Everything a station needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    /// This station's identifier.
    pub id: StationId,
    /// Station that receives this station's messages.
    pub destination: StationId,
    /// Messages to send, in order.
    pub messages: Vec<Bytes>,
    /// Capacity of each station queue in bytes.
    pub buffer_capacity: usize,
}

impl StationConfig {
    /// Create a configuration with no messages.
    pub fn new(id: StationId, destination: StationId) -> Self {
        Self {
            id,
            destination,
            messages: Vec::new(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Append a message to send.
    pub fn message(mut self, payload: impl Into<Bytes>) -> Self {
        self.messages.push(payload.into());
        self
    }

    /// Set the capacity of each station queue.
    ///
    /// Default: 16 KiB
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Parse the line-oriented configuration format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut id = None;
        let mut destination = None;
        let mut messages = Vec::new();

        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if id.is_none() {
                id = Some(first_char_id(line, "station id")?);
            } else if destination.is_none() {
                destination = Some(first_char_id(line, "destination id")?);
            } else if messages.len() < MAX_MESSAGES {
                messages.push(Bytes::copy_from_slice(line.as_bytes()));
            } else {
                tracing::warn!("Message limit {} reached, ignoring {:?}", MAX_MESSAGES, line);
            }
        }

        let id = id.ok_or_else(|| TokenRingError::Config("Missing station id".to_string()))?;
        let destination = destination
            .ok_or_else(|| TokenRingError::Config("Missing destination id".to_string()))?;

        let config = Self {
            id,
            destination,
            messages,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TokenRingError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Check that every message can be framed and fits a station queue.
    pub fn validate(&self) -> Result<()> {
        for message in &self.messages {
            if !is_valid_payload(message) {
                return Err(TokenRingError::Config(format!(
                    "Message {:?} contains ETX or NUL",
                    String::from_utf8_lossy(message)
                )));
            }
            if message.len() + FRAME_OVERHEAD > self.buffer_capacity {
                return Err(TokenRingError::Config(format!(
                    "Message of {} bytes exceeds buffer capacity {}",
                    message.len(),
                    self.buffer_capacity
                )));
            }
        }
        Ok(())
    }
}

fn first_char_id(line: &str, what: &str) -> Result<StationId> {
    let c = line
        .chars()
        .next()
        .ok_or_else(|| TokenRingError::Config(format!("Missing {what}")))?;
    StationId::try_from(c)
        .map_err(|_| TokenRingError::Config(format!("Invalid {what} {c:?}")))
}
