//! Wire format constants and station identifiers.
//!
//! Byte-oriented ASCII framing:
//! ```text
//! Token     := '^'
//! DataFrame := '@' DEST SRC '-' PAYLOAD '~'
//!              │   │    │   │   │       └ ETX
//!              │   │    │   │   └ any bytes except ETX and NUL
//!              │   │    │   └ separator
//!              │   │    └ source station id (1 byte)
//!              │   └ destination station id (1 byte)
//!              └ STX
//! ```
//!
//! Units are concatenated on the ring with no separator between them.

use std::fmt;

use crate::error::{Result, TokenRingError};

/// SYN byte: the token.
pub const SYN: u8 = b'^';

/// Start of a data frame.
pub const STX: u8 = b'@';

/// End of a data frame.
pub const ETX: u8 = b'~';

/// Separator between the address header and the payload.
pub const SEPARATOR: u8 = b'-';

/// Never allowed inside a payload.
pub const NUL: u8 = 0;

/// Offset of the destination id inside a data frame.
pub const DEST_POS: usize = 1;

/// Offset of the source id inside a data frame.
pub const SRC_POS: usize = 2;

/// Offset of the separator inside a data frame.
pub const SEPARATOR_POS: usize = 3;

/// Offset of the first payload byte inside a data frame.
pub const PAYLOAD_POS: usize = 4;

/// Framing overhead of a data frame (STX, DEST, SRC, '-', ETX).
pub const FRAME_OVERHEAD: usize = 5;

/// Payload of an acknowledgement message.
pub const ACK_PAYLOAD: &[u8] = b"Ack";

/// Check whether a payload can be carried inside a data frame.
#[inline]
pub fn is_valid_payload(payload: &[u8]) -> bool {
    !payload.iter().any(|&b| b == ETX || b == NUL)
}

/// Single-character station identifier.
///
/// Any printable ASCII character except the wire delimiters (`^`, `@`, `~`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(u8);

impl StationId {
    /// Create a station id, validating that it can appear on the wire.
    pub fn new(byte: u8) -> Result<Self> {
        if !byte.is_ascii_graphic() || matches!(byte, SYN | STX | ETX) {
            return Err(TokenRingError::Config(format!(
                "Invalid station id {:?}",
                byte as char
            )));
        }
        Ok(Self(byte))
    }

    /// Station id from the raw byte found at a header position.
    ///
    /// No validation: frames read off the ring carry whatever the sender wrote.
    #[inline]
    pub(crate) fn from_wire(byte: u8) -> Self {
        Self(byte)
    }

    /// The id as its wire byte.
    #[inline]
    pub fn as_byte(&self) -> u8 {
        self.0
    }

    /// The id as a character.
    #[inline]
    pub fn as_char(&self) -> char {
        self.0 as char
    }
}

impl TryFrom<char> for StationId {
    type Error = TokenRingError;

    fn try_from(c: char) -> Result<Self> {
        if !c.is_ascii() {
            return Err(TokenRingError::Config(format!("Invalid station id {:?}", c)));
        }
        Self::new(c as u8)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl serde::Serialize for StationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}
