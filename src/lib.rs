//! # tokring
//!
//! Token-ring LAN simulation.
//!
//! Stations are connected into a one-way ring by a hub. A single token
//! circulates; a station holding it may replace it with one queued data
//! frame, and the token reappears when that frame returns to its sender.
//! On top of the ring each station runs a stop-and-wait application layer
//! that sends its messages to one destination and acknowledges every
//! message it receives.
//!
//! ## Architecture
//!
//! - **Protocol**: `^` token and `@DS-payload~` data frames, resynchronising decoder
//! - **Station**: token monitor and application layer over one station context
//! - **Hub**: one byte relay per ring link, token injection, cooperative shutdown
//! - **Transport**: stations as child processes (stdin/stdout) or in-memory tasks
//! - **Control Plane** (stdout of the hub): JSON run reports
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use tokring::{transport::memory, Hub, StationConfig};
//!
//! #[tokio::main]
//! async fn main() -> tokring::Result<()> {
//!     let configs = vec![
//!         StationConfig::parse("A\nC\nhello\n")?,
//!         StationConfig::parse("B\nA\n")?,
//!         StationConfig::parse("C\nA\n")?,
//!     ];
//!
//!     let ring = memory::spawn_stations(configs)?;
//!     let handle = Hub::start(&ring.topology, ring.links).await?;
//!     let report = handle.run_for(Duration::from_secs(1)).await;
//!     println!("{} bytes relayed", report.bytes_relayed());
//!     Ok(())
//! }
//! ```

pub mod control;
pub mod error;
pub mod hub;
pub mod logging;
pub mod protocol;
pub mod station;
pub mod transport;
pub mod writer;

pub use error::{Result, TokenRingError};
pub use hub::{Hub, HubHandle, RingTopology};
pub use protocol::{Frame, StationId};
pub use station::{Station, StationConfig};
