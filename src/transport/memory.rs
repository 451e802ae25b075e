//! In-memory transport.
//!
//! Each station gets two `tokio::io::duplex` pipes and runs as a tokio task
//! in the current runtime.
//!
//! # Example
//!
//! ```ignore
//! use tokring::transport::memory;
//!
//! let ring = memory::spawn_stations(configs)?;
//! let handle = Hub::start(&ring.topology, ring.links).await?;
//! ```

use tokio::io::duplex;
use tokio::task::JoinHandle;

use super::{StationEnds, StationLink};
use crate::control::StationReport;
use crate::error::Result;
use crate::hub::RingTopology;
use crate::station::{Station, StationConfig};

/// Default in-flight bytes per pipe direction.
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

/// Create the two pipes for one station.
pub fn station_pipe(capacity: usize) -> (StationLink, StationEnds) {
    let (hub_input, station_input) = duplex(capacity);
    let (station_output, hub_output) = duplex(capacity);

    (
        StationLink::new(hub_input, hub_output),
        StationEnds {
            input: station_input,
            output: station_output,
        },
    )
}

/// Stations running as tasks, ready to be connected by the hub.
pub struct LocalRing {
    /// Ring order, one entry per configuration.
    pub topology: RingTopology,
    /// Hub-side ends in ring order.
    pub links: Vec<StationLink>,
    /// Station tasks in ring order.
    pub stations: Vec<JoinHandle<Result<StationReport>>>,
}

/// Spawn one station task per configuration, in ring order.
///
/// # Errors
///
/// Returns [`TokenRingError::Config`](crate::TokenRingError::Config) if a
/// configuration or the resulting ring is invalid. Nothing is spawned then.
pub fn spawn_stations(configs: Vec<StationConfig>) -> Result<LocalRing> {
    let topology = RingTopology::new(configs.iter().map(|c| c.id).collect())?;

    let stations = configs
        .into_iter()
        .map(Station::new)
        .collect::<Result<Vec<_>>>()?;

    let mut links = Vec::with_capacity(stations.len());
    let mut tasks = Vec::with_capacity(stations.len());
    for station in stations {
        let (link, ends) = station_pipe(DEFAULT_PIPE_CAPACITY);
        tracing::debug!(station = %station.id(), "Spawning in-process station");
        tasks.push(tokio::spawn(station.run(ends.input, ends.output)));
        links.push(link);
    }

    Ok(LocalRing {
        topology,
        links,
        stations: tasks,
    })
}
