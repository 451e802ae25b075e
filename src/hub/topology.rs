//! Ring adjacency.
//!
//! A [`RingTopology`] lists the stations in ring order and says which station
//! each one feeds. The default adjacency sends station `i`'s output to
//! station `i + 1`, wrapping at the end.

use std::collections::HashSet;

use crate::error::{Result, TokenRingError};
use crate::protocol::StationId;

/// Validated cyclic station order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingTopology {
    stations: Vec<StationId>,
    successors: Vec<usize>,
}

impl RingTopology {
    /// Ring with station `i` feeding station `i + 1 mod N`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::Config`] for an empty ring or duplicate ids.
    pub fn new(stations: Vec<StationId>) -> Result<Self> {
        let n = stations.len();
        let successors = (0..n).map(|i| (i + 1) % n.max(1)).collect();
        Self::with_successors(stations, successors)
    }

    /// Ring with an explicit successor for each station.
    ///
    /// `successors[i]` is the index of the station fed by station `i`. The
    /// mapping must visit every station exactly once before returning to the
    /// start.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::Config`] for an empty ring, duplicate ids, or
    /// a mapping that is not a single cycle.
    pub fn with_successors(stations: Vec<StationId>, successors: Vec<usize>) -> Result<Self> {
        if stations.is_empty() {
            return Err(TokenRingError::Config("Ring has no stations".to_string()));
        }

        let mut seen = HashSet::new();
        for id in &stations {
            if !seen.insert(*id) {
                return Err(TokenRingError::Config(format!("Duplicate station id {id}")));
            }
        }

        let n = stations.len();
        if successors.len() != n {
            return Err(TokenRingError::Config(format!(
                "Expected {} successors, got {}",
                n,
                successors.len()
            )));
        }
        if let Some(bad) = successors.iter().find(|&&s| s >= n) {
            return Err(TokenRingError::Config(format!(
                "Successor index {bad} out of range for {n} stations"
            )));
        }

        // Walking from station 0 must cover every station and come back.
        let mut visited = vec![false; n];
        let mut at = 0;
        for _ in 0..n {
            if visited[at] {
                return Err(TokenRingError::Config(
                    "Successor mapping is not a single cycle".to_string(),
                ));
            }
            visited[at] = true;
            at = successors[at];
        }
        if at != 0 {
            return Err(TokenRingError::Config(
                "Successor mapping is not a single cycle".to_string(),
            ));
        }

        Ok(Self {
            stations,
            successors,
        })
    }

    /// Number of stations.
    #[inline]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Always false; an empty ring is rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Station ids in ring order.
    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    /// Id of station `index`.
    pub fn station(&self, index: usize) -> Option<StationId> {
        self.stations.get(index).copied()
    }

    /// Index of the station fed by station `index`.
    pub fn successor(&self, index: usize) -> Option<usize> {
        self.successors.get(index).copied()
    }

    /// Every link as `(from, to)` station indexes, ordered by `from`.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors.iter().copied().enumerate()
    }
}
