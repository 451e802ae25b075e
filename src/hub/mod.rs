//! Hub module - connects stations into a ring.
//!
//! The hub owns the hub-side ends of every station, injects the single
//! token into the first station, and runs one relay task per ring link:
//!
//! ```text
//!         ┌────────── relay 3 ◄──────────┐
//!         ▼                              │
//!   station A ─► relay 0 ─► station B ─► relay 1 ─► station C ─► relay 2 ─► station D
//! ```
//!
//! Shutdown is cooperative: [`HubHandle::shutdown`] signals every relay on a
//! watch channel, each relay drops its write half so the downstream station
//! sees end of stream, and reports how its link ended on an mpsc channel.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use tokring::hub::Hub;
//!
//! let handle = Hub::start(&topology, links).await?;
//! let report = handle.run_for(Duration::from_secs(15)).await;
//! ```

mod relay;
mod topology;

pub use relay::RELAY_CHUNK_SIZE;
pub use topology::RingTopology;

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::control::{HubReport, LinkReport};
use crate::error::{Result, TokenRingError};
use crate::protocol::SYN;
use crate::transport::StationLink;
use relay::Relay;

/// Ring bootstrapper.
pub struct Hub;

impl Hub {
    /// Inject the token and start relaying.
    ///
    /// `links` holds one [`StationLink`] per station, in topology order.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRingError::Config`] if the number of links does not
    /// match the topology, or the I/O error if the token cannot be written.
    pub async fn start(topology: &RingTopology, links: Vec<StationLink>) -> Result<HubHandle> {
        if links.len() != topology.len() {
            return Err(TokenRingError::Config(format!(
                "Ring has {} stations but {} links",
                topology.len(),
                links.len()
            )));
        }

        let mut inputs = Vec::with_capacity(links.len());
        let mut outputs = Vec::with_capacity(links.len());
        for link in links {
            inputs.push(Some(link.input));
            outputs.push(Some(link.output));
        }

        if let Some(Some(first)) = inputs.first_mut() {
            first.write_all(&[SYN]).await?;
            first.flush().await?;
            tracing::debug!(station = ?topology.station(0), "Token injected");
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let (events_tx, events) = mpsc::channel(topology.len());
        let mut tasks = Vec::with_capacity(topology.len());

        for (from, to) in topology.links() {
            let missing = || TokenRingError::Config(format!("Link {from} -> {to} reused"));
            let relay = Relay {
                link: from,
                from: topology.station(from).ok_or_else(missing)?,
                to: topology.station(to).ok_or_else(missing)?,
                reader: outputs[from].take().ok_or_else(missing)?,
                writer: inputs[to].take().ok_or_else(missing)?,
            };
            tasks.push(tokio::spawn(
                relay.run(shutdown_rx.clone(), events_tx.clone()),
            ));
        }

        tracing::info!(stations = topology.len(), "Hub started");

        Ok(HubHandle {
            shutdown,
            events,
            tasks,
            reports: Vec::with_capacity(topology.len()),
            link_count: topology.len(),
        })
    }
}

/// Control handle for a running hub.
pub struct HubHandle {
    shutdown: watch::Sender<bool>,
    events: mpsc::Receiver<LinkReport>,
    tasks: Vec<JoinHandle<()>>,
    reports: Vec<LinkReport>,
    link_count: usize,
}

impl HubHandle {
    /// Signal every relay to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the next link to end. `None` once every link has reported.
    pub async fn next_closed(&mut self) -> Option<LinkReport> {
        let report = self.events.recv().await?;
        self.reports.push(report.clone());
        Some(report)
    }

    /// Check if every link has ended.
    pub fn all_closed(&self) -> bool {
        self.reports.len() >= self.link_count
    }

    /// Let the ring run for `duration`, then shut it down.
    ///
    /// Returns early if every link ends before the deadline.
    pub async fn run_for(mut self, duration: Duration) -> HubReport {
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        while !self.all_closed() {
            tokio::select! {
                _ = &mut deadline => {
                    tracing::info!(?duration, "Hub lifetime elapsed, shutting down");
                    break;
                }
                closed = self.next_closed() => {
                    if closed.is_none() {
                        break;
                    }
                }
            }
        }

        self.wait().await
    }

    /// Shut down and wait for every link to report.
    pub async fn wait(mut self) -> HubReport {
        self.shutdown();

        while !self.all_closed() {
            if self.next_closed().await.is_none() {
                break;
            }
        }

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!("Relay task ended abnormally: {}", e);
            }
        }

        let mut links = std::mem::take(&mut self.reports);
        links.sort_by_key(|l| l.link);
        tracing::info!(links = links.len(), "Hub stopped");
        HubReport { links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::LinkOutcome;
    use crate::protocol::StationId;
    use crate::transport::memory::station_pipe;
    use tokio::io::AsyncReadExt;

    fn ring(s: &str) -> RingTopology {
        RingTopology::new(s.chars().map(|c| StationId::try_from(c).unwrap()).collect()).unwrap()
    }

    #[tokio::test]
    async fn test_token_injected_and_relayed() {
        let (link, mut ends) = station_pipe(64);
        let handle = Hub::start(&ring("A"), vec![link]).await.unwrap();

        let mut byte = [0u8; 1];
        ends.input.read_exact(&mut byte).await.unwrap();
        assert_eq!(byte[0], SYN);

        // Single station: its output comes straight back to its input.
        ends.output.write_all(b"@AA-x~").await.unwrap();
        let mut frame = [0u8; 6];
        ends.input.read_exact(&mut frame).await.unwrap();
        assert_eq!(&frame, b"@AA-x~");

        drop(ends.output);
        let report = handle.wait().await;

        assert_eq!(report.links.len(), 1);
        assert_eq!(report.bytes_relayed(), 6);
    }

    #[tokio::test]
    async fn test_eof_reported_and_propagated() {
        let (link_a, ends_a) = station_pipe(64);
        let (link_b, mut ends_b) = station_pipe(64);
        let mut handle = Hub::start(&ring("AB"), vec![link_a, link_b]).await.unwrap();

        drop(ends_a.output);
        let closed = handle.next_closed().await.unwrap();
        assert_eq!(closed.link, 0);
        assert_eq!(closed.outcome, LinkOutcome::Eof);

        // B's input sees end of stream once link 0 is gone.
        let mut rest = Vec::new();
        ends_b.input.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());

        drop(ends_a.input);
        let report = handle.wait().await;
        assert_eq!(report.links[1].outcome, LinkOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_all_links() {
        let (link_a, mut ends_a) = station_pipe(64);
        let (link_b, mut ends_b) = station_pipe(64);
        let handle = Hub::start(&ring("AB"), vec![link_a, link_b]).await.unwrap();

        let report = handle.wait().await;

        assert_eq!(report.links.len(), 2);
        assert!(report
            .links
            .iter()
            .all(|l| l.outcome == LinkOutcome::Cancelled));

        let mut a_in = Vec::new();
        ends_a.input.read_to_end(&mut a_in).await.unwrap();
        assert_eq!(a_in, b"^");
        let mut b_in = Vec::new();
        ends_b.input.read_to_end(&mut b_in).await.unwrap();
        assert!(b_in.is_empty());
        drop((ends_a.output, ends_b.output));
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let (link_a, mut ends_a) = station_pipe(64);
        let (link_b, ends_b) = station_pipe(64);
        drop(ends_b.input);
        let mut handle = Hub::start(&ring("AB"), vec![link_a, link_b]).await.unwrap();

        ends_a.output.write_all(b"@BA-x~").await.unwrap();
        let closed = handle.next_closed().await.unwrap();

        assert_eq!(closed.link, 0);
        assert!(matches!(closed.outcome, LinkOutcome::Failed { .. }));
        let report = handle.wait().await;
        assert_eq!(report.failed_links().count(), 1);
        drop(ends_b.output);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_for_stops_after_duration() {
        let (link_a, _ends_a) = station_pipe(64);
        let (link_b, _ends_b) = station_pipe(64);
        let handle = Hub::start(&ring("AB"), vec![link_a, link_b]).await.unwrap();

        // Idle ring: the paused clock jumps straight to the deadline.
        let started = tokio::time::Instant::now();
        let report = handle.run_for(Duration::from_secs(15)).await;

        assert!(started.elapsed() >= Duration::from_secs(15));
        assert_eq!(report.links.len(), 2);
        assert!(report
            .links
            .iter()
            .all(|l| l.outcome == LinkOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_link_count_mismatch() {
        let (link, _ends) = station_pipe(64);
        let result = Hub::start(&ring("AB"), vec![link]).await;
        assert!(matches!(result, Err(TokenRingError::Config(_))));
    }
}
