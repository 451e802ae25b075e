//! Integration tests for tokring.
//!
//! These tests run whole rings: real stations as tokio tasks, connected by
//! the hub over in-memory pipes.

use std::time::Duration;

use tokio::task::JoinHandle;

use tokring::control::{LinkOutcome, StationReport};
use tokring::transport::memory::{self, station_pipe};
use tokring::{Hub, Result, RingTopology, Station, StationConfig, StationId};

fn id(c: char) -> StationId {
    StationId::try_from(c).unwrap()
}

async fn collect(stations: Vec<JoinHandle<Result<StationReport>>>) -> Vec<StationReport> {
    let mut reports = Vec::new();
    for task in stations {
        reports.push(task.await.unwrap().unwrap());
    }
    reports
}

/// Ring A, B, C, D; A sends "hello" to C.
#[tokio::test]
async fn test_hello_delivered_and_acked() {
    tokring::logging::init_for_tests();

    let configs = vec![
        StationConfig::new(id('A'), id('C')).message("hello"),
        StationConfig::new(id('B'), id('D')),
        StationConfig::new(id('C'), id('A')),
        StationConfig::new(id('D'), id('B')),
    ];
    let ring = memory::spawn_stations(configs).unwrap();

    let handle = Hub::start(&ring.topology, ring.links).await.unwrap();
    let hub = handle.run_for(Duration::from_millis(300)).await;
    let reports = collect(ring.stations).await;

    assert_eq!(hub.links.len(), 4);
    assert_eq!(hub.failed_links().count(), 0);
    assert!(hub.bytes_relayed() > 0);

    let (a, c) = (&reports[0], &reports[2]);
    assert_eq!(c.received.len(), 1);
    assert_eq!(c.received[0].from, id('A'));
    assert_eq!(c.received[0].payload, "hello");
    assert_eq!(a.sent, vec!["hello"]);
    assert_eq!(a.acks_received, 1);
    assert!(!a.awaiting_ack);

    // The token kept circulating after the exchange.
    assert!(reports.iter().all(|r| r.tokens_seen > 1));
    assert!(reports.iter().all(|r| r.framing_errors == 0));
}

#[tokio::test]
async fn test_configs_from_files_format() {
    let configs = [
        "# A\nA\nC\nhello\nhow are you\n",
        "B\nD\nping from B\n",
        "C\nA\nhello back\n",
        "D\nB\n",
    ]
    .iter()
    .map(|text| StationConfig::parse(text))
    .collect::<Result<Vec<_>>>()
    .unwrap();

    let ring = memory::spawn_stations(configs).unwrap();
    let handle = Hub::start(&ring.topology, ring.links).await.unwrap();
    let hub = handle.run_for(Duration::from_millis(300)).await;
    let reports = collect(ring.stations).await;

    assert_eq!(hub.failed_links().count(), 0);
    let payloads = |r: &StationReport| {
        r.received
            .iter()
            .map(|m| m.payload.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(payloads(&reports[2]), vec!["hello", "how are you"]);
    assert_eq!(payloads(&reports[0]), vec!["hello back"]);
    assert_eq!(payloads(&reports[3]), vec!["ping from B"]);
    assert!(reports.iter().all(|r| r.unsent == 0 && !r.awaiting_ack));
}

/// Stations wired in a custom order: A -> C -> B -> D -> A.
#[tokio::test]
async fn test_custom_topology() {
    let configs = vec![
        StationConfig::new(id('A'), id('B')).message("via C"),
        StationConfig::new(id('B'), id('A')),
        StationConfig::new(id('C'), id('A')),
        StationConfig::new(id('D'), id('A')),
    ];
    let topology = RingTopology::with_successors(
        configs.iter().map(|c| c.id).collect(),
        vec![2, 3, 1, 0],
    )
    .unwrap();

    let mut links = Vec::new();
    let mut tasks = Vec::new();
    for config in configs {
        let (link, ends) = station_pipe(1024);
        let station = Station::new(config).unwrap();
        tasks.push(tokio::spawn(station.run(ends.input, ends.output)));
        links.push(link);
    }

    let handle = Hub::start(&topology, links).await.unwrap();
    let hub = handle.run_for(Duration::from_millis(200)).await;
    let reports = collect(tasks).await;

    assert_eq!(hub.links[0].to, id('C'));
    assert_eq!(reports[1].received.len(), 1);
    assert_eq!(reports[0].acks_received, 1);
}

/// When one station's output closes, the closure ripples around the ring
/// and the hub returns before its deadline.
#[tokio::test(start_paused = true)]
async fn test_station_exit_closes_ring() {
    let (link_a, ends_a) = station_pipe(1024);
    let (link_b, ends_b) = station_pipe(1024);
    let topology = RingTopology::new(vec![id('A'), id('B')]).unwrap();

    let b = Station::new(StationConfig::new(id('B'), id('A'))).unwrap();
    let b_task = tokio::spawn(b.run(ends_b.input, ends_b.output));

    // A never runs; its output closes straight away.
    drop(ends_a.output);

    let handle = Hub::start(&topology, vec![link_a, link_b]).await.unwrap();
    let started = tokio::time::Instant::now();
    let hub = handle.run_for(Duration::from_secs(60)).await;

    // Returned on closure, not by running the paused clock out.
    assert!(started.elapsed() < Duration::from_secs(60));

    assert_eq!(hub.links[0].outcome, LinkOutcome::Eof);
    assert_eq!(hub.links[1].outcome, LinkOutcome::Eof);
    let report = b_task.await.unwrap().unwrap();
    assert_eq!(report.tokens_seen, 0);
    drop(ends_a.input);
}
