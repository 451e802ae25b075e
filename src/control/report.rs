//! Run reports written on the control plane.
//!
//! Both reports serialize to a single JSON line, e.g.
//!
//! ```text
//! {"station":"A","destination":"C","sent":["hello"],"acks_received":1,...}
//! {"links":[{"link":0,"from":"A","to":"B","bytes_relayed":5120,"outcome":"cancelled"},...]}
//! ```

use serde::Serialize;

use crate::protocol::StationId;

/// A message delivered to a station's application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedMessage {
    /// Sending station.
    pub from: StationId,
    /// Payload, lossily decoded as UTF-8.
    pub payload: String,
}

/// What one station did during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationReport {
    /// This station.
    pub station: StationId,
    /// Configured destination for outgoing messages.
    pub destination: StationId,
    /// Messages handed to the transmit queue, in order.
    pub sent: Vec<String>,
    /// Acks received from the destination.
    pub acks_received: usize,
    /// Acks received from any other station and ignored.
    pub acks_ignored: usize,
    /// Non-ack messages received, in order.
    pub received: Vec<ReceivedMessage>,
    /// Messages never sent.
    pub unsent: usize,
    /// Whether the last sent message was still unacknowledged at shutdown.
    pub awaiting_ack: bool,
    /// Tokens that passed through the station.
    pub tokens_seen: u64,
    /// Corrupt runs skipped on the ring input.
    pub framing_errors: u64,
}

/// How a hub relay link ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
    /// The upstream station closed its output.
    Eof,
    /// The hub shut the link down.
    Cancelled,
    /// A read or write on the link failed.
    Failed {
        /// Error description.
        error: String,
    },
}

/// Summary of one relay link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Link index (index of the upstream station in the ring).
    pub link: usize,
    /// Upstream station.
    pub from: StationId,
    /// Downstream station.
    pub to: StationId,
    /// Bytes copied from `from` to `to`.
    pub bytes_relayed: u64,
    /// How the link ended.
    #[serde(flatten)]
    pub outcome: LinkOutcome,
}

/// Summary of a hub run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubReport {
    /// One entry per link, ordered by link index.
    pub links: Vec<LinkReport>,
}

impl HubReport {
    /// Total bytes relayed over all links.
    pub fn bytes_relayed(&self) -> u64 {
        self.links.iter().map(|l| l.bytes_relayed).sum()
    }

    /// Links that ended with an I/O failure.
    pub fn failed_links(&self) -> impl Iterator<Item = &LinkReport> {
        self.links
            .iter()
            .filter(|l| matches!(l.outcome, LinkOutcome::Failed { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: char) -> StationId {
        StationId::try_from(c).unwrap()
    }

    #[test]
    fn test_link_report_json_shape() {
        let report = LinkReport {
            link: 0,
            from: id('A'),
            to: id('B'),
            bytes_relayed: 12,
            outcome: LinkOutcome::Cancelled,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["from"], "A");
        assert_eq!(json["to"], "B");
        assert_eq!(json["outcome"], "cancelled");
    }

    #[test]
    fn test_failed_link_carries_error() {
        let report = HubReport {
            links: vec![
                LinkReport {
                    link: 0,
                    from: id('A'),
                    to: id('B'),
                    bytes_relayed: 3,
                    outcome: LinkOutcome::Eof,
                },
                LinkReport {
                    link: 1,
                    from: id('B'),
                    to: id('A'),
                    bytes_relayed: 4,
                    outcome: LinkOutcome::Failed {
                        error: "broken pipe".to_string(),
                    },
                },
            ],
        };

        assert_eq!(report.bytes_relayed(), 7);
        assert_eq!(report.failed_links().count(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["links"][1]["outcome"], "failed");
        assert_eq!(json["links"][1]["error"], "broken pipe");
    }
}
