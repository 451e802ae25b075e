//! Control plane module - run reports and stdout output.
//!
//! The hub reports what happened on each link as JSON lines on its stdout.
//! Stations report through their [`StationReport`] return value; a station
//! process logs it to stderr because its stdout carries the ring.

mod report;
mod stdio;

pub use report::{HubReport, LinkOutcome, LinkReport, ReceivedMessage, StationReport};
pub use stdio::{write_stdout_json, write_stdout_line};
