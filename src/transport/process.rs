//! Child process transport.
//!
//! A station process reads the ring on its stdin and writes it on its
//! stdout. Its stderr is inherited so station logs reach the terminal.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};

use super::StationLink;
use crate::error::Result;

/// Spawn `program station <config>` and return the child with its link.
///
/// The child is killed if the returned [`Child`] is dropped.
///
/// # Errors
///
/// Returns the I/O error if the process cannot be started.
pub fn spawn_station(program: &Path, config: &Path) -> Result<(Child, StationLink)> {
    let mut child = Command::new(program)
        .arg("station")
        .arg(config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "station stdin not piped"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "station stdout not piped"))?;

    tracing::debug!(config = %config.display(), pid = ?child.id(), "Spawned station process");

    Ok((child, StationLink::new(stdin, stdout)))
}
