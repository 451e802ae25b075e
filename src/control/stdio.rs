//! Stdio output for the control plane.
//!
//! # Important
//!
//! - **stdout of the hub**: JSON reports (one per line)
//! - **stdout of a station**: the ring itself; never write reports there
//! - **stderr**: logs (see [`crate::logging`])
//! - **Never use `println!`**: It may add `\r\n` on Windows
//!
//! # Example
//!
//! ```ignore
//! use tokring::control::write_stdout_json;
//!
//! let report = handle.run_for(duration).await;
//! write_stdout_json(&report)?;
//! ```

use std::io::Write;

/// Write a line to stdout.
///
/// Writes the string followed by a single `\n` and flushes.
///
/// # Errors
///
/// Returns IO error if write or flush fails.
pub fn write_stdout_line(line: &str) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_line(&mut handle, line)
}

/// Write a JSON value to stdout as a single line.
///
/// # Errors
///
/// Returns error if serialization or write fails.
pub fn write_stdout_json<T: serde::Serialize>(value: &T) -> crate::error::Result<()> {
    let json = serde_json::to_string(value)?;
    write_stdout_line(&json)?;
    Ok(())
}

fn write_line<W: Write>(out: &mut W, line: &str) -> std::io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_line_uses_bare_newline() {
        let mut out = Vec::new();
        write_line(&mut out, r#"{"links":[]}"#).unwrap();
        assert_eq!(out, b"{\"links\":[]}\n");
    }

    #[test]
    fn test_write_stdout_json_serializes() {
        let report = crate::control::HubReport::default();
        assert!(write_stdout_json(&report).is_ok());
    }
}
