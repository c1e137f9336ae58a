//! Telemetry packet reader
//!
//! The dome controller reports position as ASCII lines of the form
//! `Azimuth = 123.4`. Anything else on the wire is ignored, and undecodable
//! bytes are dropped without failing the session. The reader never blocks on
//! its own; callers impose the overall timeout.

use crate::error::{Error, Result};
use crate::transport::Transport;
use std::time::{Duration, Instant};

/// Marker identifying a position packet, matched case-insensitively
const POSITION_MARKER: &str = "az";

/// Pause between polls while waiting for the controller to speak
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Assembles transport bytes into lines and extracts azimuth readings
#[derive(Debug, Default)]
pub struct TelemetryReader {
    pending: Vec<u8>,
}

impl TelemetryReader {
    pub fn new() -> Self {
        TelemetryReader {
            pending: Vec::new(),
        }
    }

    /// Pull whatever the transport has buffered into the pending line buffer
    fn fill(&mut self, transport: &mut dyn Transport) -> Result<()> {
        let mut buf = [0u8; 256];
        while transport.available()? > 0 {
            let n = transport.read(&mut buf)?;
            if n == 0 {
                break;
            }
            self.pending.extend_from_slice(&buf[..n]);
        }
        Ok(())
    }

    /// Take the next complete raw line out of the pending buffer
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        Some(self.pending.drain(..=pos).collect())
    }

    /// Poll for a single azimuth reading without blocking
    ///
    /// Consumes buffered lines until a position packet is found; non-position
    /// and undecodable lines are skipped. Returns the raw reported value, not
    /// yet normalized.
    pub fn poll_azimuth(&mut self, transport: &mut dyn Transport) -> Result<Option<f64>> {
        self.fill(transport)?;
        while let Some(raw) = self.take_line() {
            let line = match std::str::from_utf8(&raw) {
                Ok(s) if s.is_ascii() => s.trim(),
                _ => {
                    log::debug!("Dropping undecodable telemetry line ({} bytes)", raw.len());
                    continue;
                }
            };
            if let Some(azimuth) = parse_position_line(line) {
                return Ok(Some(azimuth));
            }
            log::debug!("Ignoring non-position packet: {:?}", line);
        }
        Ok(None)
    }

    /// Block until an azimuth reading arrives or `timeout` expires
    ///
    /// The first valid reading wins; expiry is a hard failure.
    pub fn await_azimuth(
        &mut self,
        transport: &mut dyn Transport,
        timeout: Duration,
    ) -> Result<f64> {
        let start = Instant::now();
        loop {
            if let Some(azimuth) = self.poll_azimuth(transport)? {
                return Ok(azimuth);
            }
            if start.elapsed() >= timeout {
                return Err(Error::NoReading { waited: timeout });
            }
            std::thread::sleep(IDLE_POLL);
        }
    }

    /// Drain everything currently buffered, returning the freshest reading
    pub fn drain_azimuth(&mut self, transport: &mut dyn Transport) -> Result<Option<f64>> {
        let mut last = None;
        while let Some(azimuth) = self.poll_azimuth(transport)? {
            last = Some(azimuth);
        }
        Ok(last)
    }

    /// Throw away buffered transport bytes and any partial pending line
    pub fn discard_buffered(&mut self, transport: &mut dyn Transport) -> Result<()> {
        let mut buf = [0u8; 256];
        while transport.available()? > 0 {
            if transport.read(&mut buf)? == 0 {
                break;
            }
        }
        self.pending.clear();
        Ok(())
    }
}

/// Parse one decoded line as a position packet
///
/// `"Azimuth = 19"` parses to `19.0`; the marker match is case-insensitive
/// and anything without it yields no reading.
fn parse_position_line(line: &str) -> Option<f64> {
    let lower = line.to_ascii_lowercase();
    if !lower.contains(POSITION_MARKER) {
        return None;
    }
    let value = lower.split('=').nth(1)?;
    value.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_parse_position_line() {
        assert_eq!(parse_position_line("Azimuth = 19"), Some(19.0));
        assert_eq!(parse_position_line("AZIMUTH=272.5"), Some(272.5));
        assert_eq!(parse_position_line("az = -1"), Some(-1.0));
        assert_eq!(parse_position_line("Battery = 12.1"), None);
        assert_eq!(parse_position_line("Azimuth"), None);
        assert_eq!(parse_position_line("Azimuth = north"), None);
        assert_eq!(parse_position_line(""), None);
    }

    #[test]
    fn test_poll_reads_position_packet() {
        let mock = MockTransport::new();
        let mut reader = TelemetryReader::new();
        mock.inject_line("Azimuth = 19");

        let mut transport = mock.clone();
        assert_eq!(reader.poll_azimuth(&mut transport).unwrap(), Some(19.0));
        assert_eq!(reader.poll_azimuth(&mut transport).unwrap(), None);
    }

    #[test]
    fn test_poll_skips_noise() {
        let mock = MockTransport::new();
        let mut reader = TelemetryReader::new();
        mock.inject_line("Battery = 12.1");
        mock.inject_read(&[0xFF, 0xFE, b'\n']); // undecodable line
        mock.inject_line("Azimuth = 42.5");

        let mut transport = mock.clone();
        assert_eq!(reader.poll_azimuth(&mut transport).unwrap(), Some(42.5));
    }

    #[test]
    fn test_partial_line_completes_later() {
        let mock = MockTransport::new();
        let mut reader = TelemetryReader::new();
        mock.inject_read(b"Azimu");

        let mut transport = mock.clone();
        assert_eq!(reader.poll_azimuth(&mut transport).unwrap(), None);

        mock.inject_read(b"th = 101\n");
        assert_eq!(reader.poll_azimuth(&mut transport).unwrap(), Some(101.0));
    }

    #[test]
    fn test_drain_keeps_last_reading() {
        let mock = MockTransport::new();
        let mut reader = TelemetryReader::new();
        mock.inject_line("Azimuth = 10");
        mock.inject_line("Azimuth = 11");
        mock.inject_line("Azimuth = 12");

        let mut transport = mock.clone();
        assert_eq!(reader.drain_azimuth(&mut transport).unwrap(), Some(12.0));
    }

    #[test]
    fn test_await_times_out_without_reading() {
        let mock = MockTransport::new();
        let mut reader = TelemetryReader::new();

        let mut transport = mock.clone();
        let result = reader.await_azimuth(&mut transport, Duration::from_millis(30));
        assert!(matches!(result, Err(Error::NoReading { .. })));
    }

    #[test]
    fn test_discard_clears_partial_lines() {
        let mock = MockTransport::new();
        let mut reader = TelemetryReader::new();
        mock.inject_read(b"Azimuth = 5");

        let mut transport = mock.clone();
        assert_eq!(reader.poll_azimuth(&mut transport).unwrap(), None);
        reader.discard_buffered(&mut transport).unwrap();

        mock.inject_line("0"); // would have completed "Azimuth = 50"
        assert_eq!(reader.poll_azimuth(&mut transport).unwrap(), None);
    }
}
