//! Scoped ownership of the dome-controller link
//!
//! A [`RotationSession`] exclusively owns the transport for the duration of
//! one command or rotation attempt. Any transport failure inside a session
//! operation triggers an immediate best-effort stop of both channels before
//! the error propagates, and the drop guard issues the same stop if a session
//! goes out of scope with a motion command outstanding.

use crate::error::{Error, Result};
use crate::protocol::commands::{self, Direction, MotorCommand};
use crate::protocol::telemetry::TelemetryReader;
use crate::rotation::{angles, RotationTuning};
use crate::transport::Transport;
use std::time::Duration;

/// One scoped acquisition of the dome-controller transport
pub struct RotationSession {
    transport: Box<dyn Transport>,
    telemetry: TelemetryReader,
    tuning: RotationTuning,
    /// True when no motion command is outstanding on either channel
    idle: bool,
}

impl RotationSession {
    pub fn new(transport: Box<dyn Transport>, tuning: RotationTuning) -> Self {
        RotationSession {
            transport,
            telemetry: TelemetryReader::new(),
            tuning,
            idle: true,
        }
    }

    pub fn tuning(&self) -> &RotationTuning {
        &self.tuning
    }

    /// Write one command token to the link
    fn send(&mut self, cmd: MotorCommand) -> Result<()> {
        let token = cmd.token();
        let mut written = 0;
        while written < token.len() {
            let n = self.transport.write(&token[written..])?;
            if n == 0 {
                return Err(Error::Timeout);
            }
            written += n;
        }
        self.transport.flush()?;
        log::debug!("Sent {:?}", cmd);
        Ok(())
    }

    /// Best-effort stop used on error paths; failures are logged, not returned
    ///
    /// Both stop tokens go out back-to-back; the settle delay is skipped
    /// because this path wants the motors off as soon as possible.
    fn try_stop_all(&mut self) {
        for cmd in [MotorCommand::StopRight, MotorCommand::StopLeft] {
            if let Err(e) = self.send(cmd) {
                log::error!("Best-effort stop write failed: {}", e);
            }
        }
        self.idle = true;
    }

    /// Begin continuous rotation; runs until a stop is commanded
    pub fn begin(&mut self, direction: Direction) -> Result<()> {
        log::info!("Begin continuous rotation {}", direction);
        self.idle = false;
        if let Err(e) = self.send(MotorCommand::begin(direction)) {
            self.try_stop_all();
            return Err(e);
        }
        Ok(())
    }

    /// Stop one rotation channel
    pub fn stop_channel(&mut self, direction: Direction) -> Result<()> {
        if let Err(e) = self.send(MotorCommand::stop(direction)) {
            self.try_stop_all();
            return Err(e);
        }
        Ok(())
    }

    /// Stop both channels: stop-right, settle, stop-left
    ///
    /// If the first stop write fails the second channel is still attempted
    /// before the error propagates.
    pub fn stop_all(&mut self) -> Result<()> {
        log::info!("Stopping dome rotation on both channels");
        let right = self.send(MotorCommand::StopRight);
        std::thread::sleep(self.tuning.settle_delay);
        let left = self.send(MotorCommand::StopLeft);
        self.idle = true;
        right?;
        left?;
        Ok(())
    }

    /// Timed open-loop burst: begin, hold for `seconds`, stop the same channel
    pub fn rotate_for(&mut self, direction: Direction, seconds: f64) -> Result<()> {
        commands::validate_burst_duration(seconds, self.tuning.max_rotation_secs)?;
        log::info!("Timed burst: {} for {:.1}s", direction, seconds);
        self.idle = false;
        if let Err(e) = self.send(MotorCommand::begin(direction)) {
            self.try_stop_all();
            return Err(e);
        }
        std::thread::sleep(Duration::from_secs_f64(seconds));
        if let Err(e) = self.send(MotorCommand::stop(direction)) {
            self.try_stop_all();
            return Err(e);
        }
        self.idle = true;
        Ok(())
    }

    /// Query the dome position and wait for the first valid reading
    ///
    /// Sends the position-request token, waits under the query timeout, and
    /// normalizes the raw value. No reading within the timeout is a hard
    /// failure, never silently defaulted.
    pub fn query_azimuth(&mut self) -> Result<f64> {
        if let Err(e) = self.send(MotorCommand::QueryPosition) {
            self.try_stop_all();
            return Err(e);
        }
        let raw = match self
            .telemetry
            .await_azimuth(self.transport.as_mut(), self.tuning.query_timeout)
        {
            Ok(v) => v,
            Err(e @ Error::NoReading { .. }) => return Err(e),
            Err(e) => {
                self.try_stop_all();
                return Err(e);
            }
        };
        angles::normalize_reading(raw)
    }

    /// Poll for one buffered raw reading without blocking
    pub fn poll_azimuth(&mut self) -> Result<Option<f64>> {
        match self.telemetry.poll_azimuth(self.transport.as_mut()) {
            Err(e) => {
                self.try_stop_all();
                Err(e)
            }
            ok => ok,
        }
    }

    /// Drain buffered readings, keeping the freshest raw value
    pub fn drain_azimuth(&mut self) -> Result<Option<f64>> {
        match self.telemetry.drain_azimuth(self.transport.as_mut()) {
            Err(e) => {
                self.try_stop_all();
                Err(e)
            }
            ok => ok,
        }
    }

    /// Discard stale buffered packets
    pub fn discard_telemetry(&mut self) -> Result<()> {
        match self.telemetry.discard_buffered(self.transport.as_mut()) {
            Err(e) => {
                self.try_stop_all();
                Err(e)
            }
            ok => ok,
        }
    }

    /// Skip the drop-guard stop
    ///
    /// Used by the manual `left`/`right` commands, which deliberately leave
    /// the dome rotating until the operator issues `stop`.
    pub fn leave_running(&mut self) {
        self.idle = true;
    }
}

impl Drop for RotationSession {
    fn drop(&mut self) {
        if !self.idle {
            log::warn!("Session closing with a motion command outstanding; stopping dome");
            self.try_stop_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn fast_tuning() -> RotationTuning {
        RotationTuning {
            max_rotation_secs: 10.0,
            settle_delay: Duration::ZERO,
            query_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(1),
            verify_window: Duration::from_millis(10),
            min_burst_secs: 0.0,
            ..RotationTuning::default()
        }
    }

    #[test]
    fn test_rotate_for_writes_begin_then_stop() {
        let mock = MockTransport::new();
        let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());

        session.rotate_for(Direction::Left, 0.0).unwrap();
        assert_eq!(mock.get_written(), b"DLODLo");
    }

    #[test]
    fn test_rotate_for_rejects_invalid_duration_without_writing() {
        let mock = MockTransport::new();
        let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());

        assert!(matches!(
            session.rotate_for(Direction::Right, 11.0),
            Err(Error::InvalidDuration { .. })
        ));
        assert!(matches!(
            session.rotate_for(Direction::Right, -1.0),
            Err(Error::InvalidDuration { .. })
        ));
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_stop_all_is_idempotent() {
        let mock = MockTransport::new();
        let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());

        session.stop_all().unwrap();
        session.stop_all().unwrap();
        // Only stop tokens, never a begin
        assert_eq!(mock.get_written(), b"DRoDLoDRoDLo");
    }

    #[test]
    fn test_query_azimuth_normalizes_artifact() {
        let mock = MockTransport::new();
        mock.inject_line("Azimuth = -1");
        let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());

        assert_eq!(session.query_azimuth().unwrap(), 1.0);
        assert_eq!(mock.get_written(), b"RDP");
    }

    #[test]
    fn test_query_azimuth_fails_hard_without_reading() {
        let mock = MockTransport::new();
        let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());

        assert!(matches!(
            session.query_azimuth(),
            Err(Error::NoReading { .. })
        ));
    }

    #[test]
    fn test_begin_failure_resolves_via_best_effort_stop() {
        let mock = MockTransport::new();
        let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());

        mock.set_fail_writes(true);
        assert!(matches!(
            session.begin(Direction::Right),
            Err(Error::Timeout)
        ));

        // The best-effort stop already ran (and failed on the dead link), so
        // the drop guard has nothing left to do
        mock.set_fail_writes(false);
        drop(session);
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_drop_guard_stops_after_begin() {
        let mock = MockTransport::new();
        {
            let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());
            session.begin(Direction::Left).unwrap();
        }
        assert_eq!(mock.get_written(), b"DLODRoDLo");
    }

    #[test]
    fn test_leave_running_disables_drop_guard() {
        let mock = MockTransport::new();
        {
            let mut session = RotationSession::new(Box::new(mock.clone()), fast_tuning());
            session.begin(Direction::Left).unwrap();
            session.leave_running();
        }
        assert_eq!(mock.get_written(), b"DLO");
    }
}
