//! Wire protocol for the dome motor controller
//!
//! The link is ASCII and line-oriented: one fixed token per outbound write,
//! one `<marker>=<float>` position packet per inbound line.

pub mod commands;
pub mod telemetry;

pub use commands::{Direction, MotorCommand};
pub use telemetry::TelemetryReader;
