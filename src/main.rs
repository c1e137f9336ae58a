//! DomeIO - command-line ground controller for the observatory dome
//!
//! Every invocation opens one scoped rotation session over the configured
//! serial link and releases it on every exit path, Ctrl-C included. The
//! manual `left`/`right` commands are the one deliberate exception to the
//! stop-on-exit guard: they leave the dome rotating until `stop` is issued.

use clap::{Parser, Subcommand};
use dome_io::config::AppConfig;
use dome_io::error::{Error, Result};
use dome_io::rotation::controller::rotate_to_azimuth;
use dome_io::rotation::session::RotationSession;
use dome_io::schedule::{ObservationPlan, ScheduleExecutor};
use dome_io::transport::SerialTransport;
use dome_io::Direction;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "dome-io",
    version,
    about = "Control observatory dome rotation over the motor-controller serial link"
)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dome-io.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rotate to a target azimuth using position feedback
    Gotoaz {
        /// Target heading in degrees, [0, 360)
        target_deg: f64,
    },
    /// Query and print the current azimuth
    Pos,
    /// Stop both rotation channels
    Stop,
    /// Rotate left for two seconds
    Left2sec,
    /// Rotate right for two seconds
    Right2sec,
    /// Begin rotating left; runs until `stop`
    Left,
    /// Begin rotating right; runs until `stop`
    Right,
    /// Execute the scheduled observation plan
    Run {
        /// Plan file override (defaults to the configured plan path)
        #[arg(long)]
        plan: Option<PathBuf>,
    },
}

fn load_config(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        log::info!("Using config: {}", path);
        AppConfig::from_file(path)
    } else {
        log::warn!("Config {} not found, using Crocker dome defaults", path);
        Ok(AppConfig::crocker_defaults())
    }
}

fn run(cli: Cli, cancel: Arc<AtomicBool>) -> Result<()> {
    let config = load_config(&cli.config)?;

    let transport = SerialTransport::open(
        &config.hardware.device,
        config.hardware.baud_rate,
        Duration::from_millis(config.hardware.write_timeout_ms),
    )?;
    let mut session = RotationSession::new(Box::new(transport), config.rotation.to_tuning());

    match cli.command {
        Command::Gotoaz { target_deg } => {
            let outcome = rotate_to_azimuth(&mut session, target_deg)?;
            println!("Azimuth: {:.1}", outcome.final_azimuth_deg);
        }
        Command::Pos => {
            let azimuth = session.query_azimuth()?;
            println!("Azimuth: {:.1}", azimuth);
        }
        Command::Stop => session.stop_all()?,
        Command::Left2sec => session.rotate_for(Direction::Left, 2.0)?,
        Command::Right2sec => session.rotate_for(Direction::Right, 2.0)?,
        Command::Left => {
            session.begin(Direction::Left)?;
            session.leave_running();
        }
        Command::Right => {
            session.begin(Direction::Right)?;
            session.leave_running();
        }
        Command::Run { plan } => {
            let plan_path = plan.unwrap_or_else(|| config.plan_path());
            let plan = ObservationPlan::from_file(
                &plan_path,
                config.rotation.max_rotation_duration_sec,
            )?;
            ScheduleExecutor::new(session, Arc::clone(&cancel)).run(&plan)?;
            return finish(&cancel);
        }
    }

    finish(&cancel)
}

/// Surface an interrupt that arrived during a blocking operation
fn finish(cancel: &AtomicBool) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        return Err(Error::Cancelled);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // The handler only flags; blocking operations finish their bounded step
    // and the session teardown stops the motors before the process exits
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received interrupt; dome will be stopped");
        flag.store(true, Ordering::Relaxed);
    }) {
        log::error!("Error setting Ctrl-C handler: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli, cancel) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
