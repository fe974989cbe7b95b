//! jMemory - Memory launcher for jEveAssets
//!
//! A small launcher that restarts jEveAssets under a freshly spawned JVM,
//! injecting a configurable maximum-heap limit and forwarding all of its own
//! command-line arguments to the application.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod core;
mod platform;
mod ui;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::{Error, HandoffOutcome, InstallLocation, Supervisor};

/// Application name constant
pub const APP_NAME: &str = "jMemory";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    init_logging();
    ui::install_panic_hook();

    info!("{} v{} starting...", APP_NAME, APP_VERSION);

    let forwarded: Vec<String> = std::env::args().skip(1).collect();

    match run(forwarded) {
        Ok(HandoffOutcome::Detached) => {
            info!("Application started, exiting");
            ExitCode::SUCCESS
        }
        Ok(HandoffOutcome::Ready) => {
            info!("Application reported ready, exiting");
            ExitCode::SUCCESS
        }
        Ok(HandoffOutcome::StartupFailureReported) => {
            info!("Application startup failure reported, exiting");
            ExitCode::SUCCESS
        }
        Ok(HandoffOutcome::Declined) => {
            info!("Launch declined, exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            report_fatal(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(forwarded: Vec<String>) -> Result<HandoffOutcome, Error> {
    let install = InstallLocation::from_current_exe()?;
    info!("Install location: {}", install.dir().display());

    Supervisor::new(install, forwarded).run()
}

/// Initialize the logging system
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jmemory=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Surface a fatal error to the user. Config errors get a modal dialog;
/// resolution and process-start failures stay on the console/log.
fn report_fatal(err: &Error) {
    match err {
        Error::ConfigMissing { .. } | Error::ConfigPersist { .. } => {
            ui::error_dialog(APP_NAME, &err.to_string());
        }
        Error::Resolution { .. } | Error::ChildStart { .. } => {}
    }
}
