//! `skylight`: always-on terminal kiosk dashboard.
//!
//! Tiles are declared in the configuration file and composed into three
//! bands; each tile keeps itself fresh against its own collaborator while
//! the notification push channel and device control feed the same screen.
//!
//! Logs are written to a file (default `/tmp/skylight.log`) to avoid
//! corrupting the terminal. `Ctrl-R`, or a reload frame from the push
//! channel, tears the whole client down and rebuilds it from a freshly
//! loaded configuration.

mod action;
mod app;
mod check;
mod component;
mod dashboard;
mod data_bridge;
mod event;
mod status_bar;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use skylight_core::Services;

use crate::app::{App, Exit};
use crate::widgets::WidgetRegistry;

/// Kiosk dashboard for home status, weather, calendar and devices.
#[derive(Parser, Debug)]
#[command(name = "skylight", version, about)]
struct Cli {
    /// Config file (TOML, or JSON when it ends in .json). Defaults to the
    /// platform config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file path (defaults to /tmp/skylight.log)
    #[arg(long, default_value = "/tmp/skylight.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Load the configuration, print what it resolves to, and exit.
    #[arg(long)]
    check: bool,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr; that would
/// corrupt the kiosk screen. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "skylight_tui={log_level},skylight_core={log_level},skylight_api={log_level},skylight_config={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("skylight.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.check {
        let config = skylight_config::load_config(cli.config.as_deref())?;
        let problems = skylight_config::validate(&config);
        print!(
            "{}",
            check::summary(&config, &WidgetRegistry::default(), &problems)
        );
        return Ok(());
    }

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file. Hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    info!(
        config = %cli.config.as_ref().map_or_else(skylight_config::config_path, Clone::clone).display(),
        "starting skylight"
    );

    loop {
        let config = skylight_config::load_config_or_default(cli.config.as_deref());
        for problem in skylight_config::validate(&config) {
            warn!(%problem, "configuration problem");
        }
        let credentials = skylight_config::resolve_credentials(&config);
        let services = Services::new(config, credentials);

        let mut app = App::new(services);
        match app.run().await? {
            Exit::Quit => break,
            Exit::Reload => info!("reloading client"),
        }
    }

    Ok(())
}
