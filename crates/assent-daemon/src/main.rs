//! `assentd`: Slack approval broker daemon.
//!
//! Loads layered configuration, posts approval requests to Slack and holds
//! each `/ask` request open until a human decides or the deadline passes.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use assent_config::{Config, LoggingSection};
use assent_daemon::{AppState, RoutePaths, router, server};
use assent_telemetry::{LogConfig, LogFormat};

/// Assent daemon: Slack approval broker.
#[derive(Parser)]
#[command(name = "assentd")]
#[command(author, version, about = "Assent daemon: blocks HTTP callers until a Slack approval")]
struct Args {
    /// Extra config file merged on top of system and user config.
    #[arg(short, long, env = "ASSENT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn log_config(section: &LoggingSection, verbose: bool) -> LogConfig {
    let level = if verbose { "debug" } else { section.level.as_str() };
    let format = section.format.parse().unwrap_or(LogFormat::Compact);
    let mut config = LogConfig::new(level).with_format(format);
    for directive in &section.directives {
        config = config.with_directive(directive.clone());
    }
    if let Some(dir) = &section.directory {
        config = config.with_file_logging(dir.clone());
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolved = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    let mut config = resolved.config;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if let Err(e) = assent_telemetry::setup_logging(&log_config(&config.logging, args.verbose)) {
        eprintln!("Failed to initialize logging: {e}");
    }
    for file in &resolved.loaded_files {
        info!(path = %file, "using config file");
    }

    let state = AppState::from_config(&config).context("failed to initialize approval broker")?;
    let broker = state.broker.clone();
    let app = router(state, &RoutePaths::from(&config.server));

    let listen_addr = config.server.listen_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    let addr = listener.local_addr()?;

    println!(
        "{}",
        format!(
            "assentd listening on {addr} (request: {}, callback: {})",
            config.server.request_path, config.server.callback_path
        )
        .cyan()
        .bold()
    );

    let serving = server::serve(listener, app, server::ctrl_c());
    tokio::pin!(serving);

    tokio::select! {
        result = &mut serving => result.context("server error")?,
        () = server::ctrl_c() => {
            let pending = broker.pending_count();
            println!("\n{}", "Shutting down, waiting for pending approvals...".yellow());
            if pending > 0 {
                warn!(pending, "waiting for pending approvals; press Ctrl-C again to abort them");
            }
            tokio::select! {
                result = &mut serving => result.context("server error")?,
                () = server::ctrl_c() => {
                    warn!(pending = broker.pending_count(), "aborting pending approvals");
                },
            }
        },
    }

    println!("{}", "Daemon stopped".green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_forces_debug() {
        let section = LoggingSection::default();
        assert_eq!(log_config(&section, true).level, "debug");
        assert_eq!(log_config(&section, false).level, "info");
    }

    #[test]
    fn logging_section_maps_to_log_config() {
        let section = LoggingSection {
            level: "warn".to_owned(),
            format: "json".to_owned(),
            directives: vec!["hyper=error".to_owned()],
            directory: Some(PathBuf::from("/var/log/assent")),
        };
        let config = log_config(&section, false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.directives, vec!["hyper=error"]);
        assert!(!config.ansi);
    }

    #[test]
    fn args_parse() {
        let args = Args::parse_from(["assentd", "--config", "/tmp/a.toml", "-p", "9000", "-v"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/a.toml")));
        assert_eq!(args.port, Some(9000));
        assert!(args.verbose);
    }
}
