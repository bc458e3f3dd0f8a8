//! heronet JSON-RPC server — the hero graph for AI agents.
//!
//! Runs a JSON-RPC 2.0 server over STDIO exposing the hero network as
//! Model Context Protocol tools.
//!
//! Usage:
//!   heronet-mcp [config.toml]
//!
//! Without an argument, reads `heronet.toml` from the working directory
//! (defaults apply when it is missing).

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use heronet::graph::today;
use heronet::report::NetworkReport;
use heronet::service::{with_service, HeroService};
use heronet::HeroNetConfig;

fn main() {
    // stdout carries the protocol; tracing goes to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("heronet.toml"));
    let config = HeroNetConfig::load(&config_path)?;

    info!(data_dir = %config.data_dir.display(), "heronet server starting");

    let service = HeroService::from_config(&config)
        .with_context(|| format!("failed to open hero store in {}", config.data_dir.display()))?
        .into_shared();

    with_service(&service, |s| {
        let report = NetworkReport::build(s, &config.spotlight, today());
        for line in report.to_string().lines() {
            info!("{}", line);
        }
        match s.write_snapshot(None) {
            Ok(path) => info!(path = %path.display(), "network snapshot written"),
            Err(e) => warn!(error = %e, "failed to write network snapshot"),
        }
    })?;

    info!("server ready — waiting for JSON-RPC requests on stdin");
    heronet::mcp::server::run(service);
    Ok(())
}
