//! CLI module for heronet.
//!
//! Commands:
//! - Read: stats, hero, graph, report
//! - Write: add-hero, connect
//! - Export: render

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::config::HeroNetConfig;
use crate::export::ImageFormat;
use crate::graph::today;
use crate::report::NetworkReport;
use crate::service::{with_service, HeroService, SharedService};

#[derive(Parser)]
#[command(name = "heronet")]
#[command(about = "Hero social graph: stats, lookups, mutations and renders", long_about = None)]
pub struct Cli {
    /// Directory holding the hero and link tables (overrides config)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file
    #[arg(short, long, global = true, default_value = "heronet.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Read ─────────────────────────────────────────────────────
    /// Totals, recently added heroes and the most connected
    Stats,

    /// One hero with emoji, creation date and friends
    Hero {
        /// Hero name
        name: String,
    },

    /// Node/link JSON for the whole network
    Graph,

    /// Console report plus a snapshot image
    Report,

    // ─── Write ────────────────────────────────────────────────────
    /// Add a hero
    AddHero {
        name: String,

        /// Creation date, YYYY-MM-DD or RFC 3339 (default: today)
        #[arg(long)]
        created_at: Option<String>,
    },

    /// Befriend two heroes by name
    Connect { source: String, target: String },

    // ─── Export ───────────────────────────────────────────────────
    /// Render the network as PNG or SVG
    Render {
        #[arg(short, long, default_value = "png")]
        format: ImageFormat,

        /// Output file. SVG without one goes to stdout; PNG defaults to
        /// the configured snapshot file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Config file contents with the `--data-dir` override applied.
    pub fn load_config(&self) -> Result<HeroNetConfig> {
        let mut config = HeroNetConfig::load(&self.config)?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }
}

/// Open the service named by the CLI flags and run one command.
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    let service = HeroService::from_config(&config)
        .with_context(|| format!("failed to open hero store in {}", config.data_dir.display()))?
        .into_shared();

    let stdout = std::io::stdout();
    execute(&service, &config, cli.command, &mut stdout.lock())
}

/// Run `command` against `service`, writing results to `out`.
pub fn execute(
    service: &SharedService,
    config: &HeroNetConfig,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Stats => print_json(out, &with_service(service, |s| s.get_stats())?),

        Commands::Hero { name } => {
            print_json(out, &with_service(service, |s| s.get_hero(&name))?)
        }

        Commands::Graph => print_json(out, &with_service(service, |s| s.get_graph())?),

        Commands::AddHero { name, created_at } => {
            let reply = with_service(service, |s| s.add_hero(&name, created_at.as_deref()))??;
            print_json(out, &reply)
        }

        Commands::Connect { source, target } => {
            let reply = with_service(service, |s| s.add_connection(&source, &target))??;
            print_json(out, &reply)
        }

        Commands::Render { format, output } => match (format, output) {
            (ImageFormat::Svg, None) => {
                let svg = with_service(service, |s| s.render_image(ImageFormat::Svg))??;
                out.write_all(&svg)?;
                writeln!(out)?;
                Ok(())
            }
            (ImageFormat::Png, None) => {
                let path = with_service(service, |s| s.write_snapshot(None))??;
                writeln!(out, "{}", path.display())?;
                Ok(())
            }
            (format, Some(path)) => {
                let bytes = with_service(service, |s| s.render_image(format))??;
                fs::write(&path, bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                writeln!(out, "{}", path.display())?;
                Ok(())
            }
        },

        Commands::Report => {
            let report = with_service(service, |s| {
                NetworkReport::build(s, &config.spotlight, today())
            })?;
            write!(out, "{}", report)?;

            match with_service(service, |s| s.write_snapshot(None))? {
                Ok(path) => writeln!(out, "\nNetwork visualization saved as '{}'", path.display())?,
                Err(e) => warn!(error = %e, "failed to write snapshot"),
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
