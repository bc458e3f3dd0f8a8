//! heronet CLI - hero social graph from the command line.
//!
//! Usage:
//!   heronet stats                       # Totals, recent, top connected
//!   heronet hero <name>                 # One hero with friends
//!   heronet graph                       # Node/link JSON
//!   heronet add-hero <name>             # Add a hero (--created-at YYYY-MM-DD)
//!   heronet connect <source> <target>   # Befriend two heroes
//!   heronet render --format svg         # SVG to stdout, PNG to file
//!   heronet report                      # Console report + snapshot

use clap::Parser;
use heronet::cli::{self, Cli};

fn main() {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
