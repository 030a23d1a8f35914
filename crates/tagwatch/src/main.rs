//! tagwatch CLI - check running containers for newer images
//!
//! This is the main entry point for the tagwatch command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

/// Exit status for configuration, engine and other fatal errors
const EXIT_FATAL: i32 = 2;

#[tokio::main]
async fn main() {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        output::error(&format!("{:#}", e));
        std::process::exit(EXIT_FATAL);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let global = cli::GlobalOpts {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };

    match cli.command {
        Commands::Check(args) => commands::check::run(args, &global).await,
        Commands::Resolve(args) => commands::resolve::run(args, &global).await,
        Commands::Parse(args) => commands::parse::run(args),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Version(args) => commands::version::run(args),
    }
}

/// Initialize tracing with appropriate verbosity; RUST_LOG wins when set
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so JSON/YAML on stdout stays parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
