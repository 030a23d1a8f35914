//! Check command - compare every running container with its registry
//!
//! Discovers compose files, lists running containers, checks them with a
//! bounded number in flight and prints the report. Exits with status 1 when
//! any container has an update available.

use anyhow::{Context, Result};
use chrono::Local;
use owo_colors::OwoColorize;
use std::sync::Arc;
use tagwatch_check::{OutputFormat, ScanReport, ScanReporter, UpdateChecker};
use tagwatch_core::RuntimeConfig;
use tagwatch_docker::{discover_compose_files, ContainerEnumerator, DockerCli};
use tagwatch_image::RegistryClient;
use tracing::info;

use crate::cli::{CheckArgs, GlobalOpts};
use crate::commands::load_config;
use crate::output;

/// Run the update check
pub async fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    apply_flags(&mut config, &args);

    let format = OutputFormat::from(args.format);
    let human = format == OutputFormat::Human;
    let live = human && !global.quiet;
    let reporter = ScanReporter::new(global.verbose > 0);
    let started = Local::now();

    let client = RegistryClient::with_settings(config.registry_settings())
        .context("Failed to create registry client")?;
    let docker = Arc::new(
        DockerCli::new(&config.scan.docker_bin)
            .context("Docker is required to list containers")?
            .with_timeout(config.scan.docker_timeout()),
    );

    if live {
        println!("{}", reporter.format_header(&started));
    }

    let compose = if args.no_compose {
        None
    } else {
        let inventory = discover_compose_files(&config.scan.compose_dir);
        if live {
            println!("{}", reporter.format_compose(&inventory));
        }
        Some(inventory)
    };

    let spinner = output::spinner("Listing running containers...", !live);
    let containers = docker.list_running().await;
    spinner.finish_and_clear();
    let containers = containers.context("Failed to list running containers")?;

    info!(
        "Checking {} container(s), {} at a time",
        containers.len(),
        config.scan.effective_concurrency()
    );
    if live {
        println!(
            "{}",
            format!("Found {} running container(s)", containers.len()).bold()
        );
    }

    let checker = UpdateChecker::new(Arc::new(client), docker)
        .with_concurrency(config.scan.effective_concurrency());
    let outcomes = checker
        .check_all_with(containers, |outcome| {
            if live {
                println!("{}", reporter.format_progress(outcome));
            }
        })
        .await;

    let mut report = ScanReport::new(outcomes, compose);
    report.scanned_at = started;

    if live {
        println!();
        print!("{}", reporter.format_results(&report));
    } else {
        println!("{}", reporter.format(&report, format));
    }

    let exit_code = report.exit_code();
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

/// CLI flags take precedence over file and environment settings
fn apply_flags(config: &mut RuntimeConfig, args: &CheckArgs) {
    if let Some(dir) = &args.compose_dir {
        config.scan.compose_dir = dir.to_string();
    }
    if let Some(concurrency) = args.concurrency {
        config.scan.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.network.request_timeout_secs = timeout;
    }
}
