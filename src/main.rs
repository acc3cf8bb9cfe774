// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use tlsa_updater::{
    cli::{version_string, Cli},
    config::{build_port_rules, RunConfig},
    constants::ENV_LOG_FORMAT,
    run::{build_batch, publish_batch},
    update::HickoryUpdateClient,
    zone::SoaZoneResolver,
};
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version_string());
        return Ok(());
    }

    // One domain at a time, all DNS I/O is blocking hickory calls on the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .thread_name("tlsa-updater")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Initializes logging.
///
/// Format: timestamp file:line LEVEL message
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO, or DEBUG with `--verbose`.
/// `RUST_LOG_FORMAT=json` switches to JSON output.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);
    debug!("Logging initialized with file and line number tracking");

    // Configuration errors are fatal before any certificate is read
    let config = RunConfig::from_env(&cli)?;
    let rules = build_port_rules(&cli.mappings)?;
    debug!("Run configuration: {:?}", config);

    if cli.domains.is_empty() {
        warn!("No domains given, nothing to do");
    }

    let resolver = SoaZoneResolver::new(config.nameserver);
    let batch = build_batch(&cli.domains, &config, &rules, &resolver).await?;
    info!(
        "Extracted {} TLSA record(s) for {} zone(s)",
        batch.record_count(),
        batch.len()
    );

    let client = HickoryUpdateClient::new(config.nameserver, config.tsig.clone());
    let summary = publish_batch(batch, &config, &client).await;

    if config.dry_run {
        info!("Dry run complete, {} update(s) not sent", summary.skipped);
    } else {
        info!(
            "Published {} of {} zone update(s)",
            summary.succeeded, summary.attempted
        );
    }
    if !summary.is_success() {
        // Per-zone failures were already logged; they do not change the exit status
        warn!("{} zone update(s) failed", summary.failed.len());
    }

    Ok(())
}
