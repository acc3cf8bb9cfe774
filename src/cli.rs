// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line interface.

use crate::constants::DEFAULT_TLSA_TTL_SECS;
use clap::Parser;
use std::path::PathBuf;

/// Publish TLSA records for ACME-issued certificates via RFC 2136 dynamic updates.
///
/// The nameserver and TSIG key are taken from the environment:
/// `RFC2136_NAMESERVER` (required), `RFC2136_TSIG_KEY`, `RFC2136_TSIG_SECRET`
/// and `RFC2136_TSIG_ALGORITHM`.
#[derive(Parser, Debug, Clone)]
#[command(name = "tlsa-updater", disable_version_flag = true)]
pub struct Cli {
    /// Domains whose certificates are read from `<path>/certificates/<domain>.crt`
    #[arg(value_name = "DOMAIN")]
    pub domains: Vec<String>,

    /// TTL of the TLSA records
    #[arg(long, default_value_t = DEFAULT_TLSA_TTL_SECS)]
    pub ttl: u32,

    /// Verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Dry run, do not actually send DNS updates
    #[arg(long = "dry-run", visible_alias = "dry_run")]
    pub dry_run: bool,

    /// Path to get the certificates from [default: ./.lego]
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Add prefix to port mappings: `<prefix>:<port>{t|u}[,<port>{t|u}]*[;...]*`, e.g. `influx:8888t`
    #[arg(long = "mappings", value_name = "RULES")]
    pub mappings: Vec<String>,

    /// Show version information
    #[arg(long)]
    pub version: bool,
}

/// Version line printed by `--version`.
#[must_use]
pub fn version_string() -> String {
    format!(
        "{} version {} {}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
