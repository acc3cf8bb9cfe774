// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Run configuration.
//!
//! Command-line flags and `RFC2136_*` environment variables are gathered once
//! into an immutable [`RunConfig`] that is passed explicitly to both phases of
//! a run. Every check here happens before any certificate is read or any DNS
//! message is sent.

use crate::cli::Cli;
use crate::constants::{
    DEFAULT_CERT_ROOT_DIR, DEFAULT_TSIG_ALGORITHM, DNS_PORT, ENV_NAMESERVER, ENV_TSIG_ALGORITHM,
    ENV_TSIG_KEY, ENV_TSIG_SECRET,
};
use crate::errors::ConfigError;
use crate::port_rules::PortRuleTable;
use crate::tsig::TsigKeyData;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use tracing::warn;

/// Settings shared by the extraction and publishing phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// TTL of synthesized records
    pub ttl: u32,
    /// Log certificate names and synthesized records
    pub verbose: bool,
    /// Build everything but send nothing
    pub dry_run: bool,
    /// Directory holding `certificates/<domain>.crt`
    pub cert_root: PathBuf,
    /// Nameserver that resolves zones and receives the updates
    pub nameserver: SocketAddr,
    /// TSIG key, when both key name and secret are configured
    pub tsig: Option<TsigKeyData>,
}

impl RunConfig {
    /// Builds the configuration from parsed flags and the process environment.
    ///
    /// # Errors
    ///
    /// See [`RunConfig::from_lookup`].
    pub fn from_env(cli: &Cli) -> Result<Self, ConfigError> {
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from parsed flags and an environment lookup.
    ///
    /// Empty environment values count as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the nameserver is missing or invalid, the
    /// TSIG key material is unusable, or no certificate root can be determined.
    pub fn from_lookup<F>(cli: &Cli, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let nameserver = var(ENV_NAMESERVER).ok_or(ConfigError::MissingNameserver {
            variable: ENV_NAMESERVER,
        })?;
        let nameserver = parse_nameserver(&nameserver)?;

        let tsig = match (var(ENV_TSIG_KEY), var(ENV_TSIG_SECRET)) {
            (Some(key), Some(secret)) => {
                let algorithm =
                    var(ENV_TSIG_ALGORITHM).unwrap_or_else(|| DEFAULT_TSIG_ALGORITHM.to_string());
                Some(TsigKeyData::new(&key, &secret, &algorithm)?)
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    "Only one of {} and {} is set, updates will be sent unsigned",
                    ENV_TSIG_KEY, ENV_TSIG_SECRET
                );
                None
            }
            (None, None) => None,
        };

        let cert_root = match &cli.path {
            Some(path) => path.clone(),
            None => std::env::current_dir()
                .map_err(ConfigError::WorkingDirectory)?
                .join(DEFAULT_CERT_ROOT_DIR),
        };

        Ok(Self {
            ttl: cli.ttl,
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            cert_root,
            nameserver,
            tsig,
        })
    }
}

/// Builds the port rule table: built-in rules, then each override in order.
///
/// # Errors
///
/// Returns [`ConfigError::PortRule`] for the first malformed override.
pub fn build_port_rules(overrides: &[String]) -> Result<PortRuleTable, ConfigError> {
    let mut rules = PortRuleTable::default();
    for spec in overrides {
        rules.apply_override(spec)?;
    }
    Ok(rules)
}

/// Parses a nameserver address, appending port 53 when none is given.
///
/// Accepts `ip`, `ip:port`, `[ipv6]`, `[ipv6]:port`, `host` and `host:port`.
/// Host names are resolved once, through the system resolver.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidNameserver`] if the address cannot be parsed or resolved.
pub fn parse_nameserver(address: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidNameserver {
        address: address.to_string(),
        reason,
    };

    let address = address.trim();
    if let Ok(socket_addr) = address.parse::<SocketAddr>() {
        return Ok(socket_addr);
    }
    let bare = address.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }

    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|e| invalid(format!("invalid port '{port}': {e}")))?;
            (host, port)
        }
        None => (address, DNS_PORT),
    };
    if host.is_empty() {
        return Err(invalid("missing host".to_string()));
    }

    (host, port)
        .to_socket_addrs()
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("host did not resolve to any address".to_string()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
