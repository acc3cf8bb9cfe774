// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the TLSA updater.
//!
//! The taxonomy follows how each failure is treated by a run:
//! - [`ConfigError`] and [`PortRuleError`] are fatal before any file or network activity
//! - [`CertificateError`] and [`ZoneResolutionError`] abort the whole run
//! - [`UpdateError`] is logged per zone and never aborts the run

use std::path::PathBuf;
use thiserror::Error;

/// Errors detected while assembling the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `RFC2136_NAMESERVER` is unset or empty
    #[error("RFC2136 nameserver missing: set {variable}")]
    MissingNameserver {
        /// The environment variable that should carry the address
        variable: &'static str,
    },

    /// The nameserver address could not be parsed or resolved
    #[error("Invalid nameserver address '{address}': {reason}")]
    InvalidNameserver {
        /// The address as configured
        address: String,
        /// Why it was rejected
        reason: String,
    },

    /// The working directory could not be determined, so no default path exists
    #[error("Could not determine current working directory, please pass --path: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// TSIG key material is unusable
    #[error(transparent)]
    Tsig(#[from] TsigError),

    /// A `--mappings` value was rejected
    #[error(transparent)]
    PortRule(#[from] PortRuleError),
}

/// Errors related to TSIG (Transaction Signature) key material.
#[derive(Error, Debug, Clone)]
pub enum TsigError {
    /// The algorithm name is not one we know how to sign with
    #[error("Unsupported TSIG algorithm '{algorithm}'. Supported algorithms: hmac-sha256, hmac-sha384, hmac-sha512")]
    UnsupportedAlgorithm {
        /// The algorithm as configured
        algorithm: String,
    },

    /// The shared secret is not valid base64
    #[error("Invalid TSIG secret for key '{key_name}': {reason}")]
    InvalidSecret {
        /// The TSIG key name
        key_name: String,
        /// Decoder message
        reason: String,
    },

    /// The key name is not a valid domain name
    #[error("Invalid TSIG key name '{key_name}': {reason}")]
    InvalidKeyName {
        /// The TSIG key name
        key_name: String,
        /// Parser message
        reason: String,
    },

    /// hickory refused to build a signer from the key material
    #[error("Failed to create TSIG signer for key '{key_name}': {reason}")]
    SignerCreationFailed {
        /// The TSIG key name
        key_name: String,
        /// Signer message
        reason: String,
    },
}

/// Errors raised while parsing a port rule override string.
///
/// Grammar: `prefix:port{t|u}[,port{t|u}]*[;prefix:...]*`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortRuleError {
    /// An entry has no `:` between the prefix and its ports
    #[error("missing name: entry '{entry}' has no ':' separating prefix and ports")]
    MissingSeparator {
        /// The offending entry
        entry: String,
    },

    /// A port is not a number in the range 0..=65535
    #[error("invalid port number '{port}' in entry '{entry}'")]
    InvalidPort {
        /// The offending entry
        entry: String,
        /// The offending port token
        port: String,
    },

    /// A port does not end with `t` (TCP) or `u` (UDP)
    #[error("missing 't' or 'u' suffix on port '{port}' in entry '{entry}'")]
    MissingProtocolSuffix {
        /// The offending entry
        entry: String,
        /// The offending port token
        port: String,
    },
}

/// Errors raised while loading a certificate from disk.
#[derive(Error, Debug)]
pub enum CertificateError {
    /// The certificate file could not be read
    #[error("Failed to read certificate {path}: {source}")]
    Read {
        /// Path of the certificate file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The file does not contain a PEM certificate block
    #[error("PEM decode of {path} did not yield a valid certificate block: {reason}")]
    Pem {
        /// Path of the certificate file
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// The PEM block does not hold a valid X.509 certificate
    #[error("Invalid X.509 certificate in {path}: {reason}")]
    X509 {
        /// Path of the certificate file
        path: PathBuf,
        /// Parser message
        reason: String,
    },
}

/// The owning zone of a name could not be determined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unable to determine zone for '{name}': {reason}")]
pub struct ZoneResolutionError {
    /// The name whose zone was looked up
    pub name: String,
    /// Upstream cause
    pub reason: String,
}

/// Errors raised while turning one certificate into TLSA records.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The certificate could not be loaded
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// A subject name could not be placed in a zone
    #[error(transparent)]
    ZoneResolution(#[from] ZoneResolutionError),
}

/// Errors raised while sending one zone's update transaction.
#[derive(Error, Debug, Clone)]
pub enum UpdateError {
    /// A zone or owner name could not be encoded as a DNS name
    #[error("Invalid DNS name '{name}' in update for zone '{zone}': {reason}")]
    InvalidName {
        /// The zone being updated
        zone: String,
        /// The offending name
        name: String,
        /// Parser message
        reason: String,
    },

    /// The TSIG signer could not be built
    #[error(transparent)]
    Tsig(#[from] TsigError),

    /// The update could not be delivered or no reply was received
    #[error("DNS update for zone '{zone}' to server {server} failed: {reason}")]
    Transport {
        /// The zone being updated
        zone: String,
        /// The nameserver address
        server: String,
        /// Transport message
        reason: String,
    },

    /// The server answered with a non-success response code
    #[error("DNS update for zone '{zone}' failed. Server {server} replied: {rcode}")]
    Rejected {
        /// The zone being updated
        zone: String,
        /// The nameserver address
        server: String,
        /// Response code as reported by the server
        rcode: String,
    },

    /// The blocking task driving the update panicked or was cancelled
    #[error("DNS update task for zone '{zone}' failed: {reason}")]
    TaskFailed {
        /// The zone being updated
        zone: String,
        /// Join error message
        reason: String,
    },
}

impl UpdateError {
    /// Returns the zone the failed transaction was addressed to, if known.
    #[must_use]
    pub fn zone(&self) -> Option<&str> {
        match self {
            Self::InvalidName { zone, .. }
            | Self::Transport { zone, .. }
            | Self::Rejected { zone, .. }
            | Self::TaskFailed { zone, .. } => Some(zone),
            Self::Tsig(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
