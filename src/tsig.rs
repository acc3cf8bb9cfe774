// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TSIG key handling for signed dynamic updates.

use crate::constants::TSIG_FUDGE_TIME_SECS;
use crate::errors::TsigError;
use crate::fqdn::to_fqdn;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hickory_client::rr::rdata::tsig::TsigAlgorithm;
use hickory_client::rr::Name;
use hickory_proto::rr::dnssec::tsig::TSigner;
use std::fmt;
use std::str::FromStr;

/// TSIG key material, decoded and validated.
#[derive(Clone, PartialEq, Eq)]
pub struct TsigKeyData {
    /// Fully-qualified key name
    pub name: String,
    /// HMAC algorithm
    pub algorithm: TsigAlgorithm,
    /// Raw shared secret
    pub secret: Vec<u8>,
}

// The secret never ends up in logs
impl fmt::Debug for TsigKeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigKeyData")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl TsigKeyData {
    /// Builds key data from the configured key name, base64 secret and algorithm name.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is unsupported, the secret is not valid
    /// base64, or the key name is not a valid domain name.
    pub fn new(name: &str, secret_b64: &str, algorithm: &str) -> Result<Self, TsigError> {
        let algorithm = parse_tsig_algorithm(algorithm)?;
        let name = to_fqdn(name);
        Name::from_str(&name).map_err(|e| TsigError::InvalidKeyName {
            key_name: name.clone(),
            reason: e.to_string(),
        })?;
        let secret = BASE64
            .decode(secret_b64.trim())
            .map_err(|e| TsigError::InvalidSecret {
                key_name: name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name,
            algorithm,
            secret,
        })
    }
}

/// Maps a TSIG algorithm name to a signing algorithm.
///
/// Accepts the names used by BIND and nsupdate, case-insensitively, with or
/// without a trailing dot or the legacy `.sig-alg.reg.int` suffix.
///
/// # Errors
///
/// Returns [`TsigError::UnsupportedAlgorithm`] for algorithms hickory cannot sign with.
pub fn parse_tsig_algorithm(algorithm: &str) -> Result<TsigAlgorithm, TsigError> {
    let normalized = algorithm.trim().trim_end_matches('.').to_ascii_lowercase();
    let normalized = normalized
        .strip_suffix(".sig-alg.reg.int")
        .unwrap_or(&normalized);

    match normalized {
        "hmac-sha256" => Ok(TsigAlgorithm::HmacSha256),
        "hmac-sha384" => Ok(TsigAlgorithm::HmacSha384),
        "hmac-sha512" => Ok(TsigAlgorithm::HmacSha512),
        _ => Err(TsigError::UnsupportedAlgorithm {
            algorithm: algorithm.to_string(),
        }),
    }
}

/// Create a TSIG signer from key data.
///
/// # Errors
///
/// Returns an error if the key name is invalid or hickory rejects the key.
pub fn create_tsig_signer(key_data: &TsigKeyData) -> Result<TSigner, TsigError> {
    let signer_name = Name::from_str(&key_data.name).map_err(|e| TsigError::InvalidKeyName {
        key_name: key_data.name.clone(),
        reason: e.to_string(),
    })?;

    TSigner::new(
        key_data.secret.clone(),
        key_data.algorithm.clone(),
        signer_name,
        u16::try_from(TSIG_FUDGE_TIME_SECS).unwrap_or(300),
    )
    .map_err(|e| TsigError::SignerCreationFailed {
        key_name: key_data.name.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "tsig_tests.rs"]
mod tsig_tests;
